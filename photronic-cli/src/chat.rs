//! Interactive chat session.
//!
//! Plain lines are sent to the model; lines starting with `/` are local
//! commands. Ctrl-C while waiting for a reply cancels the cycle.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use image::ImageReader;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use photronic_core::modules::config as core_config;
use photronic_core::{CycleOutcome, EditorSession, MemorySurface, SceneModel};
use photronic_types::models::CreditPackage;
use photronic_types::{Account, ElementKind, SessionError, TypedError};

use crate::commands::packages_table;

const HELP: &str = "\
Commands:
  /scene                     show the elements on the canvas
  /credits                   show your balance
  /buy <50|120|300>          buy a credit package
  /upload <file> [<w> <h>]   place an image at its natural size (or w×h)
  /reset                     clear the chat and the canvas
  /help                      show this help
  /quit                      leave";

#[derive(Debug, PartialEq)]
enum ReplCommand {
    Message(String),
    Scene,
    Credits,
    Buy(u64),
    Upload { file: String, size: Option<(f64, f64)> },
    Reset,
    Help,
    Quit,
}

impl ReplCommand {
    fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Some(Self::Message(line.to_string())));
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default().to_ascii_lowercase();
        let args: Vec<&str> = parts.collect();

        let command = match (name.as_str(), args.as_slice()) {
            ("scene", []) => Self::Scene,
            ("credits", []) => Self::Credits,
            ("buy", [credits]) => {
                let credits = credits
                    .parse()
                    .with_context(|| format!("Not a package size: {}", credits))?;
                Self::Buy(credits)
            },
            ("upload", [file]) => Self::Upload { file: (*file).to_string(), size: None },
            ("upload", [file, width, height]) => Self::Upload {
                file: (*file).to_string(),
                size: Some((
                    width.parse().with_context(|| format!("Invalid width: {}", width))?,
                    height.parse().with_context(|| format!("Invalid height: {}", height))?,
                )),
            },
            ("reset", []) => Self::Reset,
            ("help" | "?", []) => Self::Help,
            ("quit" | "exit" | "q", []) => Self::Quit,
            ("buy", _) => anyhow::bail!("Usage: /buy <50|120|300>"),
            ("upload", _) => anyhow::bail!("Usage: /upload <file> [<width> <height>]"),
            _ => anyhow::bail!("Unknown command: /{} (try /help)", name),
        };
        Ok(Some(command))
    }
}

pub async fn run(name: &str, credits: u64) -> Result<()> {
    let config = core_config::load_config().map_err(|e| anyhow::anyhow!(e))?;
    let provider = config.llm.provider.display_name();
    let model = config.llm.active_model().to_string();

    let mut session = EditorSession::new(config, MemorySurface::new()).map_err(|e| anyhow::anyhow!(e))?;
    session.sign_in(Account::new(name, credits));

    println!("{}", "Photronic".cyan().bold());
    println!("  Signed in as {} with {} credits", name.bold(), credits);
    println!("  Provider: {} ({})", provider, model);
    println!("  Type /help for commands.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match ReplCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e.to_string().red());
                continue;
            },
        };

        if command == ReplCommand::Quit {
            break;
        }
        if let Err(e) = handle(&mut session, command).await {
            println!("{}", e.to_string().red());
        }
    }

    println!("Bye.");
    Ok(())
}

async fn handle(session: &mut EditorSession, command: ReplCommand) -> Result<()> {
    match command {
        ReplCommand::Message(text) => send(session, &text).await?,
        ReplCommand::Scene => print_scene(&session.scene()),
        ReplCommand::Credits => print_credits(session),
        ReplCommand::Buy(credits) => {
            let Some(package) = CreditPackage::find(credits) else {
                println!("{table}", table = packages_table());
                anyhow::bail!("No package with {} credits", credits);
            };
            let account = session.purchase_credits(package)?;
            println!("{} Added {} credits, balance {}", "✓".green(), package.credits, account.credits);
        },
        ReplCommand::Upload { file, size } => {
            let image = read_image(Path::new(&file))?;
            let (width, height) = size.unwrap_or((f64::from(image.width), f64::from(image.height)));
            let element = session.upload_image(&image.file_id, image.mime_type, width, height)?;
            println!(
                "{} Placed {} ({}×{}) as {} (locked)",
                "✓".green(),
                image.file_id,
                width,
                height,
                element.id.bold()
            );
        },
        ReplCommand::Reset => {
            session.reset();
            println!("{} Chat and canvas cleared", "✓".green());
        },
        ReplCommand::Help => println!("{}", HELP),
        ReplCommand::Quit => {},
    }
    Ok(())
}

async fn send(session: &mut EditorSession, text: &str) -> Result<()> {
    let handle = session.orchestrator();
    let cycle = session.send_message(text);
    tokio::pin!(cycle);

    let finished = tokio::select! {
        result = &mut cycle => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };
    let result = match finished {
        Some(result) => result,
        None => {
            debug!("Ctrl-C received, cancelling edit cycle");
            handle.cancel();
            cycle.await
        },
    };

    match result {
        Ok(CycleOutcome::Completed { reply, cost, .. }) => {
            println!("{} {}", "photronic>".cyan().bold(), reply.content);
            if cost > 0 {
                debug!("Cycle cost {} credits", cost);
            }
        },
        Ok(CycleOutcome::Failed { reply, .. }) => {
            println!("{} {}", "photronic>".cyan().bold(), reply.content.red());
        },
        Ok(CycleOutcome::Cancelled) => println!("{}", "Cancelled.".yellow()),
        Err(TypedError::Session(SessionError::EmptyInput)) => {},
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn prompt() {
    use std::io::Write;

    print!("{} ", "you>".green().bold());
    let _ = std::io::stdout().flush();
}

fn print_credits(session: &EditorSession) {
    match session.account() {
        Some(account) => println!("{}: {} credits", account.name, account.credits.to_string().bold()),
        None => println!("{}", "Not signed in.".yellow()),
    }
}

fn print_scene(scene: &SceneModel) {
    if scene.is_empty() {
        println!("{}", "The canvas is empty.".yellow());
        return;
    }

    let mut elements: Vec<_> = scene.live_elements().collect();
    elements.sort_by_key(|e| e.z_index);

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Id", "Type", "Position", "Size", "Fill", "Opacity", "Z", ""]);

    for element in elements {
        let g = &element.geometry;
        let kind = match &element.kind {
            ElementKind::Text { text, .. } => format!("text \"{}\"", text),
            other => other.label().to_string(),
        };
        let lock = if element.locked {
            Cell::new("locked").fg(Color::Yellow)
        } else {
            Cell::new("")
        };
        table.add_row(vec![
            Cell::new(&element.id),
            Cell::new(kind),
            Cell::new(format!("({}, {})", g.x, g.y)),
            Cell::new(format!("{}×{}", g.width, g.height)),
            Cell::new(&element.style.fill_color),
            Cell::new(format!("{}%", element.style.opacity)),
            Cell::new(element.z_index),
            lock,
        ]);
    }

    println!("{table}");
    println!("\n{} elements", scene.live_count());
}

/// An image file opened for upload.
#[derive(Debug, PartialEq)]
struct ImageFile {
    /// File name, used as the element's file id
    file_id: String,
    mime_type: Option<String>,
    width: u32,
    height: u32,
}

/// Open `path` and read its natural size from the image header.
fn read_image(path: &Path) -> Result<ImageFile> {
    let reader = ImageReader::open(path)
        .with_context(|| format!("Cannot open {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("Cannot read {}", path.display()))?;
    let mime_type = reader.format().map(|format| format.to_mime_type().to_string());
    let (width, height) = reader
        .into_dimensions()
        .with_context(|| format!("{} is not a supported image", path.display()))?;

    let file_id = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(ImageFile { file_id, mime_type, width, height })
}
