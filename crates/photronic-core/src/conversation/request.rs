//! Provider request assembly: instructions, history window, scene summary.

use photronic_types::models::{ConversationConfig, HistoryWindow};
use photronic_types::{ChatMessage, Role};

use super::Conversation;
use crate::provider::{ProviderRequest, RequestTurn};
use crate::scene::SceneSummary;

/// Built-in instructions describing the `<edit_plan>` protocol.
pub const DEFAULT_SYSTEM_PROMPT: &str = r##"You are Photronic, an assistant embedded in a vector canvas editor.
Answer the user briefly. When the user asks for a change to the canvas, include exactly one block of the form

<edit_plan>
{"operations": [ ... ]}
</edit_plan>

Each operation is a JSON object with an "op" field:
- {"op": "add", "element": {"type": "rectangle|ellipse|diamond|line|arrow|text", "x": 0, "y": 0, "width": 100, "height": 100, "strokeColor": "#1e1e1e", "backgroundColor": "transparent", "strokeWidth": 1, "opacity": 100, "text": "only for text"}}
- {"op": "modify", "id": "<existing id>", "changes": {"x": 0, "y": 0, "width": 1, "height": 1, "rotation": 0, "strokeColor": "#000000", "backgroundColor": "#ffffff", "strokeWidth": 1, "opacity": 100, "zIndex": 0, "text": "..."}}
- {"op": "delete", "id": "<existing id>"}

Coordinates are canvas pixels with the origin at the top-left corner. A circle of radius r centred at (cx, cy) is an ellipse with x = cx - r, y = cy - r, width = height = 2r.
Only reference ids listed under "Current scene elements". Elements marked locked cannot be modified or deleted.
Omit the block entirely when no change is needed."##;

/// Assemble a provider request from the history and the current scene.
///
/// Error turns are skipped, the history window is applied, leading model
/// turns are dropped and adjacent turns from the same role are merged, so
/// the result always alternates starting with a user turn.
pub fn build_request(
    messages: &[ChatMessage],
    summary: &SceneSummary,
    config: &ConversationConfig,
) -> ProviderRequest {
    let replayable: Vec<&ChatMessage> = messages.iter().filter(|m| m.is_replayable()).collect();
    let start = match config.history_window {
        HistoryWindow::All => 0,
        HistoryWindow::Last(k) => replayable.len().saturating_sub(k),
    };

    let mut turns: Vec<RequestTurn> = Vec::new();
    for message in replayable[start..].iter().skip_while(|m| m.role == Role::Model) {
        match turns.last_mut() {
            Some(last) if last.role == message.role => {
                last.content.push_str("\n\n");
                last.content.push_str(&message.content);
            },
            _ => turns.push(RequestTurn { role: message.role, content: message.content.clone() }),
        }
    }

    let system_instruction = config
        .system_prompt
        .as_deref()
        .filter(|prompt| !prompt.trim().is_empty())
        .unwrap_or(DEFAULT_SYSTEM_PROMPT)
        .to_string();

    ProviderRequest { system_instruction, scene_summary: summary.to_prompt_text(), turns }
}

impl Conversation {
    /// Request for the provider based on this conversation.
    pub fn build_request(&self, summary: &SceneSummary, config: &ConversationConfig) -> ProviderRequest {
        build_request(self.messages(), summary, config)
    }
}
