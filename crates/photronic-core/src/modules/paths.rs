//! Path utilities for local data storage.

use std::fs;
use std::path::PathBuf;

use photronic_types::ConfigError;

/// Directory name for data storage.
pub const DATA_DIR: &str = ".photronic";
/// Filename for the persisted application config.
pub const CONFIG_FILE: &str = "config.json";

/// Get the data directory path.
///
/// Priority:
/// 1. `PHOTRONIC_DATA_DIR` environment variable
/// 2. `~/.photronic`
pub fn get_data_dir() -> Result<PathBuf, ConfigError> {
    let data_dir = if let Ok(custom_dir) = std::env::var("PHOTRONIC_DATA_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = dirs::home_dir().ok_or_else(|| ConfigError::NotFound {
            path: "home directory".to_string(),
        })?;
        home.join(DATA_DIR)
    };

    if !data_dir.exists() {
        fs::create_dir_all(&data_dir).map_err(|e| ConfigError::from_io_error(&e))?;
    }

    Ok(data_dir)
}

/// Path of the application config file.
pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    Ok(get_data_dir()?.join(CONFIG_FILE))
}
