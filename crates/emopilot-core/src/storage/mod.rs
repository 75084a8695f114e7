mod config;
pub mod database;
mod xp;

pub use config::{AudioConfig, Config};
pub use database::Database;
pub use xp::{MemoryXpStore, XpStore, XP_KEY};

use std::path::PathBuf;

/// Returns `~/.config/emopilot[-dev]/` based on EMOPILOT_ENV.
///
/// Set EMOPILOT_ENV=dev to use the development data directory, or
/// EMOPILOT_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("EMOPILOT_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("EMOPILOT_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("emopilot-dev")
            } else {
                base_dir.join("emopilot")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
