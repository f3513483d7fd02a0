mod config;
pub mod kv;

pub use config::{ApiConfig, Config, BACKEND_URL_ENV};
pub use kv::{FileStore, KeyValueStore, MemoryStore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/protocolo7d[-dev]/` based on PROTOCOLO7D_ENV.
///
/// Set PROTOCOLO7D_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the data directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("PROTOCOLO7D_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("protocolo7d-dev")
    } else {
        base_dir.join("protocolo7d")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(e.to_string()))?;
    Ok(dir)
}
