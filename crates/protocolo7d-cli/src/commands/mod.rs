pub mod config;
pub mod dashboard;
pub mod session;
pub mod step;

use protocolo7d_core::{ApiClient, Config, FileStore, Program};

/// Application root backed by the on-disk session and configured backend,
/// with any stored session already restored.
pub fn open_program() -> Result<Program<FileStore>, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let api = ApiClient::from_config(&config)?;
    let store = FileStore::open_default()?;
    let mut program = Program::new(store, api);
    program.start();
    Ok(program)
}
