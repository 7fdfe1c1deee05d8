//! CLI command handlers.

use std::path::PathBuf;

use anyhow::Result;
use appbroker_config::LoadedConfig;

pub mod catalog;
pub mod init;
pub mod run;
pub mod validate;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Explicit config file, bypassing discovery.
    pub config_path: Option<PathBuf>,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Load and validate the configuration for this invocation.
    pub fn load_config(&self) -> Result<LoadedConfig> {
        let loaded = appbroker_config::load_config(self.config_path.as_deref())?;
        if self.verbose {
            for path in loaded.loaded_from() {
                eprintln!("Loaded config: {}", path.display());
            }
        }
        Ok(loaded)
    }
}
