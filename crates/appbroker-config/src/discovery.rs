//! Config file discovery and layered merging.
//!
//! When an explicit path is given (CLI `--config` or `APPBROKER_CONFIG`),
//! only that file is loaded and it must exist. Otherwise layers are merged
//! in order (later overrides earlier):
//! 1. `<user config dir>/appbroker/appbroker.toml`
//! 2. `./appbroker.toml` (project-local)

use std::path::{Path, PathBuf};

use crate::{AppBrokerConfig, ConfigError, Result};

/// Config filename, both project-local and within the user config directory.
const CONFIG_FILE: &str = "appbroker.toml";

/// Application name for user config directory resolution.
const APP_NAME: &str = "appbroker";

/// Environment variable naming an explicit config file.
const CONFIG_FILE_ENV: &str = "APPBROKER_CONFIG";

/// Tracks where each config layer was loaded from.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Path to the config file.
    pub path: PathBuf,
    /// Whether the file was found and loaded.
    pub loaded: bool,
}

/// Result of config discovery and loading.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The merged configuration.
    pub config: AppBrokerConfig,
    /// Sources that were checked, in order of precedence (lowest first).
    pub sources: Vec<ConfigSource>,
}

impl LoadedConfig {
    /// Get paths of sources that were actually loaded.
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter(|s| s.loaded)
            .map(|s| s.path.as_path())
            .collect()
    }
}

/// Discover, load and validate the configuration.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    let explicit = explicit.map(Path::to_path_buf).or_else(|| {
        std::env::var(CONFIG_FILE_ENV)
            .ok()
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    });

    let loaded = match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(ConfigError::NotFound(path.display().to_string()));
            }
            LoadedConfig {
                config: load_config_file(&path)?,
                sources: vec![ConfigSource { path, loaded: true }],
            }
        }
        None => load_layers(user_config_path(), PathBuf::from(CONFIG_FILE))?,
    };

    loaded.config.validate()?;
    Ok(loaded)
}

fn load_layers(user_path: Option<PathBuf>, project_path: PathBuf) -> Result<LoadedConfig> {
    let mut config = AppBrokerConfig::new();
    let mut sources = Vec::new();

    for path in user_path.into_iter().chain(std::iter::once(project_path)) {
        let loaded = path.is_file();
        if loaded {
            config.merge(load_config_file(&path)?);
        }
        sources.push(ConfigSource { path, loaded });
    }

    Ok(LoadedConfig { config, sources })
}

/// Load config from a specific file path (no discovery, no validation).
pub fn load_config_file(path: &Path) -> Result<AppBrokerConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    AppBrokerConfig::from_toml(&contents)
}

/// Save configuration to a file.
///
/// Creates parent directories if they don't exist.
pub fn save_config(config: &AppBrokerConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteFile {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let contents = config.to_toml()?;
    std::fs::write(path, contents).map_err(|e| ConfigError::WriteFile {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// Path of the user-level config file.
pub fn user_config_path() -> Option<PathBuf> {
    user_config_dir().map(|d| d.join(CONFIG_FILE))
}

/// User config directory for the broker (`~/.config/appbroker` on Linux).
pub fn user_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}
