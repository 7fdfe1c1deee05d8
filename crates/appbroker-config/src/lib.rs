//! Configuration system for the App Broker.
//!
//! Provides TOML-based configuration with:
//! - The brokered-services catalog (`[[services]]`), mapping a service
//!   definition and plan onto backing services and backing applications
//! - Broker-wide settings (`[broker]`), e.g. the provisioning concurrency cap
//! - Config file layering (explicit path, `APPBROKER_CONFIG`, user config
//!   dir, project-local `./appbroker.toml`)

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    load_config, load_config_file, save_config, user_config_dir, user_config_path,
    ConfigSource, LoadedConfig,
};
pub use error::{ConfigError, Result};
pub use types::{AppBrokerConfig, BrokerSettings};
