//! Init command - write a starter configuration.

use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};
use appbroker_config::{AppBrokerConfig, BrokerSettings};
use appbroker_types::{
    BackingApplication, BackingService, BrokeredService, ParametersTransformerSpec, TargetSpec,
};
use clap::Args;

use super::Context;

/// Arguments for the init command.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Create project-local config (./appbroker.toml) instead of user config
    #[arg(long)]
    pub local: bool,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Run the init command.
pub async fn run(args: InitArgs, ctx: &Context) -> Result<()> {
    let path = match (&ctx.config_path, args.local) {
        (Some(path), _) => path.clone(),
        (None, true) => PathBuf::from("appbroker.toml"),
        (None, false) => appbroker_config::user_config_path()
            .context("could not determine the user config directory")?,
    };

    if path.exists() && !args.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    appbroker_config::save_config(&starter_config(), &path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn starter_config() -> AppBrokerConfig {
    let mut entry = BrokeredService::new("example", "standard");
    entry.target = Some(TargetSpec::new("SpacePerServiceInstance"));
    entry.services = vec![BackingService::new("example-db", "mysql", "small")];
    entry.apps = vec![
        BackingApplication::new("example-app", "maven://com.example:app:1.0.0")
            .with_service("example-db")
            .with_transformer(
                ParametersTransformerSpec::new("EnvironmentMapping").with_arg("include", "lang"),
            ),
    ];

    AppBrokerConfig {
        broker: BrokerSettings {
            max_concurrency: Some(8),
        },
        services: vec![entry],
    }
}
