//! App Broker
//!
//! Main entry point for the App Broker CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod dry_run;

use commands::{catalog, init, run, validate};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// App Broker - deploy backing applications and services for brokered offerings
#[derive(Parser)]
#[command(name = "appbroker")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file to load instead of the discovered layers
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the brokered services catalog
    Catalog(catalog::CatalogArgs),

    /// Check the configuration, including transformer names and targets
    Validate(validate::ValidateArgs),

    /// Dry-run a service instance workflow against a logging deployer
    Run(run::RunArgs),

    /// Write a starter configuration file
    Init(init::InitArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Console (human-readable) + daily rolling JSON file
    let filter = if cli.verbose {
        "appbroker=debug,appbroker_core=debug,info"
    } else {
        "appbroker=info,appbroker_core=info,warn"
    };

    let log_dir = appbroker_config::user_config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::RollingFileAppender::builder()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix("appbroker.log")
        .build(&log_dir)
        .ok();
    let (file_writer, _guard) = match file_appender {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(file_writer.map(|writer| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "appbroker=trace,appbroker_core=trace,info",
                ))
        }))
        .init();

    let ctx = commands::Context {
        config_path: cli.config,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Catalog(args) => catalog::run(args, &ctx).await,
        Commands::Validate(args) => validate::run(args, &ctx).await,
        Commands::Run(args) => run::run(args, &ctx).await,
        Commands::Init(args) => init::run(args, &ctx).await,
    }
}
