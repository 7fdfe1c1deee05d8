//! Catalog command - list brokered offerings.

use anyhow::Result;
use clap::Args;

use super::Context;

/// Arguments for the catalog command.
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Only show entries for this service
    #[arg(long)]
    pub service: Option<String>,
}

/// Run the catalog command.
pub async fn run(args: CatalogArgs, ctx: &Context) -> Result<()> {
    let loaded = ctx.load_config()?;
    let entries: Vec<_> = loaded
        .config
        .services
        .iter()
        .filter(|entry| {
            args.service
                .as_deref()
                .is_none_or(|service| entry.service_name == service)
        })
        .collect();

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No brokered services configured");
        return Ok(());
    }

    for entry in entries {
        println!("{} / {}", entry.service_name, entry.plan_name);
        if let Some(target) = &entry.target {
            println!("  target:   {}", target.name);
        }
        for service in &entry.services {
            println!(
                "  service:  {} ({} {})",
                service.service_instance_name, service.name, service.plan
            );
        }
        for app in &entry.apps {
            let transformers: Vec<&str> = app
                .parameters_transformers
                .iter()
                .map(|spec| spec.name.as_str())
                .collect();
            if transformers.is_empty() {
                println!("  app:      {} ({})", app.name, app.path);
            } else {
                println!(
                    "  app:      {} ({}) transformers: {}",
                    app.name,
                    app.path,
                    transformers.join(" -> ")
                );
            }
        }
    }
    Ok(())
}
