//! Validate command - check the catalog beyond what config loading checks.

use anyhow::{Result, bail};
use appbroker_config::AppBrokerConfig;
use appbroker_core::{DefaultTargetService, TransformerRegistry};
use clap::Args;

use super::Context;

/// Arguments for the validate command.
#[derive(Args, Debug)]
pub struct ValidateArgs {}

/// Run the validate command.
pub async fn run(_args: ValidateArgs, ctx: &Context) -> Result<()> {
    let loaded = ctx.load_config()?;
    let registry = TransformerRegistry::with_builtins();
    let problems = check(&loaded.config, &registry);

    if ctx.json_output {
        println!(
            "{}",
            serde_json::json!({ "valid": problems.is_empty(), "problems": problems })
        );
    } else {
        for problem in &problems {
            println!("  ✗ {problem}");
        }
    }

    if !problems.is_empty() {
        bail!("{} problem(s) found in configuration", problems.len());
    }
    if !ctx.json_output {
        println!(
            "Configuration OK ({} brokered service(s))",
            loaded.config.services.len()
        );
    }
    Ok(())
}

/// Problems a workflow would only hit at request time.
fn check(config: &AppBrokerConfig, registry: &TransformerRegistry) -> Vec<String> {
    let mut problems = Vec::new();

    for entry in &config.services {
        let offering = format!("{}/{}", entry.service_name, entry.plan_name);

        if let Some(target) = &entry.target {
            if !DefaultTargetService::supports(&target.name) {
                problems.push(format!("{offering}: unknown target '{}'", target.name));
            }
        }

        for app in &entry.apps {
            for spec in &app.parameters_transformers {
                match registry.get(&spec.name) {
                    None => problems.push(format!(
                        "{offering}: app '{}' uses unknown parameters transformer '{}'",
                        app.name, spec.name
                    )),
                    Some(factory) => {
                        if let Err(e) = factory.create_from_args(&spec.args) {
                            problems.push(format!("{offering}: app '{}': {e}", app.name));
                        }
                    }
                }
            }

            for bound in &app.services {
                if !entry
                    .services
                    .iter()
                    .any(|service| &service.service_instance_name == bound)
                {
                    problems.push(format!(
                        "{offering}: app '{}' binds to undeclared service '{bound}'",
                        app.name
                    ));
                }
            }
        }
    }

    problems
}
