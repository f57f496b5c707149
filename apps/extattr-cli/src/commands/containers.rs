//! Containers command - List organizational units and default containers

use clap::Args;
use extattr_connector::traits::LocalDirectory;
use extattr_connector_ldap::discover_default_containers;

use crate::commands::Context;
use crate::error::CliResult;

/// Arguments for the containers command
#[derive(Args, Debug)]
#[command(about = "List containers available for sync")]
pub struct ContainersArgs {
    /// Search base (defaults to ldap.base_dn)
    #[arg(long, value_name = "DN")]
    pub base: Option<String>,
}

pub async fn execute(args: ContainersArgs, ctx: &Context) -> CliResult<()> {
    let ldap = ctx.connect_ldap().await?;
    let base = args.base.as_deref().unwrap_or(&ctx.config.ldap.base_dn);

    let units = ldap.list_containers(base).await?;

    println!("Organizational units under {base}:");
    for unit in &units {
        println!("  {unit}");
    }
    if units.is_empty() {
        println!("  (none)");
    }

    println!("\nDefault containers:");
    for container in discover_default_containers(&ctx.config.ldap.base_dn) {
        println!("  {container}");
    }

    if !ctx.config.containers.is_empty() {
        println!("\nConfigured containers:");
        for container in &ctx.config.containers {
            println!("  {container}");
        }
    }

    Ok(())
}
