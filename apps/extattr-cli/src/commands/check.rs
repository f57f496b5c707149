//! Check command - Verify both directories are reachable with the configured credentials

use clap::Args;

use crate::commands::Context;
use crate::error::{CliError, CliResult};

/// Arguments for the check command
#[derive(Args, Debug)]
#[command(about = "Verify the LDAP bind and the Graph session")]
pub struct CheckArgs {}

pub async fn execute(_args: CheckArgs, ctx: &Context) -> CliResult<()> {
    let ldap = ctx.connect_ldap().await.map(|_| ());
    report("LDAP bind", &ctx.config.ldap.url(), &ldap);

    let entra = ctx.connect_entra().await.map(|_| ());
    report("Graph session", &ctx.config.entra.tenant_id, &entra);

    ldap?;
    entra
}

fn report(name: &str, target: &str, result: &Result<(), CliError>) {
    match result {
        Ok(()) => println!("[ok] {name} ({target})"),
        Err(e) => println!("[!!] {name} ({target}): {e}"),
    }
}
