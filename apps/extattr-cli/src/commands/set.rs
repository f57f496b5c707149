//! Set command - Write or clear one extension attribute on local computers

use std::fs::File;
use std::path::PathBuf;

use clap::Args;
use extattr_sync::{DirectoryReader, LocalWriter, WriteOutcome};

use crate::commands::Context;
use crate::error::{CliError, CliResult};
use crate::formats::csv::export_writes_csv;
use crate::slots::parse_slot;

/// Arguments for the set command
#[derive(Args, Debug)]
#[command(about = "Set or clear an extension attribute in the local directory")]
pub struct SetArgs {
    /// Slot number (1-15)
    #[arg(long, value_parser = parse_slot)]
    pub slot: u8,

    /// Value to write
    #[arg(long, required_unless_present = "clear", conflicts_with = "clear")]
    pub value: Option<String>,

    /// Remove the slot's value
    #[arg(long)]
    pub clear: bool,

    /// Computer to modify, by distinguished name or computer name (repeatable)
    #[arg(
        long = "target",
        value_name = "DN|NAME",
        required_unless_present = "container",
        conflicts_with = "container"
    )]
    pub targets: Vec<String>,

    /// Modify every computer in this container
    #[arg(long, value_name = "DN")]
    pub container: Option<String>,

    /// With --container, include the whole subtree
    #[arg(long, requires = "container")]
    pub recursive: bool,

    /// Write a CSV report of every write
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

impl SetArgs {
    fn value(&self) -> Option<&str> {
        if self.clear {
            None
        } else {
            self.value.as_deref()
        }
    }
}

pub async fn execute(args: SetArgs, ctx: &Context) -> CliResult<()> {
    let ldap = ctx.connect_ldap().await?;

    let targets = match &args.container {
        Some(container) => {
            let enumeration = DirectoryReader::new(ldap.clone())
                .enumerate(container, args.recursive)
                .await;
            if let Some(diagnostic) = enumeration.diagnostic() {
                return Err(CliError::Directory(diagnostic.to_string()));
            }
            enumeration
                .objects
                .into_iter()
                .map(|o| o.distinguished_name)
                .collect()
        }
        None => args.targets.clone(),
    };

    let outcomes = LocalWriter::new(ldap)
        .write_many(&targets, args.slot, args.value())
        .await;

    for outcome in &outcomes {
        print_outcome(outcome);
    }

    if let Some(path) = &args.report {
        let file = File::create(path).map_err(|e| {
            CliError::Io(format!("Failed to create report {}: {e}", path.display()))
        })?;
        export_writes_csv(&outcomes, file)?;
    }

    let failed = outcomes.iter().filter(|o| !o.success).count();
    if failed > 0 {
        return Err(CliError::WriteFailures {
            failed,
            total: outcomes.len(),
        });
    }
    println!("\n{} object(s) updated", outcomes.len());
    Ok(())
}

fn print_outcome(outcome: &WriteOutcome) {
    let action = if outcome.cleared { "cleared" } else { "set" };
    match &outcome.diagnostic {
        None => println!(
            "[ok] {} extensionAttribute{} {action}",
            outcome.target, outcome.slot
        ),
        Some(diagnostic) => println!("[!!] {}: {diagnostic}", outcome.target),
    }
}
