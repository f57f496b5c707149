//! Sync command - Copy extension attributes to matching Entra ID devices

use std::collections::BTreeSet;
use std::fs::File;
use std::path::PathBuf;

use clap::Args;
use extattr_connector_ldap::discover_default_containers;
use extattr_sync::{
    CancellationFlag, DirectoryReader, SyncOrchestrator, SyncResult, SyncStatus, SyncSummary,
};
use tracing::{info, warn};

use crate::commands::Context;
use crate::error::{CliError, CliResult};
use crate::formats::csv::export_sync_csv;
use crate::slots::parse_slot_list;

/// Arguments for the sync command
#[derive(Args, Debug)]
#[command(about = "Sync extension attributes to Entra ID devices")]
pub struct SyncArgs {
    /// Container to read computers from (repeatable)
    #[arg(long = "container", value_name = "DN")]
    pub containers: Vec<String>,

    /// Include the whole subtree below each container
    #[arg(long, conflicts_with = "one_level")]
    pub recursive: bool,

    /// Only immediate children of each container
    #[arg(long)]
    pub one_level: bool,

    /// Slots to sync: "all", "3", "1,3,5" or "1-15"
    #[arg(long, value_parser = parse_slot_list)]
    pub slots: BTreeSet<u8>,

    /// Report what would change without writing
    #[arg(long)]
    pub preview: bool,

    /// Objects processed concurrently
    #[arg(long)]
    pub workers: Option<usize>,

    /// Write a CSV report of every result
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

pub async fn execute(args: SyncArgs, ctx: &Context) -> CliResult<()> {
    let containers = resolve_containers(&args.containers, ctx);
    if containers.is_empty() {
        return Err(CliError::Validation(
            "no containers given and none could be discovered from ldap.base_dn".to_string(),
        ));
    }
    let recursive = resolve_recursive(&args, ctx);

    let ldap = ctx.connect_ldap().await?;
    let entra = ctx.connect_entra().await?;

    let cancel = CancellationFlag::new();
    watch_ctrl_c(cancel.clone());

    let enumeration = DirectoryReader::new(ldap)
        .enumerate_all(&containers, recursive)
        .await;
    for diagnostic in &enumeration.diagnostics {
        eprintln!("Warning: {diagnostic}");
    }

    let orchestrator = SyncOrchestrator::new(entra)
        .with_worker_count(args.workers.unwrap_or(ctx.config.sync.workers));

    info!(
        objects = enumeration.objects.len(),
        containers = containers.len(),
        preview = args.preview,
        workers = orchestrator.worker_count(),
        "Starting sync"
    );

    let mut results = orchestrator
        .sync_batch(enumeration.objects, &args.slots, args.preview, &cancel)
        .await;
    results.sort_by(|a, b| a.distinguished_name().cmp(b.distinguished_name()));

    for result in &results {
        print_result(result);
    }

    let summary = SyncSummary::from_results(&results);
    println!("\n{summary}");
    if cancel.is_cancelled() {
        println!("Cancelled: objects not yet started were not processed.");
    }

    if let Some(path) = &args.report {
        let file = File::create(path).map_err(|e| {
            CliError::Io(format!("Failed to create report {}: {e}", path.display()))
        })?;
        export_sync_csv(&results, file)?;
        println!("Report written to {}", path.display());
    }

    if summary.has_errors() {
        return Err(CliError::SyncFailures {
            failed: summary.error,
            total: summary.total,
        });
    }
    Ok(())
}

fn resolve_containers(explicit: &[String], ctx: &Context) -> Vec<String> {
    if !explicit.is_empty() {
        return explicit.to_vec();
    }
    if !ctx.config.containers.is_empty() {
        return ctx.config.containers.clone();
    }
    let discovered = discover_default_containers(&ctx.config.ldap.base_dn);
    info!(containers = ?discovered, "No containers configured, using defaults");
    discovered
}

fn resolve_recursive(args: &SyncArgs, ctx: &Context) -> bool {
    if args.one_level {
        false
    } else {
        args.recursive || ctx.config.sync.recursive
    }
}

fn watch_ctrl_c(cancel: CancellationFlag) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing in-flight objects");
            cancel.cancel();
        }
    });
}

fn print_result(result: &SyncResult) {
    let marker = match result.status() {
        SyncStatus::Success => "ok",
        SyncStatus::Preview => "..",
        SyncStatus::Skipped => "--",
        SyncStatus::NoMatch => "??",
        SyncStatus::Error => "!!",
    };
    match result.matched_remote_id() {
        Some(id) => println!(
            "[{marker}] {:<20} {:<9} {} ({id})",
            result.subject_name(),
            result.status(),
            result.detail()
        ),
        None => println!(
            "[{marker}] {:<20} {:<9} {}",
            result.subject_name(),
            result.status(),
            result.detail()
        ),
    }
}
