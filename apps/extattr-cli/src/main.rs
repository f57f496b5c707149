//! extattr - Sync Active Directory extension attributes to Entra ID devices
//!
//! Commands:
//! - `sync`: copy selected `extensionAttribute1..15` values to matching devices
//! - `set`: write or clear one attribute on local computer objects
//! - `containers`: list containers available for sync
//! - `check`: verify the LDAP bind and the Graph session

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod error;
mod formats;
mod slots;

use commands::Context;
use config::{AppConfig, Secrets, DEFAULT_CONFIG_PATH};
use error::CliResult;

/// extattr - Extension attribute sync
#[derive(Parser)]
#[command(name = "extattr")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, env = "EXTATTR_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync extension attributes to Entra ID devices
    Sync(commands::sync::SyncArgs),

    /// Set or clear an extension attribute in the local directory
    Set(commands::set::SetArgs),

    /// List containers available for sync
    Containers(commands::containers::ContainersArgs),

    /// Verify the LDAP bind and the Graph session
    Check(commands::check::CheckArgs),
}

#[tokio::main]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn,extattr=info",
        1 => "info,extattr=debug",
        _ => "debug,extattr=trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> CliResult<()> {
    let config = AppConfig::from_file(&cli.config)?;
    let ctx = Context::new(config, Secrets::from_env());

    match cli.command {
        Commands::Sync(args) => commands::sync::execute(args, &ctx).await,
        Commands::Set(args) => commands::set::execute(args, &ctx).await,
        Commands::Containers(args) => commands::containers::execute(args, &ctx).await,
        Commands::Check(args) => commands::check::execute(args, &ctx).await,
    }
}
