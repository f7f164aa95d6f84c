//! Command-line entry point (spec.md §6): `sync`, `cluster`, `publish`,
//! `edit`, `scheduler`, `monitor` subcommands over the shared Postgres
//! store, wiring together every other `sportwire-*` crate.

mod cmd;
mod message_source;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sportwire_common::config::Config;
use sportwire_common::error::SportwireError;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sportwire")]
#[command(about = "Sports-news aggregation, clustering, and publishing pipeline")]
#[command(version)]
struct Cli {
    /// Raise logging to DEBUG (spec.md §6).
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl listing pages incrementally until the anchor URL is matched.
    Sync(cmd::sync::SyncArgs),
    /// Run the clusterer over a recent window.
    Cluster(cmd::cluster::ClusterArgs),
    /// Render and optionally dispatch a story or article message.
    Publish(cmd::publish::PublishArgs),
    /// Edit or append to a previously-sent message.
    Edit(cmd::edit::EditArgs),
    /// Enqueue and/or run the publish scheduler.
    Scheduler(cmd::scheduler::SchedulerArgs),
    /// Report or watch pipeline health metrics.
    Monitor(cmd::monitor::MonitorArgs),
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose { "sportwire=debug" } else { "sportwire=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli.command).await;
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            let code = e
                .downcast_ref::<SportwireError>()
                .map(|se| se.exit_code())
                .unwrap_or(2);
            ExitCode::from(code as u8)
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Sync(args) => {
            let config = Config::from_env_dry_run().map_err(|e| SportwireError::Config(e.to_string()))?;
            cmd::sync::run(&config, args).await
        }
        Commands::Cluster(args) => {
            let config = Config::from_env_dry_run().map_err(|e| SportwireError::Config(e.to_string()))?;
            cmd::cluster::run(&config, args).await
        }
        Commands::Publish(args) => {
            let config = if args.send {
                Config::from_env().map_err(|e| SportwireError::Config(e.to_string()))?
            } else {
                Config::from_env_dry_run().map_err(|e| SportwireError::Config(e.to_string()))?
            };
            cmd::publish::run(&config, args).await
        }
        Commands::Edit(args) => {
            let config = if args.dry_run {
                Config::from_env_dry_run().map_err(|e| SportwireError::Config(e.to_string()))?
            } else {
                Config::from_env().map_err(|e| SportwireError::Config(e.to_string()))?
            };
            cmd::edit::run(&config, args).await
        }
        Commands::Scheduler(args) => {
            let config = if args.dry_run {
                Config::from_env_dry_run().map_err(|e| SportwireError::Config(e.to_string()))?
            } else {
                Config::from_env().map_err(|e| SportwireError::Config(e.to_string()))?
            };
            cmd::scheduler::run(&config, args).await
        }
        Commands::Monitor(args) => {
            let config = Config::from_env_dry_run().map_err(|e| SportwireError::Config(e.to_string()))?;
            cmd::monitor::run(&config, args).await
        }
    }
}
