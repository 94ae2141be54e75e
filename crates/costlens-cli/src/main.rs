//! Costlens CLI
//!
//! - `collect`: daily reserved-capacity collection for a fixture-described
//!   account
//! - `trim`: drop anomaly points dated before a cutoff day

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod fixture;
mod sink;

use config::CostlensConfig;

/// Costlens CLI
#[derive(Parser)]
#[command(name = "costlens")]
#[command(about = "Cloud cost collection and anomaly tooling", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "COSTLENS_CONFIG")]
    config: Option<String>,

    /// Log level (overrides the configuration file)
    #[arg(long, global = true, env = "COSTLENS_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, global = true, env = "COSTLENS_LOG_JSON")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect the daily reserved-capacity report for a fixture account
    Collect {
        /// Fixture describing the account and its regions
        #[arg(short, long)]
        fixture: PathBuf,

        /// Report destination (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Trim an anomaly series set to points on or after a day
    Trim {
        /// First day to keep (YYYY-MM-DD)
        #[arg(long)]
        cutoff: NaiveDate,

        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = CostlensConfig::load(cli.config.as_deref()).context("loading configuration")?;
    config.collector.validate()?;

    // Initialize tracing; stdout is reserved for command output
    let level = cli.log_level.unwrap_or_else(|| config.logging.level.clone());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.into());

    if cli.json || config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    match cli.command {
        Commands::Collect { fixture, output } => {
            let cancel = CancellationToken::new();
            let on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, cancelling collection");
                    on_signal.cancel();
                }
            });

            let summary =
                commands::collect(config.collector, &fixture, output, cancel).await?;
            eprintln!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Trim { cutoff, input } => {
            let trimmed = commands::trim(cutoff, input.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&trimmed)?);
            info!(categories = trimmed.len(), cutoff = %cutoff, "Series trimmed");
        }
    }

    Ok(())
}
