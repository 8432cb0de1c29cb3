//! Command-line interface of the exporter.

use std::path::PathBuf;

use clap::Parser;

/// Cosmos wallets balance and price exporter
#[derive(Parser, Debug)]
#[command(name = "cosmos-wallets-exporter")]
#[command(about = "Exports Cosmos wallets balances and prices as Prometheus metrics", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', default_value = "config.toml")]
    pub config: PathBuf,
}
