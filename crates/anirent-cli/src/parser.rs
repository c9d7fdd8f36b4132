//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for anirent.
#[derive(Parser, Debug)]
#[command(name = "anirent")]
#[command(about = "Search for and download subbed anime releases")]
#[command(version)]
pub struct Cli {
    /// Log filter, e.g. "info" or "anirent=debug,tower_http=info"
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        env = "ANIRENT_LOG",
        default_value = "warn"
    )]
    pub log_level: String,

    /// Directory downloads are written to while in progress
    #[arg(long = "data-dir", global = true, env = "ANIRENT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
