use std::path::PathBuf;

use clap::Parser;

use crate::Commands;

/// Main CLI application arguments and command structure
#[derive(Parser)]
#[clap(
    version,
    about = "Spaced-repetition note review from the command line"
)]
pub struct Cli {
    /// Path to the data directory holding the note and tag collections
    #[clap(long, value_parser)]
    pub data_dir: Option<PathBuf>,

    /// Path to the backup directory
    #[clap(long, value_parser)]
    pub backup_dir: Option<PathBuf>,

    /// Snapshot a backup archive after every change
    #[clap(long)]
    pub auto_backup: bool,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands for the recaller application
    #[clap(subcommand)]
    pub command: Commands,
}
