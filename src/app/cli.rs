//! Usage: Command-line arguments.

use crate::infra::settings::DEFAULT_CONFIG_PATH;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "mister-freeze")]
#[command(about = "Bulk-freeze learners that have not validated a quest", long_about = None)]
pub struct CliArgs {
    /// Settings file with both service credentials and collector options.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Also write daily-rolling log files into this directory.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Collect and print the request, but never submit it.
    #[arg(long)]
    pub dry_run: bool,
}
