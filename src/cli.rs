//! Command-line interface definitions.

use clap::Parser;
use std::path::PathBuf;

/// Content-addressed web-asset cache builder
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Webroot directory to scan for assets
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub webroot: PathBuf,

    /// Entry files kept under their original names (comma-separated logical paths)
    #[arg(short, long, value_delimiter = ',')]
    pub entries: Option<Vec<String>>,

    /// Output cache directory (default: <webroot>/cache)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub out: Option<PathBuf>,

    /// Config file path (relative to the webroot)
    #[arg(short = 'C', long, default_value = "recache.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Pin the timestamp comment text (for reproducible output)
    #[arg(short, long)]
    pub timestamp: Option<String>,

    /// Re-walk the webroot even if a file-list cache exists
    #[arg(short, long)]
    pub refresh: bool,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,

    /// Log cycle-detection events
    #[arg(short, long)]
    pub loops: bool,
}
