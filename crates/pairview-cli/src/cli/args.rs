use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pairview",
    version,
    about = "Offline viewer for paired-section comparison files"
)]
pub struct Cli {
    /// Display language for labels and notifications (fa, en)
    #[arg(long, global = true, env = "PAIRVIEW_LOCALE", default_value = "fa")]
    pub locale: String,

    /// JSON file overriding individual display labels
    #[arg(long, global = true)]
    pub labels: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the records of a comparison file
    List(FileArgs),
    /// Show one record of a comparison file
    Show(ShowArgs),
    /// Step through a comparison file (n, p, <number>, q on stdin)
    Browse(FileArgs),
    /// Manage the offline asset cache
    Cache(CacheArgs),
}

#[derive(Args, Debug)]
pub struct FileArgs {
    /// Comparison file (.json, top-level array)
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Comparison file (.json, top-level array)
    pub file: PathBuf,

    /// 1-based record number; out-of-range values are ignored
    #[arg(long, short = 'i')]
    pub index: Option<usize>,

    /// Print the record as HTML instead of plain text
    #[arg(long)]
    pub html: bool,
}

#[derive(Args, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub cmd: CacheSub,

    /// Base URL of the viewer (overrides PAIRVIEW_ORIGIN)
    #[arg(long, global = true)]
    pub origin: Option<String>,

    /// Bucket directory (overrides PAIRVIEW_CACHE_DIR)
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Asset version tag (overrides PAIRVIEW_CACHE_VERSION)
    #[arg(long, global = true)]
    pub cache_version: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum CacheSub {
    /// Pre-cache the manifest into the current version's bucket
    Install,
    /// Delete the buckets of every other version
    Activate,
    /// Install, then activate
    Update,
    /// List buckets and the entries of the current one
    Status,
    /// Fetch a resource through the cache
    Fetch(FetchArgs),
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Resource path relative to the origin, or an absolute URL
    pub path: String,

    /// Write the body here instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}
