use clap::Parser;
use std::path::PathBuf;

use crate::utils::config::DefaultArgs;

/// Parallel directory hasher built on a cancellable pipeline.
#[derive(Clone, Parser)]
#[command(name = "pipehash")]
#[command(
    about = "Hash every regular file under DIR with blake3 using a pool of workers. Ctrl-C stops cleanly."
)]
pub struct Cli {
    /// Directory to hash. Default: current directory.
    #[arg(value_name = "DIR", default_value = DefaultArgs::DIR)]
    pub dir: PathBuf,

    /// Number of parallel hash workers. Default: 10 (capped by the open-file limit).
    #[arg(long, short = 'w', value_parser = clap::value_parser!(usize))]
    pub workers: Option<usize>,

    /// Verbose output, including pipeline diagnostics.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// Follow symbolic links.
    #[arg(long, short = 'f', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub follow_links: Option<bool>,

    /// Exclude patterns (glob syntax). Can specify multiple: -e pattern1 pattern2 pattern3
    #[arg(long, short = 'e', num_args = 1..)]
    pub exclude: Vec<String>,

    /// Stop the run after this many seconds.
    #[arg(long, short = 't', value_parser = clap::value_parser!(u64))]
    pub timeout: Option<u64>,

    /// Print one JSON object per file instead of `HASH  PATH`.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub json: Option<bool>,
}
