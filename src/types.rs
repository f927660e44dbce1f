//! Public types for the directory hasher built on the pipeline core.

use std::path::PathBuf;
use std::time::Duration;

use crate::pipeline::Cause;
use crate::utils::config::DefaultArgs;

/// Blake3 digest of one regular file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileDigest {
    /// Path as produced by the walk (root-joined, not canonicalized).
    pub path: PathBuf,
    pub size: u64,
    pub hash: [u8; 32],
}

impl FileDigest {
    /// Lowercase hex of [`Self::hash`].
    pub fn hex(&self) -> String {
        blake3::Hash::from_bytes(self.hash).to_hex().to_string()
    }
}

/// Options for [`hash_dir`](crate::hash_dir). The CLI layers `.pipehash.toml` and flags on top of
/// [`Opts::default`].
#[derive(Clone, Debug)]
pub struct Opts {
    /// Parallel hash workers (capped by the FD limit at run time).
    pub workers: usize,
    /// Follow symbolic links while walking.
    pub follow_links: bool,
    /// Exclude patterns (glob syntax, matched against file name and full path).
    pub exclude: Vec<String>,
    /// Debug logging plus pipeline diagnostics.
    pub verbose: bool,
    /// CLI output: one JSON object per line instead of `HASH  PATH`.
    pub json: bool,
    /// Overall deadline for the run.
    pub timeout: Option<Duration>,
}

impl Default for Opts {
    fn default() -> Self {
        Opts {
            workers: DefaultArgs::WORKERS,
            follow_links: false,
            exclude: Vec::new(),
            verbose: false,
            json: false,
            timeout: None,
        }
    }
}

/// What a [`hash_dir`](crate::hash_dir) run did and how it ended.
#[derive(Debug)]
pub struct RunSummary {
    /// Digests handed to the consumer.
    pub files: usize,
    /// Total size of those files.
    pub bytes: u64,
    pub elapsed: Duration,
    /// True if the run's scope was stopped before the stream ended on its own.
    pub stopped: bool,
    /// Abort reason. `None` on success and on a graceful stop.
    pub cause: Option<Cause>,
}

impl RunSummary {
    /// Finished without being stopped.
    pub fn completed(&self) -> bool {
        !self.stopped
    }
}
