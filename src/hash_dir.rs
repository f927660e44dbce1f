//! Directory hashing: walk → hash workers → consumer, wired through the pipeline core.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use log::debug;

use crate::engine::hashing::hash_path;
use crate::engine::walk::{WalkPlan, walk_files};
use crate::pipeline::{Controller, PipelineOpts, Scope, fan_out, sink, source};
use crate::utils::fd_limit::cap_workers_by_fd_limit;
use crate::{FileDigest, Opts, RunSummary};

/// Hash every regular file under `root`, handing each digest to `on_digest` as it arrives.
///
/// The run lives inside a child of `parent`: cancelling `parent` (e.g. from a Ctrl-C handler)
/// stops it gracefully. A walk or hash error stops it with that error as
/// [`RunSummary::cause`]. Digests arrive in completion order, not walk order, unless
/// `opts.workers == 1`.
pub fn hash_dir<F>(root: &Path, opts: &Opts, parent: &Scope, mut on_digest: F) -> Result<RunSummary>
where
    F: FnMut(FileDigest) + Send + 'static,
{
    std::fs::metadata(root).with_context(|| format!("cannot access {}", root.display()))?;
    let start = Instant::now();
    let workers = cap_workers_by_fd_limit(opts.workers.max(1));
    let parent = match opts.timeout {
        Some(timeout) => parent.with_timeout(timeout),
        None => parent.clone(),
    };
    let pipeline_opts = if opts.verbose {
        PipelineOpts::default().with_log_diagnostics()
    } else {
        PipelineOpts::default()
    };
    let (controller, scope) = Controller::new(&parent, pipeline_opts);
    debug!(
        "hash_dir: root={} workers={} timeout={:?}",
        root.display(),
        workers,
        opts.timeout
    );

    let walk = WalkPlan::new(root, opts);
    let paths = source(&scope, &controller, move |emitter| walk_files(&walk, emitter));
    let digests = fan_out(&scope, &controller, paths, workers, hash_path);

    let files = Arc::new(AtomicUsize::new(0));
    let bytes = Arc::new(AtomicU64::new(0));
    let (files_w, bytes_w) = (Arc::clone(&files), Arc::clone(&bytes));
    sink(&scope, &controller, digests, move |digest: FileDigest| {
        files_w.fetch_add(1, Ordering::Relaxed);
        bytes_w.fetch_add(digest.size, Ordering::Relaxed);
        on_digest(digest);
    });

    controller.wait_all();

    Ok(RunSummary {
        files: files.load(Ordering::Relaxed),
        bytes: bytes.load(Ordering::Relaxed),
        elapsed: start.elapsed(),
        stopped: scope.is_cancelled(),
        cause: scope.cause(),
    })
}
