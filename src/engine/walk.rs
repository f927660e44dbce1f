//! Directory walk: the source payload. Emits every regular file under the root.

use anyhow::{Result, anyhow};
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::Opts;
use crate::pipeline::Emitter;

use super::tools::is_excluded;

/// What the walk needs from [`Opts`], owned so it can move into the source task.
#[derive(Clone, Debug)]
pub struct WalkPlan {
    pub root: PathBuf,
    pub follow_links: bool,
    pub exclude: Vec<String>,
}

impl WalkPlan {
    pub fn new(root: &Path, opts: &Opts) -> Self {
        WalkPlan {
            root: root.to_path_buf(),
            follow_links: opts.follow_links,
            exclude: opts.exclude.clone(),
        }
    }
}

/// Walk `plan.root` and emit regular files. Excluded directories are pruned, not descended.
/// Any walk error is fatal for the run; cancellation ends the walk cleanly.
pub fn walk_files(plan: &WalkPlan, emitter: &Emitter<PathBuf>) -> Result<()> {
    let mut sent = 0_usize;
    let walker = WalkDir::new(&plan.root)
        .follow_links(plan.follow_links)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_excluded(e.path(), &plan.exclude));
    for entry in walker {
        if emitter.is_cancelled() {
            debug!("walk: cancelled after {} files", sent);
            return Ok(());
        }
        let entry = entry.map_err(|err| {
            let path = err
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| plan.root.display().to_string());
            anyhow!(err).context(format!("error walking {}", path))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Err(reason) = emitter.emit(entry.into_path()) {
            debug!("walk: stopped after {} files ({})", sent, reason);
            return Ok(());
        }
        sent += 1;
    }
    debug!("walk: done, {} files queued", sent);
    Ok(())
}
