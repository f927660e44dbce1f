//! Load `.pipehash.toml` from the target directory (CLI only). Library callers build [`Opts`] themselves.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::Opts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PipehashToml {
    #[serde(default)]
    settings: Settings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Settings {
    workers: Option<usize>,
    verbose: Option<bool>,
    follow_links: Option<bool>,
    exclude: Option<Vec<String>>,
    json: Option<bool>,
    /// Seconds.
    timeout: Option<u64>,
}

pub(crate) fn parse_pipehash_toml(s: &str) -> Result<PipehashToml> {
    Ok(toml::from_str(s)?)
}

/// Load the config file from `dir`. `Ok(None)` when there is none; `Err` when it exists but
/// cannot be read or parsed (caller decides whether that is fatal).
pub(crate) fn load_pipehash_toml(dir: &Path) -> Result<Option<PipehashToml>> {
    let path = dir.join(PackagePaths::get().config_filename());
    if !path.is_file() {
        return Ok(None);
    }
    let s = std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    parse_pipehash_toml(&s)
        .with_context(|| format!("parse {}", path.display()))
        .map(Some)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($settings:expr, $opts:expr, $field:ident) => {
        if let Some(v) = $settings.$field.clone() {
            $opts.$field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI flags.
pub(crate) fn apply_file_to_opts(file: &PipehashToml, opts: &mut Opts) {
    let s = &file.settings;
    apply_file_opt!(s, opts, workers);
    apply_file_opt!(s, opts, verbose);
    apply_file_opt!(s, opts, follow_links);
    apply_file_opt!(s, opts, exclude);
    apply_file_opt!(s, opts, json);
    if let Some(secs) = s.timeout {
        opts.timeout = Some(Duration::from_secs(secs));
    }
}
