//! CLI command handler: layer config, install the Ctrl-C hook, run the hasher, map the outcome.

use anyhow::{Result, anyhow};
use log::{info, warn};
use std::time::Duration;

use crate::Opts;
use crate::engine::arg_parser::Cli;
use crate::engine::output::{OutputFormat, print_digest};
use crate::hash_dir::hash_dir;
use crate::pipeline::Scope;
use crate::utils::pipehash_toml::{apply_file_to_opts, load_pipehash_toml};
use crate::utils::setup_logging;

/// Overwrite opts field from a CLI flag when given.
macro_rules! apply_cli_opt {
    ($cli:expr, $opts:expr, $field:ident) => {
        if let Some(v) = $cli.$field {
            $opts.$field = v;
        }
    };
}

/// Defaults, then `.pipehash.toml` in DIR, then CLI flags.
fn setup_opts(cli: &Cli) -> Opts {
    let mut opts = Opts::default();
    let file = load_pipehash_toml(&cli.dir);
    if let Ok(Some(file)) = &file {
        apply_file_to_opts(file, &mut opts);
    }
    apply_cli_opt!(cli, opts, workers);
    apply_cli_opt!(cli, opts, verbose);
    apply_cli_opt!(cli, opts, follow_links);
    apply_cli_opt!(cli, opts, json);
    if !cli.exclude.is_empty() {
        opts.exclude.extend(cli.exclude.iter().cloned());
    }
    if let Some(secs) = cli.timeout {
        opts.timeout = Some(Duration::from_secs(secs));
    }

    setup_logging(opts.verbose);
    // Logged only now that the logger exists.
    if let Err(e) = file {
        warn!("ignoring config file: {:#}", e);
    }
    opts
}

/// Cancel `scope` on Ctrl-C. Graceful: no cause is recorded.
fn install_interrupt_handler(scope: &Scope) {
    let scope = scope.clone();
    let installed = ctrlc::set_handler(move || {
        if scope.cancel(None) {
            warn!("Interrupted, stopping pipeline...");
        }
    });
    if let Err(e) = installed {
        warn!("Ctrl-C handler not installed: {}", e);
    }
}

/// Hash `cli.dir`, print each digest, and fail when the pipeline stopped with a cause.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let opts = setup_opts(cli);
    let root_scope = Scope::new();
    install_interrupt_handler(&root_scope);

    info!(
        "Hashing '{}' with {} workers...",
        cli.dir.display(),
        opts.workers
    );
    let format = OutputFormat::from_json_flag(opts.json);
    let summary = hash_dir(&cli.dir, &opts, &root_scope, move |digest| {
        print_digest(&digest, format)
    })?;
    info!(
        "Done in {:?}: {} files, {} bytes.",
        summary.elapsed, summary.files, summary.bytes
    );

    match summary.cause {
        Some(cause) => Err(anyhow!("pipeline stopped with error: {:#}", cause)),
        None if summary.stopped => {
            warn!("Stopped before completion; output is partial.");
            Ok(())
        }
        None => Ok(()),
    }
}
