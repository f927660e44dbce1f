//! pipehash CLI: hash every file under a directory through the worker pipeline.

use anyhow::Result;
use clap::Parser;
use pipehash::engine::arg_parser::Cli;
use pipehash::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
