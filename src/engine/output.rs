//! Digest printing: the sink payload.

use serde::Serialize;
use std::io::Write;

use crate::FileDigest;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// `HASH  PATH`, like `b3sum`.
    Plain,
    /// One JSON object per line.
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Plain }
    }
}

#[derive(Serialize)]
struct DigestLine<'a> {
    path: std::borrow::Cow<'a, str>,
    size: u64,
    blake3: String,
}

pub fn format_digest(digest: &FileDigest, format: OutputFormat) -> String {
    match format {
        OutputFormat::Plain => format!("{}  {}", digest.hex(), digest.path.display()),
        OutputFormat::Json => {
            let line = DigestLine {
                path: digest.path.to_string_lossy(),
                size: digest.size,
                blake3: digest.hex(),
            };
            // Only strings and integers: serialization cannot fail.
            serde_json::to_string(&line).unwrap_or_default()
        }
    }
}

/// Write one digest line to stdout. Write failures (e.g. a closed pipe) are logged and dropped.
pub fn print_digest(digest: &FileDigest, format: OutputFormat) {
    let line = format_digest(digest, format);
    let mut out = std::io::stdout().lock();
    if let Err(e) = writeln!(out, "{}", line) {
        log::debug!("stdout write failed: {}", e);
    }
}
