//! Parser for transcript-assembly logs.
//!
//! StringTie writes one `>bundle` line per bundle it processes when run in
//! verbose mode, for example:
//!
//! ```text
//! >bundle chr1:11869-31109 [142 alignments (57 distinct), 6 junctions, 5 guides] begins processing...
//! ```
//!
//! Only the `chrom:start-end` part of such lines is used. Every other line,
//! and any `>bundle` line that does not fit the pattern, is skipped.
//!
//! Supported inputs:
//! - plain text logs
//! - gzip-compressed logs (`.gz`)

use std::collections::BTreeSet;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use flate2::read::GzDecoder;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::core::bundle::Bundle;

/// Literal marker preceding each bundle interval
pub const BUNDLE_MARKER: &str = ">bundle";

static BUNDLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">bundle (\S+):(\d+)-(\d+)").expect("valid bundle pattern"));

#[derive(Error, Debug)]
pub enum LogError {
    #[error("Failed to read assembly log: {0}")]
    Io(#[from] std::io::Error),
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Parse an assembly log file and return its unique bundles, sorted.
///
/// # Errors
///
/// Returns `LogError::Io` if the file cannot be opened or read.
pub fn parse_log_file(path: &Path) -> Result<Vec<Bundle>, LogError> {
    let file = std::fs::File::open(path)?;

    let bundles = if is_gzipped(path) {
        parse_log_reader(BufReader::new(GzDecoder::new(file)))?
    } else {
        parse_log_reader(BufReader::new(file))?
    };

    debug!(
        path = %path.display(),
        bundles = bundles.len(),
        "Parsed assembly log"
    );

    Ok(bundles)
}

/// Parse bundles from any buffered reader.
///
/// Lines are decoded lossily so stray non-UTF-8 bytes in a log never abort
/// parsing. Duplicates are removed and the result is sorted by
/// (chromosome, start, end).
///
/// # Errors
///
/// Returns `LogError::Io` if reading fails.
pub fn parse_log_reader<R: BufRead>(mut reader: R) -> Result<Vec<Bundle>, LogError> {
    let mut bundles = BTreeSet::new();
    let mut buf = Vec::new();
    let mut skipped = 0usize;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }

        let line = String::from_utf8_lossy(&buf);
        if !line.contains(BUNDLE_MARKER) {
            continue;
        }

        match parse_bundle_line(&line) {
            Some(bundle) => {
                bundles.insert(bundle);
            }
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(skipped, "Skipped malformed bundle lines");
    }

    Ok(bundles.into_iter().collect())
}

/// Extract a bundle from a single log line, if it carries one
#[must_use]
pub fn parse_bundle_line(line: &str) -> Option<Bundle> {
    let caps = BUNDLE_PATTERN.captures(line)?;
    let start = caps[2].parse::<u64>().ok()?;
    let end = caps[3].parse::<u64>().ok()?;
    Some(Bundle::new(&caps[1], start, end))
}
