//! CSV layouts for match and count reports.
//!
//! The column layouts follow the reports downstream notebooks already read:
//! the cross report separates fields with `", "`, the self report with a bare
//! `,`.

use std::io::Write;

use crate::core::bundle::Bundle;
use crate::core::types::BundleMatch;

pub const CROSS_HEADER: &str = "Bundle1, Bundle2, Size1, Size2, Jaccard";

pub const SELF_HEADER: &str = "Bundle,Matched Bundle,Size of Original Bundle,Size of Matched Bundle,Overlapping Reads,Jaccard";

pub const COUNT_HEADER: &str = "Bundle, TotalReads, Coordinates";

/// Write a cross-comparison report
///
/// # Errors
///
/// Returns any I/O error from the writer.
pub fn write_cross_csv<W: Write>(writer: &mut W, matches: &[BundleMatch]) -> std::io::Result<()> {
    writeln!(writer, "{CROSS_HEADER}")?;
    for m in matches {
        writeln!(
            writer,
            "{}, {}, {}, {}, {:.4}",
            m.query, m.candidate, m.query_size, m.candidate_size, m.jaccard
        )?;
    }
    writer.flush()
}

/// Write a self-comparison report
///
/// # Errors
///
/// Returns any I/O error from the writer.
pub fn write_self_csv<W: Write>(writer: &mut W, matches: &[BundleMatch]) -> std::io::Result<()> {
    writeln!(writer, "{SELF_HEADER}")?;
    for m in matches {
        writeln!(
            writer,
            "{},{},{},{},{},{:.4}",
            m.query, m.candidate, m.query_size, m.candidate_size, m.overlap, m.jaccard
        )?;
    }
    writer.flush()
}

/// Write per-bundle alignment record counts
///
/// # Errors
///
/// Returns any I/O error from the writer.
pub fn write_count_csv<W: Write>(writer: &mut W, counts: &[(Bundle, usize)]) -> std::io::Result<()> {
    writeln!(writer, "{COUNT_HEADER}")?;
    for (bundle, total) in counts {
        writeln!(writer, "{bundle}, {total}, {bundle}")?;
    }
    writer.flush()
}
