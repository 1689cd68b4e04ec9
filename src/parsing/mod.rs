//! Parsers for assembly run outputs.
//!
//! This module provides parsers for:
//!
//! - **Assembly logs**: Extract `>bundle chrom:start-end` intervals from
//!   StringTie verbose logs, plain or gzip-compressed
//!
//! ## Example
//!
//! ```rust,no_run
//! use bundle_match::parsing::log::{parse_log_file, parse_bundle_line};
//! use std::path::Path;
//!
//! // Parse every unique bundle in a log
//! let bundles = parse_log_file(Path::new("stringtie.log")).unwrap();
//!
//! // Or a single line
//! let bundle = parse_bundle_line(">bundle chr1:11869-31109 [142 alignments]");
//! ```

pub mod log;
