//! # bundle-match
//!
//! A library for matching transcript-assembly bundles by the reads that
//! support them.
//!
//! StringTie groups overlapping alignments into *bundles* and, in verbose
//! mode, logs each one as `>bundle chrom:start-end`. When the same sample is
//! assembled twice (different versions, parameters or inputs), bundle
//! boundaries shift, so coordinates alone do not say which bundles
//! correspond. Two bundles built from largely the same reads do.
//!
//! `bundle-match` collects each bundle's read names from the run's indexed
//! BAM file and reports bundle pairs whose read sets reach a Jaccard
//! similarity threshold.
//!
//! ## Features
//!
//! - **Log parsing**: Extracts unique bundles from plain or gzipped logs
//! - **Read extraction**: Fetches read names per region, each region once
//! - **Exact similarity search**: Inverted read index with size pruning, no
//!   approximate scores
//! - **Cross and self modes**: New run against old (either or both
//!   directions), or one run against itself
//!
//! ## Example
//!
//! ```rust,no_run
//! use bundle_match::parsing::log::parse_log_file;
//! use bundle_match::{BamSource, BundleCollection, MatchReporter, MatchingConfig, ReadSetExtractor};
//! use bundle_match::Direction;
//! use std::path::Path;
//!
//! let extractor = ReadSetExtractor::default();
//! let load = |log: &str, bam: &str| {
//!     let bundles = parse_log_file(Path::new(log)).unwrap();
//!     let source = BamSource::open(Path::new(bam)).unwrap();
//!     let sets = extractor.extract_all(&source, &bundles).unwrap();
//!     BundleCollection::new(bundles, sets).unwrap()
//! };
//!
//! let old = load("old.log", "old.bam");
//! let new = load("new.log", "new.bam");
//!
//! let reporter = MatchReporter::new(MatchingConfig::default());
//! for m in reporter.cross(&old, &new, Direction::NewToOld).unwrap() {
//!     println!("{} -> {}: {:.4}", m.query, m.candidate, m.jaccard);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Bundles, read sets and match records
//! - [`parsing`]: StringTie log parsing
//! - [`reads`]: Read-name extraction from indexed BAM files
//! - [`index`]: Set-similarity index
//! - [`matching`]: Match reporting and CSV output
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod index;
pub mod matching;
pub mod parsing;
pub mod reads;
pub mod utils;

// Re-export commonly used types for convenience
pub use crate::core::bundle::Bundle;
pub use crate::core::types::*;
pub use index::{Hit, SimilarityIndex};
pub use matching::{BundleCollection, MatchReporter, MatchingConfig};
pub use reads::{BamSource, ReadSetExtractor};
