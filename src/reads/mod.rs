//! Read-set extraction from alignment files.
//!
//! - [`source`]: the [`AlignmentSource`] trait and the noodles-backed
//!   [`BamSource`]
//! - [`extractor`]: [`ReadSetExtractor`], which turns (file, bundle) into the
//!   set of supporting read names and caches the result
//!
//! ## Example
//!
//! ```rust,no_run
//! use bundle_match::reads::{BamSource, ExtractConfig, ReadSetExtractor};
//! use bundle_match::Bundle;
//! use std::path::Path;
//!
//! let bam = BamSource::open(Path::new("sample.bam")).unwrap();
//! let extractor = ReadSetExtractor::new(ExtractConfig::default());
//!
//! let reads = extractor
//!     .extract(&bam, &Bundle::new("chr1", 11_869, 31_109))
//!     .unwrap();
//! println!("{} reads", reads.len());
//! ```

pub mod extractor;
pub mod source;

pub use extractor::{count_records, ExtractConfig, ReadSetExtractor};
pub use source::{AlignmentRecord, AlignmentSource, BamSource, ExtractError};
