//! Bundle matching and reporting.
//!
//! This module turns bundle read sets into scored bundle pairs:
//!
//! - [`MatchReporter`]: builds similarity indexes and runs cross- or
//!   self-comparisons
//! - [`scoring`]: exact Jaccard similarity and the size bound used for pruning
//! - [`output`]: CSV report layouts
//!
//! ## Modes
//!
//! - **Cross, new→old**: every bundle of the new run is looked up in an index
//!   of the old run
//! - **Cross, old→new**: the reverse lookup, run independently
//! - **Self**: bundles of one run against each other, each unordered pair
//!   reported once
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use bundle_match::{Bundle, BundleCollection, MatchReporter, MatchingConfig, ReadSet};
//!
//! let reads = |names: &[&str]| -> Arc<ReadSet> {
//!     Arc::new(names.iter().map(|s| s.to_string()).collect())
//! };
//!
//! let run = BundleCollection::new(
//!     vec![Bundle::new("chr1", 100, 200), Bundle::new("chr1", 150, 300)],
//!     vec![reads(&["r1", "r2", "r3"]), reads(&["r2", "r3", "r4"])],
//! )
//! .unwrap();
//!
//! let reporter = MatchReporter::new(MatchingConfig::default());
//! for m in reporter.within(&run).unwrap() {
//!     println!("{} ~ {}: {:.4}", m.query, m.candidate, m.jaccard);
//! }
//! ```

pub mod output;
pub mod reporter;
pub mod scoring;

pub use reporter::{BundleCollection, CollectionError, MatchReporter, MatchingConfig};
