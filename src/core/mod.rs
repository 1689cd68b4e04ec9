//! Core data types for bundle matching.
//!
//! - [`Bundle`]: a genomic interval (chromosome, start, end) from an assembly log
//! - [`ReadSet`]: the names of the reads supporting a bundle
//! - [`BundleMatch`]: a scored pair of bundles above the similarity threshold
//! - [`Direction`]: which run is queried against which in a cross comparison
//!
//! ## Coordinates
//!
//! Bundle coordinates are kept exactly as the assembler printed them. They
//! are only translated when a region is fetched from an alignment file (see
//! [`crate::reads::source`]).

pub mod bundle;
pub mod types;

pub use bundle::Bundle;
pub use types::{BundleMatch, Direction, ReadSet};
