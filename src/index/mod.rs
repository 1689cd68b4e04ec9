//! Set-similarity index over bundle read sets.
//!
//! [`SimilarityIndex`] answers "which member sets have Jaccard similarity at
//! least `t` to this query?" without comparing the query to every member.
//!
//! ## Algorithm
//!
//! 1. **Posting lists**: at build time every read name is mapped to the ids
//!    of the sets containing it
//! 2. **Candidate generation**: a query walks the posting lists of its reads,
//!    counting shared reads per set. Sets sharing no read are never touched
//! 3. **Size filter**: sets whose size lies outside `[t·|Q|, |Q|/t]` cannot
//!    reach the threshold and are skipped
//! 4. **Verification**: Jaccard is computed exactly from the shared-read
//!    count and compared against `t`
//!
//! The result is exact: no estimated similarities and no missed pairs.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use bundle_match::index::SimilarityIndex;
//! use bundle_match::ReadSet;
//!
//! let a: ReadSet = ["r1", "r2", "r3"].iter().map(|s| s.to_string()).collect();
//! let b: ReadSet = ["r2", "r3", "r4"].iter().map(|s| s.to_string()).collect();
//!
//! let index = SimilarityIndex::build(vec![Arc::new(b)], 0.1).unwrap();
//! let hits = index.query(&a);
//! assert_eq!(hits[0].jaccard, 0.5);
//! ```

pub mod similarity;

pub use similarity::{Hit, IndexError, SimilarityIndex};
