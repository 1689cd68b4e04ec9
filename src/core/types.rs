use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::core::bundle::Bundle;

/// Names of the reads supporting one bundle in one alignment file
pub type ReadSet = HashSet<String>;

/// Which collection is queried against which index in a cross comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Query new bundles against an index of old bundles
    NewToOld,
    /// Query old bundles against an index of new bundles
    OldToNew,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NewToOld => write!(f, "new->old"),
            Self::OldToNew => write!(f, "old->new"),
        }
    }
}

/// A pair of bundles whose read sets reached the similarity threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleMatch {
    /// Bundle whose read set was used as the query
    pub query: Bundle,

    /// Bundle found in the index
    pub candidate: Bundle,

    /// Number of reads supporting the query bundle
    pub query_size: usize,

    /// Number of reads supporting the candidate bundle
    pub candidate_size: usize,

    /// Number of reads shared by both bundles
    pub overlap: usize,

    /// Exact Jaccard similarity of the two read sets
    pub jaccard: f64,
}
