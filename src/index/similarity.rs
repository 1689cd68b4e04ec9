use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;
use thiserror::Error;

use crate::core::types::ReadSet;
use crate::matching::scoring::{count_to_f64, jaccard_from_counts, size_bounds};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error("Invalid similarity threshold {0}: must be in (0, 1]")]
    InvalidThreshold(f64),
}

/// One set found by a query, with its exact similarity to the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Position of the matched set in the collection the index was built from
    pub id: usize,

    /// Number of reads shared with the query
    pub overlap: usize,

    /// Exact Jaccard similarity to the query
    pub jaccard: f64,
}

/// Inverted index over a fixed collection of read sets
///
/// Built once, then queried read-only. Every query returns exactly the
/// member sets whose Jaccard similarity to the query is at least the
/// threshold, with the exact similarity value. Candidate generation never
/// drops a set that shares a read with the query, and size pruning only
/// drops sets that cannot reach the threshold.
#[derive(Debug)]
pub struct SimilarityIndex {
    /// Member sets, addressed by their position
    sets: Vec<Arc<ReadSet>>,

    /// Cardinality of each member set
    sizes: Vec<usize>,

    /// Index: read name -> ids of member sets containing it (ascending)
    postings: HashMap<String, Vec<usize>>,

    /// Minimum Jaccard similarity for a hit
    threshold: f64,

    /// Skip posting entries whose set size cannot reach the threshold
    size_filter: bool,
}

impl SimilarityIndex {
    /// Build an index over `sets` with the given similarity threshold.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::InvalidThreshold` unless `0 < threshold <= 1`.
    pub fn build(sets: Vec<Arc<ReadSet>>, threshold: f64) -> Result<Self, IndexError> {
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(IndexError::InvalidThreshold(threshold));
        }

        let sizes: Vec<usize> = sets.iter().map(|s| s.len()).collect();

        let mut postings: HashMap<String, Vec<usize>> = HashMap::new();
        for (id, set) in sets.iter().enumerate() {
            for read in set.iter() {
                postings.entry(read.clone()).or_default().push(id);
            }
        }

        Ok(Self {
            sets,
            sizes,
            postings,
            threshold,
            size_filter: true,
        })
    }

    /// Enable or disable size pruning during candidate generation
    #[must_use]
    pub fn with_size_filter(mut self, enabled: bool) -> Self {
        self.size_filter = enabled;
        self
    }

    /// Candidate sets for a query, with their exact overlap
    ///
    /// Every read of `query` is looked up once, and each posting list holds
    /// a set id at most once, so the accumulated count per candidate is
    /// exactly |query ∩ set|. Returned in ascending id order.
    pub fn candidates(&self, query: &ReadSet) -> Vec<(usize, usize)> {
        if query.is_empty() {
            return Vec::new();
        }

        let (min_size, max_size) = size_bounds(query.len(), self.threshold);
        let mut counts: HashMap<usize, usize> = HashMap::new();

        for read in query {
            let Some(ids) = self.postings.get(read) else {
                continue;
            };
            for &id in ids {
                if self.size_filter {
                    let size = count_to_f64(self.sizes[id]);
                    if size < min_size || size > max_size {
                        continue;
                    }
                }
                *counts.entry(id).or_default() += 1;
            }
        }

        let mut candidates: Vec<_> = counts.into_iter().collect();
        candidates.sort_unstable_by_key(|&(id, _)| id);
        candidates
    }

    /// Find all member sets whose Jaccard similarity to `query` is at least
    /// the threshold, in ascending id order.
    ///
    /// An empty query matches nothing. If the query itself is a member of the
    /// index it is returned as a hit with similarity 1; excluding it is up to
    /// the caller.
    pub fn query(&self, query: &ReadSet) -> Vec<Hit> {
        self.candidates(query)
            .into_iter()
            .filter_map(|(id, overlap)| {
                let jaccard = jaccard_from_counts(query.len(), self.sizes[id], overlap);
                (jaccard >= self.threshold).then_some(Hit {
                    id,
                    overlap,
                    jaccard,
                })
            })
            .collect()
    }

    /// Run many queries in parallel. Results follow the order of `queries`.
    pub fn query_many(&self, queries: &[Arc<ReadSet>]) -> Vec<Vec<Hit>> {
        queries.par_iter().map(|q| self.query(q)).collect()
    }

    /// Similarity threshold the index was built with
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Member set by id
    pub fn set(&self, id: usize) -> Option<&Arc<ReadSet>> {
        self.sets.get(id)
    }

    /// Cardinality of a member set
    pub fn set_size(&self, id: usize) -> Option<usize> {
        self.sizes.get(id).copied()
    }

    /// Number of member sets containing `read`
    pub fn posting_len(&self, read: &str) -> usize {
        self.postings.get(read).map_or(0, Vec::len)
    }

    /// Number of distinct reads across all member sets
    pub fn distinct_reads(&self) -> usize {
        self.postings.len()
    }

    /// Number of member sets
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Check if the index has no member sets
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
