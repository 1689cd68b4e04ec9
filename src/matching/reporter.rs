use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::bundle::Bundle;
use crate::core::types::{BundleMatch, Direction, ReadSet};
use crate::index::similarity::{Hit, IndexError, SimilarityIndex};

/// Default minimum Jaccard similarity for reporting a pair
pub const DEFAULT_JACCARD_THRESHOLD: f64 = 0.1;

/// Configuration for the match reporter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Minimum Jaccard similarity, used both to build indexes and to filter hits
    pub threshold: f64,
    /// Prune candidates by set size before verification
    pub size_filter: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_JACCARD_THRESHOLD,
            size_filter: true,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CollectionError {
    #[error("{bundles} bundles but {sets} read sets; every bundle needs exactly one")]
    LengthMismatch { bundles: usize, sets: usize },
}

/// Bundles of one assembly run with their read sets, index-aligned
#[derive(Debug, Clone, Default)]
pub struct BundleCollection {
    bundles: Vec<Bundle>,
    sets: Vec<Arc<ReadSet>>,
}

impl BundleCollection {
    /// Pair each bundle with the read set at the same position.
    ///
    /// # Errors
    ///
    /// Returns `CollectionError::LengthMismatch` if `bundles` and `sets`
    /// differ in length.
    pub fn new(bundles: Vec<Bundle>, sets: Vec<Arc<ReadSet>>) -> Result<Self, CollectionError> {
        if bundles.len() != sets.len() {
            return Err(CollectionError::LengthMismatch {
                bundles: bundles.len(),
                sets: sets.len(),
            });
        }
        Ok(Self { bundles, sets })
    }

    pub fn bundles(&self) -> &[Bundle] {
        &self.bundles
    }

    pub fn sets(&self) -> &[Arc<ReadSet>] {
        &self.sets
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    /// Total number of read-set entries across all bundles
    pub fn total_reads(&self) -> usize {
        self.sets.iter().map(|s| s.len()).sum()
    }
}

/// Builds similarity indexes over bundle collections and turns query hits
/// into scored bundle pairs
pub struct MatchReporter {
    config: MatchingConfig,
}

impl MatchReporter {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    fn build_index(&self, collection: &BundleCollection) -> Result<SimilarityIndex, IndexError> {
        let index = SimilarityIndex::build(collection.sets.clone(), self.config.threshold)?
            .with_size_filter(self.config.size_filter);

        debug!(
            sets = index.len(),
            distinct_reads = index.distinct_reads(),
            "Built similarity index"
        );

        Ok(index)
    }

    /// Compare two runs in one direction.
    ///
    /// `NewToOld` queries every new bundle against an index of the old run;
    /// `OldToNew` does the reverse. The query bundle is always reported first.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::InvalidThreshold` if the configured threshold is
    /// outside (0, 1].
    pub fn cross(
        &self,
        old: &BundleCollection,
        new: &BundleCollection,
        direction: Direction,
    ) -> Result<Vec<BundleMatch>, IndexError> {
        let (queries, targets) = match direction {
            Direction::NewToOld => (new, old),
            Direction::OldToNew => (old, new),
        };

        let index = self.build_index(targets)?;
        let hits = index.query_many(&queries.sets);
        let matches = collect_matches(queries, targets, hits, |_, _| true);

        info!(
            direction = %direction,
            queries = queries.len(),
            targets = targets.len(),
            matches = matches.len(),
            "Cross comparison complete"
        );

        Ok(matches)
    }

    /// Compare two runs in both directions, new→old results first.
    ///
    /// The directions are computed independently; a pair found one way is
    /// not assumed to appear the other way.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::InvalidThreshold` if the configured threshold is
    /// outside (0, 1].
    pub fn cross_both(
        &self,
        old: &BundleCollection,
        new: &BundleCollection,
    ) -> Result<Vec<BundleMatch>, IndexError> {
        let mut matches = self.cross(old, new, Direction::NewToOld)?;
        matches.extend(self.cross(old, new, Direction::OldToNew)?);
        Ok(matches)
    }

    /// Compare the bundles of one run against each other.
    ///
    /// Each unordered pair is reported at most once, with the earlier bundle
    /// (in collection order) as the query. A bundle is never paired with
    /// itself.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::InvalidThreshold` if the configured threshold is
    /// outside (0, 1].
    pub fn within(&self, collection: &BundleCollection) -> Result<Vec<BundleMatch>, IndexError> {
        let index = self.build_index(collection)?;
        let hits = index.query_many(&collection.sets);
        let matches = collect_matches(collection, collection, hits, |query, hit| hit > query);

        info!(
            bundles = collection.len(),
            matches = matches.len(),
            "Self comparison complete"
        );

        Ok(matches)
    }
}

/// Turn per-query hits into bundle pairs, keeping query order and, within a
/// query, ascending candidate order
fn collect_matches<F>(
    queries: &BundleCollection,
    targets: &BundleCollection,
    hits: Vec<Vec<Hit>>,
    keep: F,
) -> Vec<BundleMatch>
where
    F: Fn(usize, usize) -> bool,
{
    let keep = &keep;
    hits.into_iter()
        .enumerate()
        .flat_map(move |(qi, query_hits)| {
            query_hits
                .into_iter()
                .filter(move |hit| keep(qi, hit.id))
                .map(move |hit| BundleMatch {
                    query: queries.bundles[qi].clone(),
                    candidate: targets.bundles[hit.id].clone(),
                    query_size: queries.sets[qi].len(),
                    candidate_size: targets.sets[hit.id].len(),
                    overlap: hit.overlap,
                    jaccard: hit.jaccard,
                })
        })
        .collect()
}
