use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use rayon::prelude::*;
use tracing::debug;

use crate::core::bundle::Bundle;
use crate::core::types::ReadSet;
use crate::reads::source::{AlignmentSource, ExtractError};

/// Configuration for read-set extraction
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Keep records flagged unmapped (placed unmapped mates) in read sets
    pub include_unmapped: bool,

    /// Upper bound on the time a single region fetch may take
    pub fetch_timeout: Option<Duration>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            include_unmapped: true,
            fetch_timeout: None,
        }
    }
}

/// Number of alignment records overlapping `bundle`, named or not.
///
/// Unlike read sets this counts records, so both mates of a pair and
/// records without a name are included.
///
/// # Errors
///
/// Propagates any `ExtractError` from the source unchanged.
pub fn count_records(
    source: &dyn AlignmentSource,
    bundle: &Bundle,
    config: &ExtractConfig,
) -> Result<usize, ExtractError> {
    let deadline = config.fetch_timeout.map(|t| Instant::now() + t);
    let records = source.fetch(bundle, deadline)?;
    Ok(records
        .iter()
        .filter(|r| config.include_unmapped || !r.unmapped)
        .count())
}

type CacheKey = (PathBuf, Bundle);
type Slot = Arc<Mutex<Option<Arc<ReadSet>>>>;

/// Memoizing read-set extractor
///
/// Each (file, bundle) region is fetched at most once per extractor, even
/// when many workers ask for it at the same time: the first caller fetches
/// while holding the region's slot, later callers wait on the slot and get
/// the cached set. A failed fetch leaves the slot empty, so the error is
/// reported to the caller and the region is retried on the next request.
#[derive(Debug, Default)]
pub struct ReadSetExtractor {
    config: ExtractConfig,
    slots: DashMap<CacheKey, Slot>,
}

impl ReadSetExtractor {
    pub fn new(config: ExtractConfig) -> Self {
        Self {
            config,
            slots: DashMap::new(),
        }
    }

    /// Read names supporting `bundle` in `source`
    ///
    /// # Errors
    ///
    /// Propagates any `ExtractError` from the source unchanged.
    pub fn extract(
        &self,
        source: &dyn AlignmentSource,
        bundle: &Bundle,
    ) -> Result<Arc<ReadSet>, ExtractError> {
        let key = (source.path().to_path_buf(), bundle.clone());

        // Clone the slot out so the map shard lock is released before fetching
        let slot = Arc::clone(self.slots.entry(key).or_default().value());

        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(reads) = guard.as_ref() {
            return Ok(Arc::clone(reads));
        }

        let deadline = self.config.fetch_timeout.map(|t| Instant::now() + t);
        let records = source.fetch(bundle, deadline)?;
        let total = records.len();

        let reads: ReadSet = records
            .into_iter()
            .filter(|r| self.config.include_unmapped || !r.unmapped)
            .filter_map(|r| r.name)
            .collect();

        debug!(
            path = %source.path().display(),
            bundle = %bundle,
            records = total,
            reads = reads.len(),
            "Extracted read set"
        );

        let reads = Arc::new(reads);
        *guard = Some(Arc::clone(&reads));
        Ok(reads)
    }

    /// Extract read sets for many bundles in parallel, preserving order
    ///
    /// # Errors
    ///
    /// Returns the first `ExtractError` encountered.
    pub fn extract_all(
        &self,
        source: &dyn AlignmentSource,
        bundles: &[Bundle],
    ) -> Result<Vec<Arc<ReadSet>>, ExtractError> {
        bundles
            .par_iter()
            .map(|bundle| self.extract(source, bundle))
            .collect()
    }

    /// Number of regions with a cached read set
    pub fn cached_len(&self) -> usize {
        self.slots
            .iter()
            .filter(|entry| {
                entry
                    .value()
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .is_some()
            })
            .count()
    }
}
