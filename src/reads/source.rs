//! Alignment sources: where read names for a bundle come from.
//!
//! [`BamSource`] reads coordinate-sorted, indexed BAM files with noodles.
//! Bundle coordinates are treated the way pysam's `fetch(chrom, start, end)`
//! treats them: 0-based, half-open. They are converted to noodles' 1-based
//! closed interval `[start + 1, end]`.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use noodles::bam;
use noodles::bgzf;
use noodles::core::{Position, Region};
use noodles::csi::{self, BinningIndex};
use noodles::sam;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::bundle::Bundle;
use crate::utils::validation::find_bam_index;

/// How many records are read between deadline checks
const DEADLINE_CHECK_INTERVAL: usize = 1024;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("noodles error reading {path}: {message}")]
    Noodles { path: PathBuf, message: String },

    #[error("Timed out fetching {bundle} from {path} after {records} records")]
    Timeout {
        path: PathBuf,
        bundle: Bundle,
        records: usize,
    },
}

/// The parts of an alignment record the matcher needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentRecord {
    /// Read (query template) name; `None` for records written with `*`
    pub name: Option<String>,

    /// Whether the record is flagged unmapped (0x4)
    pub unmapped: bool,
}

impl AlignmentRecord {
    pub fn new(name: impl Into<String>, unmapped: bool) -> Self {
        Self {
            name: Some(name.into()),
            unmapped,
        }
    }

    pub fn unnamed(unmapped: bool) -> Self {
        Self {
            name: None,
            unmapped,
        }
    }
}

/// Random-access reader of alignment records overlapping a bundle
///
/// Implementations must be shareable across worker threads.
pub trait AlignmentSource: Send + Sync {
    /// Path identifying the underlying file; used as part of cache keys
    fn path(&self) -> &Path;

    /// Fetch every record overlapping `bundle`, named or not.
    ///
    /// A chromosome the source does not know yields no records. When a
    /// `deadline` is given and passes before the fetch finishes, the fetch
    /// fails with `ExtractError::Timeout`.
    ///
    /// # Errors
    ///
    /// Returns `ExtractError::Io` or `ExtractError::Noodles` if reading fails,
    /// or `ExtractError::Timeout` if the deadline passes.
    fn fetch(
        &self,
        bundle: &Bundle,
        deadline: Option<Instant>,
    ) -> Result<Vec<AlignmentRecord>, ExtractError>;
}

type BamReader = bam::io::Reader<bgzf::Reader<File>>;

/// Index loaded next to a BAM file
enum BamIndex {
    Bai(bam::bai::Index),
    Csi(csi::Index),
}

/// Indexed BAM file
///
/// The header and the BAI/CSI index are read once at [`BamSource::open`] and
/// shared by every fetch. Readers are pooled: each fetch borrows an idle
/// reader (or opens a new one) so concurrent fetches never share a file
/// cursor.
pub struct BamSource {
    path: PathBuf,
    header: sam::Header,
    index: BamIndex,
    idle: Mutex<Vec<BamReader>>,
}

impl std::fmt::Debug for BamSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BamSource")
            .field("path", &self.path)
            .field("reference_sequences", &self.header.reference_sequences().len())
            .finish_non_exhaustive()
    }
}

impl BamSource {
    /// Open an indexed BAM file
    ///
    /// The index is looked up as `<path>.bai`, then `<path>.csi`.
    ///
    /// # Errors
    ///
    /// Returns `ExtractError::Io` if the file does not exist, or
    /// `ExtractError::Noodles` if it is not a BAM file, its header cannot be
    /// read, or no readable index sits next to it.
    pub fn open(path: &Path) -> Result<Self, ExtractError> {
        if !path.exists() {
            return Err(ExtractError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            });
        }

        let (reader, header) = open_reader(path)?;

        let index_path = find_bam_index(path).ok_or_else(|| ExtractError::Noodles {
            path: path.to_path_buf(),
            message: "no .bai or .csi index found".to_string(),
        })?;
        let index = read_index(&index_path).map_err(|e| ExtractError::Noodles {
            path: index_path.clone(),
            message: e.to_string(),
        })?;

        debug!(
            path = %path.display(),
            index = %index_path.display(),
            reference_sequences = header.reference_sequences().len(),
            "Opened indexed BAM"
        );

        Ok(Self {
            path: path.to_path_buf(),
            header,
            index,
            idle: Mutex::new(vec![reader]),
        })
    }

    /// The BAM header
    pub fn header(&self) -> &sam::Header {
        &self.header
    }

    /// Whether the BAM header lists `chromosome`
    pub fn has_reference(&self, chromosome: &str) -> bool {
        self.header
            .reference_sequences()
            .contains_key(chromosome.as_bytes())
    }

    fn checkout(&self) -> Result<BamReader, ExtractError> {
        let pooled = self
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();

        match pooled {
            Some(reader) => Ok(reader),
            None => open_reader(&self.path).map(|(reader, _)| reader),
        }
    }

    fn checkin(&self, reader: BamReader) {
        self.idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(reader);
    }

    fn noodles_error(&self, e: &std::io::Error) -> ExtractError {
        ExtractError::Noodles {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }

    fn read_region<I: BinningIndex>(
        &self,
        reader: &mut BamReader,
        index: &I,
        bundle: &Bundle,
        region: &Region,
        deadline: Option<Instant>,
    ) -> Result<Vec<AlignmentRecord>, ExtractError> {
        let query = reader
            .query(&self.header, index, region)
            .map_err(|e| self.noodles_error(&e))?;

        let mut records = Vec::new();
        for (i, result) in query.enumerate() {
            if i % DEADLINE_CHECK_INTERVAL == 0 {
                if let Some(deadline) = deadline {
                    if Instant::now() >= deadline {
                        return Err(ExtractError::Timeout {
                            path: self.path.clone(),
                            bundle: bundle.clone(),
                            records: i,
                        });
                    }
                }
            }

            let record = result.map_err(|e| self.noodles_error(&e))?;
            records.push(AlignmentRecord {
                name: record.name().map(|name| name.to_string()),
                unmapped: record.flags().is_unmapped(),
            });
        }

        Ok(records)
    }
}

fn open_reader(path: &Path) -> Result<(BamReader, sam::Header), ExtractError> {
    let noodles_error = |e: std::io::Error| ExtractError::Noodles {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut reader = File::open(path)
        .map(bam::io::Reader::new)
        .map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let header = reader.read_header().map_err(noodles_error)?;

    Ok((reader, header))
}

fn read_index(path: &Path) -> std::io::Result<BamIndex> {
    if path.extension().is_some_and(|ext| ext == "csi") {
        csi::read(path).map(BamIndex::Csi)
    } else {
        bam::bai::read(path).map(BamIndex::Bai)
    }
}

/// Convert a 0-based half-open bundle to a noodles region.
///
/// Returns `None` when the interval contains no position.
fn bundle_region(bundle: &Bundle) -> Option<Region> {
    if bundle.is_empty() {
        return None;
    }

    let start = usize::try_from(bundle.start.checked_add(1)?).ok()?;
    let end = usize::try_from(bundle.end).ok()?;
    let start = Position::new(start)?;
    let end = Position::new(end)?;

    Some(Region::new(bundle.chromosome.as_str(), start..=end))
}

impl AlignmentSource for BamSource {
    fn path(&self) -> &Path {
        &self.path
    }

    fn fetch(
        &self,
        bundle: &Bundle,
        deadline: Option<Instant>,
    ) -> Result<Vec<AlignmentRecord>, ExtractError> {
        if !self.has_reference(&bundle.chromosome) {
            warn!(
                path = %self.path.display(),
                chromosome = %bundle.chromosome,
                "Reference sequence not in BAM header, treating bundle as empty"
            );
            return Ok(Vec::new());
        }

        let Some(region) = bundle_region(bundle) else {
            return Ok(Vec::new());
        };

        let mut reader = self.checkout()?;
        let records = match &self.index {
            BamIndex::Bai(index) => self.read_region(&mut reader, index, bundle, &region, deadline),
            BamIndex::Csi(index) => self.read_region(&mut reader, index, bundle, &region, deadline),
        }?;
        self.checkin(reader);

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noodles::csi::binning_index::index::reference_sequence::bin::Chunk;
    use noodles::csi::binning_index::Indexer;
    use noodles::sam::alignment::io::Write as _;
    use noodles::sam::alignment::record::cigar::{op::Kind, Op};
    use noodles::sam::alignment::record::Flags;
    use noodles::sam::alignment::RecordBuf;
    use noodles::sam::header::record::value::{map::ReferenceSequence, Map};
    use rayon::prelude::*;
    use std::num::NonZeroUsize;
    use tempfile::TempDir;

    use crate::reads::extractor::{count_records, ExtractConfig, ReadSetExtractor};

    /// (name, 1-based alignment start, aligned length, unmapped flag)
    type FixtureRead = (Option<&'static str>, usize, usize, bool);

    /// Bundle chr1:100-200 covers 1-based positions 101..=200
    const READS: &[FixtureRead] = &[
        (Some("ends_before"), 91, 10, false),
        (Some("left_edge"), 92, 10, false),
        (Some("inside"), 150, 10, false),
        (None, 160, 10, false),
        (Some("placed_mate"), 170, 10, true),
        (Some("right_edge"), 200, 10, false),
        (Some("starts_after"), 201, 10, false),
    ];

    /// Write a coordinate-sorted single-contig BAM and its `.bam.bai` index
    fn write_indexed_bam(dir: &Path, reads: &[FixtureRead]) -> PathBuf {
        let path = dir.join("sample.bam");
        let header = sam::Header::builder()
            .add_reference_sequence(
                "chr1",
                Map::<ReferenceSequence>::new(NonZeroUsize::try_from(10_000).unwrap()),
            )
            .build();

        let mut writer = bam::io::Writer::new(File::create(&path).unwrap());
        writer.write_header(&header).unwrap();

        let mut indexer = Indexer::default();
        let mut chunk_start = writer.get_ref().virtual_position();

        for &(name, start, len, unmapped) in reads {
            let alignment_start = Position::new(start).unwrap();
            let alignment_end = Position::new(start + len - 1).unwrap();

            let mut record = RecordBuf::default();
            *record.name_mut() = name.map(Into::into);
            *record.flags_mut() = if unmapped {
                Flags::UNMAPPED
            } else {
                Flags::empty()
            };
            *record.reference_sequence_id_mut() = Some(0);
            *record.alignment_start_mut() = Some(alignment_start);
            *record.cigar_mut() = [Op::new(Kind::Match, len)].into_iter().collect();
            *record.sequence_mut() = vec![b'A'; len].into();
            writer.write_alignment_record(&header, &record).unwrap();

            let chunk_end = writer.get_ref().virtual_position();
            indexer
                .add_record(
                    Some((0, alignment_start, alignment_end, !unmapped)),
                    Chunk::new(chunk_start, chunk_end),
                )
                .unwrap();
            chunk_start = chunk_end;
        }

        writer.try_finish().unwrap();

        let index: bam::bai::Index = indexer.build(header.reference_sequences().len());
        bam::bai::write(dir.join("sample.bam.bai"), &index).unwrap();

        path
    }

    fn named(records: &[AlignmentRecord]) -> Vec<&str> {
        let mut names: Vec<&str> = records.iter().filter_map(|r| r.name.as_deref()).collect();
        names.sort_unstable();
        names
    }

    #[test]
    fn test_bundle_region_converts_to_one_based() {
        let region = bundle_region(&Bundle::new("chr1", 99, 200)).unwrap();
        assert_eq!(region.name(), &b"chr1"[..]);
        assert_eq!(region.to_string(), "chr1:100-200");
    }

    #[test]
    fn test_bundle_region_from_zero() {
        let region = bundle_region(&Bundle::new("chrM", 0, 16_569)).unwrap();
        assert_eq!(region.to_string(), "chrM:1-16569");
    }

    #[test]
    fn test_bundle_region_empty_interval() {
        assert!(bundle_region(&Bundle::new("chr1", 200, 200)).is_none());
        assert!(bundle_region(&Bundle::new("chr1", 300, 200)).is_none());
    }

    #[test]
    fn test_open_missing_file() {
        let result = BamSource::open(Path::new("/nonexistent/sample.bam"));
        assert!(matches!(result, Err(ExtractError::Io { .. })));
    }

    #[test]
    fn test_open_invalid_file() {
        use std::io::Write;

        let mut temp = tempfile::NamedTempFile::with_suffix(".bam").unwrap();
        temp.write_all(b"this is not a bam file").unwrap();
        temp.flush().unwrap();

        let result = BamSource::open(temp.path());
        assert!(matches!(result, Err(ExtractError::Noodles { .. })));
    }

    #[test]
    fn test_open_without_index() {
        let dir = TempDir::new().unwrap();
        let bam = write_indexed_bam(dir.path(), READS);
        std::fs::remove_file(dir.path().join("sample.bam.bai")).unwrap();

        let result = BamSource::open(&bam);
        assert!(matches!(result, Err(ExtractError::Noodles { .. })));
    }

    #[test]
    fn test_fetch_uses_half_open_bundle_edges() {
        let dir = TempDir::new().unwrap();
        let source = BamSource::open(&write_indexed_bam(dir.path(), READS)).unwrap();

        let records = source.fetch(&Bundle::new("chr1", 100, 200), None).unwrap();

        assert_eq!(
            named(&records),
            vec!["inside", "left_edge", "placed_mate", "right_edge"]
        );
        // The unnamed record overlaps too and is still returned
        assert_eq!(records.len(), 5);
        assert_eq!(records.iter().filter(|r| r.name.is_none()).count(), 1);
    }

    #[test]
    fn test_fetch_reports_unmapped_flag() {
        let dir = TempDir::new().unwrap();
        let source = BamSource::open(&write_indexed_bam(dir.path(), READS)).unwrap();

        let records = source.fetch(&Bundle::new("chr1", 165, 175), None).unwrap();
        let mate = records
            .iter()
            .find(|r| r.name.as_deref() == Some("placed_mate"))
            .unwrap();
        assert!(mate.unmapped);
        assert!(records
            .iter()
            .filter(|r| r.name.as_deref() != Some("placed_mate"))
            .all(|r| !r.unmapped));
    }

    #[test]
    fn test_fetch_unknown_chromosome_is_empty() {
        let dir = TempDir::new().unwrap();
        let source = BamSource::open(&write_indexed_bam(dir.path(), READS)).unwrap();

        let records = source.fetch(&Bundle::new("chr9", 100, 200), None).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_fetch_past_deadline_times_out() {
        let dir = TempDir::new().unwrap();
        let source = BamSource::open(&write_indexed_bam(dir.path(), READS)).unwrap();

        let result = source.fetch(&Bundle::new("chr1", 100, 200), Some(Instant::now()));
        assert!(matches!(result, Err(ExtractError::Timeout { .. })));

        // The source stays usable after a timed-out fetch
        let records = source.fetch(&Bundle::new("chr1", 100, 200), None).unwrap();
        assert_eq!(records.len(), 5);
    }

    #[test]
    fn test_concurrent_fetches_share_source() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BamSource>();

        let dir = TempDir::new().unwrap();
        let source = BamSource::open(&write_indexed_bam(dir.path(), READS)).unwrap();
        let bundle = Bundle::new("chr1", 100, 200);

        let counts: Vec<usize> = (0..32)
            .into_par_iter()
            .map(|_| source.fetch(&bundle, None).unwrap().len())
            .collect();

        assert!(counts.iter().all(|&n| n == 5));
    }

    #[test]
    fn test_extractor_over_real_bam() {
        let dir = TempDir::new().unwrap();
        let source = BamSource::open(&write_indexed_bam(dir.path(), READS)).unwrap();
        let bundles = vec![Bundle::new("chr1", 100, 200), Bundle::new("chr1", 0, 95)];

        let all = ReadSetExtractor::default()
            .extract_all(&source, &bundles)
            .unwrap();
        assert_eq!(all[0].len(), 4);
        assert!(all[0].contains("placed_mate"));
        assert_eq!(all[1].len(), 2);

        let mapped_only = ReadSetExtractor::new(ExtractConfig {
            include_unmapped: false,
            fetch_timeout: None,
        });
        let reads = mapped_only.extract(&source, &bundles[0]).unwrap();
        assert_eq!(reads.len(), 3);
        assert!(!reads.contains("placed_mate"));
    }

    #[test]
    fn test_count_records_includes_unnamed() {
        let dir = TempDir::new().unwrap();
        let source = BamSource::open(&write_indexed_bam(dir.path(), READS)).unwrap();
        let bundle = Bundle::new("chr1", 100, 200);

        assert_eq!(
            count_records(&source, &bundle, &ExtractConfig::default()).unwrap(),
            5
        );

        let mapped_only = ExtractConfig {
            include_unmapped: false,
            fetch_timeout: None,
        };
        assert_eq!(count_records(&source, &bundle, &mapped_only).unwrap(), 4);
    }
}
