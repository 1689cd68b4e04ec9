//! Command-line interface for bundle-match.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **cross**: Match bundles of a new assembly run against an old one
//! - **self**: Match bundles of one run against each other
//! - **count**: Count alignment records per bundle
//!
//! ## Usage
//!
//! ```text
//! # New bundles against old bundles
//! bundle-match cross --log_old old.log --log_new new.log \
//!     --bam_old old.bam --bam_new new.bam --output_csv cross.csv
//!
//! # Both directions, stricter threshold
//! bundle-match cross ... --direction both --jaccard_threshold 0.3
//!
//! # Overlapping bundles within one run
//! bundle-match self --log_new new.log --bam_new new.bam --output_csv self.csv
//!
//! # Read totals per bundle, JSON run summary
//! bundle-match --format json count --log_new new.log --bam_new new.bam --output_csv counts.csv
//! ```

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use crate::matching::{BundleCollection, MatchingConfig};
use crate::parsing::log::parse_log_file;
use crate::reads::{BamSource, ExtractConfig, ReadSetExtractor};

pub mod count;
pub mod cross;
pub mod within;

#[derive(Parser)]
#[command(name = "bundle-match")]
#[command(version)]
#[command(about = "Match assembly bundles across runs by shared supporting reads")]
#[command(
    long_about = "bundle-match finds corresponding bundles between two transcript-assembly runs, or overlapping bundles within one run.\n\nBundles are read from StringTie verbose logs (`>bundle chrom:start-end` lines). Each bundle's supporting read names are fetched from the run's indexed BAM file, and bundle pairs whose read sets have a Jaccard similarity at or above the threshold are reported as CSV."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run summary format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Worker threads for region extraction and matching (default: all cores)
    #[arg(short, long, global = true)]
    pub threads: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Match bundles of a new run against bundles of an old run
    Cross(cross::CrossArgs),

    /// Match bundles of one run against each other
    #[command(name = "self")]
    SelfCompare(within::SelfArgs),

    /// Count alignment records per bundle
    Count(count::CountArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Options controlling how read sets are pulled from BAM files
#[derive(clap::Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Leave records flagged unmapped out of read sets
    #[arg(long)]
    pub skip_unmapped: bool,

    /// Fail if fetching a single bundle takes longer than this many seconds
    #[arg(long, value_name = "SECS")]
    pub fetch_timeout: Option<u64>,
}

impl ExtractArgs {
    pub fn to_config(&self) -> ExtractConfig {
        ExtractConfig {
            include_unmapped: !self.skip_unmapped,
            fetch_timeout: self.fetch_timeout.map(Duration::from_secs),
        }
    }
}

/// What a command did, printed on stdout once the report is written
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub command: &'static str,
    pub generated_at: String,
    pub output_csv: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundles_old: Option<usize>,
    pub bundles_new: usize,
    pub rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<MatchingConfig>,
}

impl RunSummary {
    pub fn new(command: &'static str, output_csv: &Path, bundles_new: usize, rows: usize) -> Self {
        let output_csv = std::fs::canonicalize(output_csv)
            .unwrap_or_else(|_| output_csv.to_path_buf())
            .display()
            .to_string();

        Self {
            command,
            generated_at: chrono::Utc::now().to_rfc3339(),
            output_csv,
            bundles_old: None,
            bundles_new,
            rows,
            direction: None,
            config: None,
        }
    }

    /// Print in the requested format
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn print(&self, format: OutputFormat) -> anyhow::Result<()> {
        match format {
            OutputFormat::Text => {
                if let Some(old) = self.bundles_old {
                    println!("Old bundles: {old}");
                }
                println!("New bundles: {}", self.bundles_new);
                if let Some(direction) = &self.direction {
                    println!("Direction: {direction}");
                }
                if let Some(config) = &self.config {
                    println!("Jaccard threshold: {}", config.threshold);
                }
                println!("Rows written: {}", self.rows);
                println!("Output CSV saved to: {}", self.output_csv);
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(self)?);
            }
        }
        Ok(())
    }
}

/// Parse a run's log and extract a read set for each of its bundles
///
/// # Errors
///
/// Returns an error if the log cannot be read, the BAM cannot be opened, or
/// any region fetch fails.
pub fn load_run(
    label: &str,
    log: &Path,
    bam: &Path,
    extractor: &ReadSetExtractor,
) -> anyhow::Result<BundleCollection> {
    let bundles = parse_log_file(log)
        .with_context(|| format!("Failed to parse {label} log {}", log.display()))?;
    info!(
        run = label,
        bundles = bundles.len(),
        log = %log.display(),
        "Extracted unique bundles"
    );

    let source = BamSource::open(bam)?;
    let sets = extractor.extract_all(&source, &bundles)?;

    let collection = BundleCollection::new(bundles, sets)?;
    info!(
        run = label,
        reads = collection.total_reads(),
        cached_regions = extractor.cached_len(),
        "Extracted read sets"
    );

    Ok(collection)
}

/// Create `path` and hand a buffered writer to `write`
///
/// Called only after all matching has succeeded, so a failed run never
/// leaves a partial report behind.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_report<F>(path: &Path, write: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let file = File::create(path)
        .with_context(|| format!("Failed to create output {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write(&mut writer).with_context(|| format!("Failed to write output {}", path.display()))?;
    Ok(())
}
