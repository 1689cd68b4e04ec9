use std::path::PathBuf;

use clap::Args;

use crate::cli::{load_run, write_report, ExtractArgs, OutputFormat, RunSummary};
use crate::core::types::Direction;
use crate::matching::output::write_cross_csv;
use crate::matching::reporter::DEFAULT_JACCARD_THRESHOLD;
use crate::matching::{MatchReporter, MatchingConfig};
use crate::reads::ReadSetExtractor;
use crate::utils::validation::{
    ensure_indexed_bam, ensure_output_dir, ensure_readable, validate_threshold,
};

/// Which lookups a cross comparison runs
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum CrossDirection {
    /// Look up each new bundle in the old run
    #[default]
    NewToOld,
    /// Look up each old bundle in the new run
    OldToNew,
    /// Run both lookups, new-to-old rows first
    Both,
}

impl std::fmt::Display for CrossDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NewToOld => write!(f, "new-to-old"),
            Self::OldToNew => write!(f, "old-to-new"),
            Self::Both => write!(f, "both"),
        }
    }
}

#[derive(Args)]
pub struct CrossArgs {
    /// Path to the old run's StringTie log
    #[arg(long = "log_old", required = true)]
    pub log_old: PathBuf,

    /// Path to the new run's StringTie log
    #[arg(long = "log_new", required = true)]
    pub log_new: PathBuf,

    /// Path to the old run's indexed BAM file
    #[arg(long = "bam_old", required = true)]
    pub bam_old: PathBuf,

    /// Path to the new run's indexed BAM file
    #[arg(long = "bam_new", required = true)]
    pub bam_new: PathBuf,

    /// Output path for the CSV report
    #[arg(long = "output_csv", required = true)]
    pub output_csv: PathBuf,

    /// Minimum Jaccard similarity for a reported pair
    #[arg(long = "jaccard_threshold", default_value_t = DEFAULT_JACCARD_THRESHOLD)]
    pub jaccard_threshold: f64,

    /// Which run is looked up in which
    #[arg(long, value_enum, default_value_t = CrossDirection::NewToOld)]
    pub direction: CrossDirection,

    /// Verify every overlapping bundle instead of pruning by read-set size
    #[arg(long)]
    pub no_size_filter: bool,

    #[command(flatten)]
    pub extract: ExtractArgs,
}

/// Execute cross subcommand
///
/// # Errors
///
/// Returns an error if an input is missing or invalid, a BAM region cannot be
/// read, or the report cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: CrossArgs, format: OutputFormat) -> anyhow::Result<()> {
    let threshold = validate_threshold(args.jaccard_threshold)?;
    ensure_readable(&args.log_old)?;
    ensure_readable(&args.log_new)?;
    ensure_indexed_bam(&args.bam_old)?;
    ensure_indexed_bam(&args.bam_new)?;
    ensure_output_dir(&args.output_csv)?;

    let extractor = ReadSetExtractor::new(args.extract.to_config());
    let old = load_run("old", &args.log_old, &args.bam_old, &extractor)?;
    let new = load_run("new", &args.log_new, &args.bam_new, &extractor)?;

    let config = MatchingConfig {
        threshold,
        size_filter: !args.no_size_filter,
    };
    let reporter = MatchReporter::new(config.clone());

    let matches = match args.direction {
        CrossDirection::NewToOld => reporter.cross(&old, &new, Direction::NewToOld)?,
        CrossDirection::OldToNew => reporter.cross(&old, &new, Direction::OldToNew)?,
        CrossDirection::Both => reporter.cross_both(&old, &new)?,
    };

    write_report(&args.output_csv, |w| write_cross_csv(w, &matches))?;

    let mut summary = RunSummary::new("cross", &args.output_csv, new.len(), matches.len());
    summary.bundles_old = Some(old.len());
    summary.direction = Some(args.direction.to_string());
    summary.config = Some(config);
    summary.print(format)
}
