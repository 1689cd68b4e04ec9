use std::path::PathBuf;

use clap::Args;

use crate::cli::{load_run, write_report, ExtractArgs, OutputFormat, RunSummary};
use crate::matching::output::write_self_csv;
use crate::matching::reporter::DEFAULT_JACCARD_THRESHOLD;
use crate::matching::{MatchReporter, MatchingConfig};
use crate::reads::ReadSetExtractor;
use crate::utils::validation::{
    ensure_indexed_bam, ensure_output_dir, ensure_readable, validate_threshold,
};

#[derive(Args)]
pub struct SelfArgs {
    /// Path to the run's StringTie log
    #[arg(long = "log_new", required = true)]
    pub log_new: PathBuf,

    /// Path to the run's indexed BAM file
    #[arg(long = "bam_new", required = true)]
    pub bam_new: PathBuf,

    /// Output path for the CSV report
    #[arg(long = "output_csv", required = true)]
    pub output_csv: PathBuf,

    /// Minimum Jaccard similarity for a reported pair
    #[arg(long = "jaccard_threshold", default_value_t = DEFAULT_JACCARD_THRESHOLD)]
    pub jaccard_threshold: f64,

    /// Verify every overlapping bundle instead of pruning by read-set size
    #[arg(long)]
    pub no_size_filter: bool,

    #[command(flatten)]
    pub extract: ExtractArgs,
}

/// Execute self subcommand
///
/// # Errors
///
/// Returns an error if an input is missing or invalid, a BAM region cannot be
/// read, or the report cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: SelfArgs, format: OutputFormat) -> anyhow::Result<()> {
    let threshold = validate_threshold(args.jaccard_threshold)?;
    ensure_readable(&args.log_new)?;
    ensure_indexed_bam(&args.bam_new)?;
    ensure_output_dir(&args.output_csv)?;

    let extractor = ReadSetExtractor::new(args.extract.to_config());
    let run = load_run("new", &args.log_new, &args.bam_new, &extractor)?;

    let config = MatchingConfig {
        threshold,
        size_filter: !args.no_size_filter,
    };
    let matches = MatchReporter::new(config.clone()).within(&run)?;

    write_report(&args.output_csv, |w| write_self_csv(w, &matches))?;

    let mut summary = RunSummary::new("self", &args.output_csv, run.len(), matches.len());
    summary.config = Some(config);
    summary.print(format)
}
