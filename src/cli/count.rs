use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use rayon::prelude::*;
use tracing::info;

use crate::cli::{write_report, ExtractArgs, OutputFormat, RunSummary};
use crate::core::bundle::Bundle;
use crate::matching::output::write_count_csv;
use crate::parsing::log::parse_log_file;
use crate::reads::{count_records, BamSource};
use crate::utils::validation::{ensure_indexed_bam, ensure_output_dir, ensure_readable};

#[derive(Args)]
pub struct CountArgs {
    /// Path to the run's StringTie log
    #[arg(long = "log_new", required = true)]
    pub log_new: PathBuf,

    /// Path to the run's indexed BAM file
    #[arg(long = "bam_new", required = true)]
    pub bam_new: PathBuf,

    /// Output path for the CSV report
    #[arg(long = "output_csv", required = true)]
    pub output_csv: PathBuf,

    #[command(flatten)]
    pub extract: ExtractArgs,
}

/// Execute count subcommand
///
/// Counts alignment records (not distinct read names) overlapping each
/// bundle, including records without a name.
///
/// # Errors
///
/// Returns an error if an input is missing, a BAM region cannot be read, or
/// the report cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: CountArgs, format: OutputFormat) -> anyhow::Result<()> {
    ensure_readable(&args.log_new)?;
    ensure_indexed_bam(&args.bam_new)?;
    ensure_output_dir(&args.output_csv)?;

    let bundles = parse_log_file(&args.log_new)
        .with_context(|| format!("Failed to parse log {}", args.log_new.display()))?;
    info!(
        bundles = bundles.len(),
        log = %args.log_new.display(),
        "Extracted unique bundles"
    );

    let source = BamSource::open(&args.bam_new)?;
    let config = args.extract.to_config();

    let counts = bundles
        .par_iter()
        .map(|bundle| -> anyhow::Result<(Bundle, usize)> {
            let total = count_records(&source, bundle, &config)?;
            Ok((bundle.clone(), total))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    write_report(&args.output_csv, |w| write_count_csv(w, &counts))?;

    RunSummary::new("count", &args.output_csv, bundles.len(), counts.len()).print(format)
}
