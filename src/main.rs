use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod core;
mod index;
mod matching;
mod parsing;
mod reads;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("bundle_match=debug,info")
    } else {
        EnvFilter::new("bundle_match=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    tracing::info!(
        "Command used: {}",
        std::env::args().collect::<Vec<_>>().join(" ")
    );

    match cli.command {
        cli::Commands::Cross(args) => {
            cli::cross::run(args, cli.format)?;
        }
        cli::Commands::SelfCompare(args) => {
            cli::within::run(args, cli.format)?;
        }
        cli::Commands::Count(args) => {
            cli::count::run(args, cli.format)?;
        }
    }

    Ok(())
}
