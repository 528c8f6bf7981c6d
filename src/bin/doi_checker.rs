use anyhow::{Context, Result};
use clap::Parser;
use notebook_qa::cli::{self, CommonArgs};
use notebook_qa::doi::{DoiResolver, HttpDoiResolver, DEFAULT_RESOLVE_TIMEOUT};
use notebook_qa::rules::doi::DoiCheck;
use std::process::ExitCode;
use std::time::Duration;

/// Check that dataset DOIs are cited in Jupyter notebooks.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Do not check that DOIs resolve via doi.org.
    #[arg(long)]
    no_resolve: bool,

    /// Timeout for each DOI resolution request, in seconds.
    #[arg(long, default_value_t = DEFAULT_RESOLVE_TIMEOUT.as_secs())]
    timeout: u64,
}

fn main() -> Result<ExitCode> {
    let args = Cli::parse();

    let resolver: Option<Box<dyn DoiResolver>> = if args.no_resolve {
        None
    } else {
        let resolver = HttpDoiResolver::new(Duration::from_secs(args.timeout))
            .context("building HTTP client for DOI resolution")?;
        Some(Box::new(resolver))
    };

    cli::run(&DoiCheck::new(resolver), &args.common)
}
