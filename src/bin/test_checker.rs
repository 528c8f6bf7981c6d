use anyhow::Result;
use clap::Parser;
use notebook_qa::cli::{self, CommonArgs};
use notebook_qa::coverage::{RunnerCommand, DEFAULT_RUN_TIMEOUT};
use notebook_qa::rules::tests::{TestCheck, DEFAULT_COVERAGE_THRESHOLD};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Check for tests and coverage alongside Jupyter notebooks.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Minimum coverage percentage.
    #[arg(long, default_value_t = DEFAULT_COVERAGE_THRESHOLD)]
    coverage_threshold: f64,

    /// Directory holding the tests; the runner is started there.
    #[arg(long, default_value = ".")]
    project_dir: PathBuf,

    /// Test runner executable, called with pytest-cov style flags.
    #[arg(long, default_value = "pytest")]
    runner: String,

    /// Time limit for the test run, in seconds.
    #[arg(long, default_value_t = DEFAULT_RUN_TIMEOUT.as_secs())]
    timeout: u64,
}

fn main() -> Result<ExitCode> {
    let args = Cli::parse();
    let check = TestCheck::new(
        args.project_dir,
        RunnerCommand::pytest(&args.runner),
        args.coverage_threshold,
        Duration::from_secs(args.timeout),
    );
    cli::run(&check, &args.common)
}
