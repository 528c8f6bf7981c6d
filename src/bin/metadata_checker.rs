use anyhow::Result;
use clap::{ArgAction, Parser};
use notebook_qa::cli::{self, CommonArgs};
use notebook_qa::rules::metadata::MetadataCheck;
use std::process::ExitCode;

/// Check for version date metadata in Jupyter notebooks.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Check README.md next to the notebook if no date is found in it.
    /// A bare `--check-readme` means `true`.
    #[arg(
        long,
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    check_readme: bool,
}

fn main() -> Result<ExitCode> {
    let args = Cli::parse();
    let check = MetadataCheck {
        check_readme: args.check_readme,
    };
    cli::run(&check, &args.common)
}
