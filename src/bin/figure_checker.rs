use anyhow::Result;
use clap::Parser;
use notebook_qa::cli::{self, CommonArgs};
use notebook_qa::rules::figures::FigureCheck;
use std::process::ExitCode;

/// Check for figure source attribution in Jupyter notebooks.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<ExitCode> {
    let args = Cli::parse();
    cli::run(&FigureCheck, &args.common)
}
