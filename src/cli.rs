use crate::analyzer::{Analyzer, NotebookCheck, RunSummary};
use crate::config::{QaConfig, DEFAULT_CONFIG_PATH};
use crate::error::QaError;
use crate::report::{CheckResult, Report, Severity};
use crate::results::{write_results, NotebookResults};
use anyhow::Result;
use clap::Args;
use colored::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

/// Arguments shared by every checker binary.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Notebook files to check.
    #[arg(value_name = "NOTEBOOK")]
    pub paths: Vec<String>,

    /// JSON array of notebook paths, e.g. '["a.ipynb", "b.ipynb"]'.
    /// Combined with any positional paths.
    #[arg(long = "notebooks", value_name = "JSON")]
    pub notebooks_json: Option<String>,

    /// Directory to write `<checker>-results.json` into.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Path to the QA configuration file.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Print per-notebook reports as JSON.
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging on stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    /// Positional paths followed by the `--notebooks` array, minus empty entries.
    pub fn notebook_list(&self) -> Result<Vec<String>, QaError> {
        let mut notebooks = self.paths.clone();
        if let Some(raw) = &self.notebooks_json {
            let parsed: Vec<Option<String>> =
                serde_json::from_str(raw).map_err(QaError::NotebookList)?;
            notebooks.extend(parsed.into_iter().flatten());
        }
        notebooks.retain(|nb| !nb.trim().is_empty());
        Ok(notebooks)
    }
}

/// Sets up `env_logger` on stderr. `RUST_LOG` overrides the default level.
pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .try_init();
}

/// Machine-readable output for `--json`.
#[derive(Serialize)]
struct JsonOutput<'a> {
    command: &'a str,
    disabled: bool,
    results: &'a NotebookResults,
    reports: BTreeMap<&'a str, &'a Report>,
}

/// Runs a checker the way every binary does.
///
/// Returns exit code 1 when any notebook fails or when `--notebooks` is not
/// a JSON array, 0 otherwise.
pub fn run(check: &dyn NotebookCheck, args: &CommonArgs) -> Result<ExitCode> {
    init_logging(args.verbose);

    let notebooks = match args.notebook_list() {
        Ok(notebooks) => notebooks,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            return Ok(ExitCode::from(1));
        }
    };

    let config = QaConfig::load(&args.config);
    let human = !args.json;

    if human && config.is_check_disabled(check.id()) {
        println!("{} check is disabled by configuration", check.id());
    }

    let summary = Analyzer::new(&config).run(check, &notebooks, |notebook, report| {
        if human {
            print_report(check.command(), notebook, report);
        }
    });

    if human {
        print_summary(&summary, notebooks.len());
    } else {
        let output = JsonOutput {
            command: check.command(),
            disabled: summary.disabled,
            results: &summary.results,
            reports: summary
                .outcomes
                .iter()
                .map(|o| (o.notebook.as_str(), &o.report))
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    if let Some(dir) = &args.output_dir {
        let path = write_results(check.command(), &summary.results, dir)?;
        log::info!("results written to {}", path.display());
    }

    Ok(ExitCode::from(summary.exit_code()))
}

/// Prints the human-readable listing for one notebook.
pub fn print_report(command: &str, notebook: &str, report: &Report) {
    println!("Processing {} with {}", notebook.bold(), command);

    match report.status {
        CheckResult::Success => println!("{} {}", "✅".green(), format!("{}: passed", notebook).green()),
        CheckResult::Skipped => println!("{} {}", "⏭".yellow(), format!("{}: skipped", notebook).yellow()),
        CheckResult::Failure => println!(
            "{} {}",
            "❌".red(),
            format!(
                "{}: {} issue(s)",
                notebook,
                report.blocking_issues().count()
            )
            .red()
        ),
    }

    for note in &report.notes {
        println!("   {}", note);
    }
    for issue in &report.issues {
        match issue.severity {
            Severity::Error => println!("   - {}", issue.to_string().red()),
            Severity::Warning => println!("   - {}", issue.to_string().yellow()),
        }
    }
    if report.status.is_failure() {
        if let Some(hint) = &report.hint {
            println!("   {}", hint.italic());
        }
    }
}

fn print_summary(summary: &RunSummary, requested: usize) {
    if requested > 0 && summary.checked() == 0 && !summary.disabled {
        println!("All notebooks skipped by configuration");
        return;
    }
    if summary.checked() == 0 {
        return;
    }

    let count = |wanted: CheckResult| summary.results.values().filter(|r| **r == wanted).count();
    println!(
        "\n{} {} passed, {} failed, {} skipped",
        "Summary:".bold(),
        count(CheckResult::Success),
        count(CheckResult::Failure),
        count(CheckResult::Skipped)
    );
}
