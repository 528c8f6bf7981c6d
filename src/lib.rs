// Lib file exposing the checkers for the binaries and for testing.
// Every binary under `src/bin/` is a thin wrapper around `cli::run`.

/// Module containing the check driver.
/// This includes the `NotebookCheck` trait and the `Analyzer` that applies config filtering.
pub mod analyzer;

/// Module containing the shared command line surface of every checker.
pub mod cli;

/// Module for the `.github/notebook-qa.yml` configuration filter.
pub mod config;

/// Module running the external test runner and reading its coverage report.
pub mod coverage;

/// Module with the DOI grammar and DOI resolution.
pub mod doi;

/// Module defining the error type shared by the library.
pub mod error;

/// Module defining the notebook document model and the reader.
pub mod notebook;

/// Module defining per-notebook reports, issues and results.
pub mod report;

/// Module writing the machine-readable results file.
pub mod results;

/// Module containing the implementation of each checker's rules.
/// This includes rules for accessibility, DOI citation, figures, metadata and tests.
pub mod rules;

/// Module containing utility functions.
pub mod utils;
