use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the notebook checkers.
///
/// Most of these end up as a `failure` verdict for a single notebook rather
/// than aborting the run. Config problems are not represented here: they are
/// logged and replaced with an empty config.
#[derive(Debug, Error)]
pub enum QaError {
    /// The notebook (or another input file) could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The notebook is not valid notebook JSON.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The `--notebooks` argument is not a JSON array of strings.
    #[error("invalid JSON format for notebooks: {0}")]
    NotebookList(#[source] serde_json::Error),

    /// The test runner executable does not exist.
    #[error("test runner `{0}` not found")]
    RunnerNotFound(String),

    /// The test runner did not finish in time and was killed.
    #[error("tests timed out after {0}s")]
    RunnerTimeout(u64),

    /// The coverage report is missing or malformed.
    #[error("coverage report error: {0}")]
    Coverage(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, QaError>;
