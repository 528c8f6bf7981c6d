use crate::report::CheckResult;
use anyhow::Context;
use serde::{Serialize, Serializer};
use std::fs;
use std::ops::Index;
use std::path::{Path, PathBuf};

/// Notebook path to verdict, as written to the results file.
///
/// Entries keep the order notebooks were processed in. Re-inserting a
/// notebook replaces its verdict in place.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NotebookResults(Vec<(String, CheckResult)>);

impl NotebookResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, notebook: String, status: CheckResult) {
        match self.0.iter_mut().find(|(nb, _)| *nb == notebook) {
            Some(entry) => entry.1 = status,
            None => self.0.push((notebook, status)),
        }
    }

    pub fn get(&self, notebook: &str) -> Option<&CheckResult> {
        self.0.iter().find(|(nb, _)| nb == notebook).map(|(_, status)| status)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CheckResult)> {
        self.0.iter().map(|(nb, status)| (nb.as_str(), status))
    }

    pub fn values(&self) -> impl Iterator<Item = &CheckResult> {
        self.0.iter().map(|(_, status)| status)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Index<&str> for NotebookResults {
    type Output = CheckResult;

    fn index(&self, notebook: &str) -> &CheckResult {
        match self.get(notebook) {
            Some(status) => status,
            None => panic!("no result recorded for {}", notebook),
        }
    }
}

impl Serialize for NotebookResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Shape of `<command>-results.json`, consumed by CI aggregation.
#[derive(Serialize)]
struct ResultsFile<'a> {
    command: &'a str,
    results: &'a NotebookResults,
}

/// Path of the results file for a command inside `output_dir`.
pub fn results_path(command: &str, output_dir: &Path) -> PathBuf {
    output_dir.join(format!("{}-results.json", command))
}

/// Writes `{"command": ..., "results": {...}}` to `<output_dir>/<command>-results.json`.
///
/// The directory is created if needed and an existing file is overwritten.
pub fn write_results(
    command: &str,
    results: &NotebookResults,
    output_dir: &Path,
) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    let path = results_path(command, output_dir);
    let body = serde_json::to_string_pretty(&ResultsFile { command, results })?;
    fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;

    log::debug!("wrote {} result(s) to {}", results.len(), path.display());
    Ok(path)
}
