use crate::config::QaConfig;
use crate::notebook::{read_notebook, Notebook};
use crate::report::{CheckResult, Report};
use crate::results::NotebookResults;
use std::path::Path;

/// One compliance rule that can be run against a notebook.
pub trait NotebookCheck {
    /// Identifier used in the QA config (`doi`, `figures`...).
    fn id(&self) -> &'static str;

    /// Command name, used for the results file (`doi_checker`...).
    fn command(&self) -> &'static str;

    /// Checks a single notebook. Never panics on bad input: unreadable
    /// notebooks become a failing report.
    fn check(&self, notebook: &Path) -> Report;
}

/// Reads a notebook, turning read/parse errors into a failing report.
pub fn load_notebook(path: &Path) -> Result<Notebook, Report> {
    read_notebook(path).map_err(|e| Report::failed("NQA-R001", format!("Error reading notebook: {}", e)))
}

/// Report for one notebook of a run.
#[derive(Debug)]
pub struct NotebookOutcome {
    pub notebook: String,
    pub report: Report,
}

/// Everything a run produced.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// The check is listed under `disabled_checks`.
    pub disabled: bool,
    pub results: NotebookResults,
    pub outcomes: Vec<NotebookOutcome>,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        self.results.values().any(CheckResult::is_failure)
    }

    /// 1 if any notebook failed, else 0.
    pub fn exit_code(&self) -> u8 {
        u8::from(self.has_failures())
    }

    /// Number of notebooks actually checked (not skipped by config).
    pub fn checked(&self) -> usize {
        self.outcomes.len()
    }
}

/// Runs one check over a list of notebooks, honoring the QA config.
pub struct Analyzer<'a> {
    config: &'a QaConfig,
}

impl<'a> Analyzer<'a> {
    pub fn new(config: &'a QaConfig) -> Self {
        Self { config }
    }

    /// Checks the notebooks one after another.
    ///
    /// Notebooks excluded by the config, or all of them when the check is
    /// disabled, are recorded as `skipped` without being opened.
    /// `on_report` is called as soon as each notebook is done.
    pub fn run(
        &self,
        check: &dyn NotebookCheck,
        notebooks: &[String],
        mut on_report: impl FnMut(&str, &Report),
    ) -> RunSummary {
        let mut summary = RunSummary::default();

        let (disabled, selected) = self
            .config
            .filtered_notebooks_for_check(check.id(), notebooks);
        summary.disabled = disabled;

        for notebook in notebooks {
            if !selected.contains(notebook) {
                log::debug!("{} skipped for {} by configuration", check.id(), notebook);
                summary.results.insert(notebook.clone(), CheckResult::Skipped);
                continue;
            }

            let report = check.check(Path::new(notebook));
            on_report(notebook, &report);
            summary.results.insert(notebook.clone(), report.status);
            summary.outcomes.push(NotebookOutcome {
                notebook: notebook.clone(),
                report,
            });
        }

        summary
    }
}
