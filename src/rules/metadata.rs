use crate::analyzer::{load_notebook, NotebookCheck};
use crate::notebook::Notebook;
use crate::report::Report;
use regex::Regex;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Notebook metadata keys that may hold a version date, in lookup order.
pub const METADATA_DATE_FIELDS: [&str; 4] = ["date", "modified", "version", "last_updated"];

lazy_static::lazy_static! {
    /// "Last updated" style phrases. Each captures the date in group 1.
    /// Markdown emphasis around the label is allowed: `**Last updated:** 2025-01-15`.
    static ref DATE_PATTERNS: Vec<Regex> = [
        r"(?i)last\s+updated[*_]*:?[*_]*\s*(\d{4}-\d{2}-\d{2})",
        r"(?i)version[*_]*:?[*_]*\s*[\d.]+\s*\((\d{4}-\d{2}-\d{2})\)",
        r"(?i)modified[*_]*:?[*_]*\s*(\d{4}-\d{2}-\d{2})",
        r"(?i)date[*_]*:?[*_]*\s*(\d{4}-\d{2}-\d{2})",
        r"(?i)updated[*_]*:?[*_]*\s*(\d{4}-\d{2}-\d{2})",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect();

    /// A metadata value that is just a date (`"date": "2025-01-15"`).
    static ref BARE_DATE_RE: Regex = Regex::new(r"^\s*(\d{4}-\d{2}-\d{2})").unwrap();
}

/// A version date and where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionDate {
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `metadata.<field>`, `markdown cell <n>` or `README.md`.
    pub location: String,
}

/// Checks that a notebook states when it was last updated.
pub struct MetadataCheck {
    /// Fall back to `README.md` next to the notebook.
    pub check_readme: bool,
}

impl NotebookCheck for MetadataCheck {
    fn id(&self) -> &'static str {
        "metadata"
    }

    fn command(&self) -> &'static str {
        "metadata_checker"
    }

    fn check(&self, path: &Path) -> Report {
        let notebook = match load_notebook(path) {
            Ok(notebook) => notebook,
            Err(report) => return report,
        };
        let readme_dir = if self.check_readme {
            Some(path.parent().unwrap_or_else(|| Path::new(".")))
        } else {
            None
        };
        scan_metadata(&notebook, readme_dir)
    }
}

/// Finds the first "last updated" style date in `text`.
pub fn find_date(text: &str) -> Option<String> {
    DATE_PATTERNS
        .iter()
        .find_map(|re| re.captures(text))
        .map(|caps| caps[1].to_string())
}

fn metadata_value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Looks for the date in notebook metadata, then in the first markdown cell.
pub fn find_version_date(notebook: &Notebook) -> Option<VersionDate> {
    for field in METADATA_DATE_FIELDS {
        if let Some(value) = notebook.metadata.get(field) {
            let text = metadata_value_text(value);
            let date = find_date(&text)
                .or_else(|| BARE_DATE_RE.captures(&text).map(|caps| caps[1].to_string()));
            if let Some(date) = date {
                return Some(VersionDate {
                    date,
                    location: format!("metadata.{}", field),
                });
            }
        }
    }

    let (cell_idx, cell) = notebook.markdown_cells().next()?;
    find_date(&cell.source_text()).map(|date| VersionDate {
        date,
        location: format!("markdown cell {}", cell_idx),
    })
}

/// Looks for the date in `README.md` inside `dir`. Unreadable files count as absent.
pub fn find_readme_date(dir: &Path) -> Option<VersionDate> {
    let readme = dir.join("README.md");
    let content = fs::read_to_string(&readme)
        .map_err(|e| log::debug!("no usable {}: {}", readme.display(), e))
        .ok()?;
    find_date(&content).map(|date| VersionDate {
        date,
        location: "README.md".to_string(),
    })
}

/// Runs the metadata check; `readme_dir` enables the README fallback.
///
/// A missing date fails the check.
pub fn scan_metadata(notebook: &Notebook, readme_dir: Option<&Path>) -> Report {
    let found = find_version_date(notebook).or_else(|| readme_dir.and_then(find_readme_date));

    match found {
        Some(found) => Report::from_issues(Vec::new()).with_notes(vec![format!(
            "Found version date: {} (in {})",
            found.date, found.location
        )]),
        None => Report::failed("NQA-M001", "No version date found")
            .with_hint("Add 'Last updated: YYYY-MM-DD' to notebook markdown or README.md"),
    }
}
