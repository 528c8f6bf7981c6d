use crate::analyzer::{load_notebook, NotebookCheck};
use crate::notebook::Notebook;
use crate::report::{Issue, Report};
use regex::RegexSet;
use std::path::Path;

/// Markdown cells at these offsets from a figure's cell may carry its attribution.
pub const ATTRIBUTION_WINDOW: [isize; 4] = [-2, -1, 1, 2];

lazy_static::lazy_static! {
    /// Phrases that count as a source attribution, matched case-insensitively.
    static ref SOURCE_PATTERNS: RegexSet = RegexSet::new([
        r"(?i)source:?\s+\S+",
        r"(?i)data\s+from:?\s*",
        r"(?i)doi:?\s*10\.\d+",
        r"(?i)https?://\S+",
        r"(?i)credit:?\s*",
        r"(?i)attribution:?\s*",
        r"(?i)reference:?\s*",
        r"(?i)dataset:?\s*",
    ])
    .unwrap();
}

/// Checks that figures have a source attribution in nearby markdown.
pub struct FigureCheck;

impl NotebookCheck for FigureCheck {
    fn id(&self) -> &'static str {
        "figures"
    }

    fn command(&self) -> &'static str {
        "figure_checker"
    }

    fn check(&self, path: &Path) -> Report {
        match load_notebook(path) {
            Ok(notebook) => scan_figures(&notebook),
            Err(report) => report,
        }
    }
}

/// True if the text contains any attribution phrase.
pub fn has_attribution(text: &str) -> bool {
    SOURCE_PATTERNS.is_match(text)
}

/// True if a markdown cell within `ATTRIBUTION_WINDOW` of `cell_idx` attributes a source.
fn attributed_near(notebook: &Notebook, cell_idx: usize) -> bool {
    ATTRIBUTION_WINDOW.iter().any(|offset| {
        cell_idx
            .checked_add_signed(*offset)
            .and_then(|idx| notebook.cells.get(idx))
            .map_or(false, |cell| cell.is_markdown() && has_attribution(&cell.source_text()))
    })
}

/// Reports every image output without an attribution close by.
pub fn scan_figures(notebook: &Notebook) -> Report {
    let mut issues = Vec::new();

    for (cell_idx, cell) in notebook.code_cells() {
        for _ in cell.outputs.iter().filter(|o| o.has_image()) {
            if !attributed_near(notebook, cell_idx) {
                issues.push(
                    Issue::error("NQA-F001", "Figure missing source attribution").in_cell(cell_idx),
                );
            }
        }
    }

    let report = Report::from_issues(issues);
    if report.status.is_failure() {
        report.with_hint(
            "Add source attribution in markdown cells near figures \
             (patterns: 'Source:', 'Data from:', DOI, URL, 'Credit:', etc.)",
        )
    } else {
        report.with_notes(vec!["All figures have proper labels and sources".to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribution_patterns() {
        assert!(has_attribution("Source: NOAA"));
        assert!(has_attribution("*Data from* the ERA5 archive"));
        assert!(has_attribution("see doi:10.5281/zenodo.1"));
        assert!(has_attribution("https://example.org/data"));
        assert!(has_attribution("Image credit NASA"));
        assert!(!has_attribution("This plot shows rainfall over time."));
        // `source` needs something after it.
        assert!(!has_attribution("open source"));
    }
}
