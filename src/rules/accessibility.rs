use crate::analyzer::{load_notebook, NotebookCheck};
use crate::notebook::{Cell, Notebook};
use crate::report::{Issue, Report};
use crate::utils::LineIndex;
use regex::Regex;
use scraper::{Html, Selector};
use std::path::Path;

lazy_static::lazy_static! {
    /// Opening `<img ...>` tags. Quoted attribute values may contain `>`.
    /// Attributes are parsed separately.
    static ref IMG_TAG_RE: Regex =
        Regex::new(r#"(?is)<img\b(?:[^>"']|"[^"]*"|'[^']*')*>"#).unwrap();

    /// Inline Markdown images: `![alt](url)`.
    static ref MD_INLINE_IMAGE_RE: Regex = Regex::new(r"!\[(.*?)\]\([^)]*\)").unwrap();

    /// Reference-style Markdown images: `![alt][ref]`.
    static ref MD_REF_IMAGE_RE: Regex = Regex::new(r"!\[(.*?)\]\[[^\]]*\]").unwrap();

    static ref IMG_SELECTOR: Selector = Selector::parse("img").unwrap();
}

/// Checks that every image in a notebook carries alt text.
pub struct AccessibilityCheck;

impl NotebookCheck for AccessibilityCheck {
    fn id(&self) -> &'static str {
        "accessibility"
    }

    fn command(&self) -> &'static str {
        "accessibility_checker"
    }

    fn check(&self, path: &Path) -> Report {
        match load_notebook(path) {
            Ok(notebook) => scan_accessibility(&notebook),
            Err(report) => report,
        }
    }
}

/// Scans markdown images and image outputs for missing alt text.
pub fn scan_accessibility(notebook: &Notebook) -> Report {
    let mut issues = Vec::new();

    for (cell_idx, cell) in notebook.cells.iter().enumerate() {
        if cell.is_markdown() {
            issues.extend(markdown_issues(cell_idx, cell));
        } else if cell.is_code() {
            for output in cell.outputs.iter().filter(|o| o.has_image()) {
                if output.metadata_str("alt_text").is_none() && output.metadata_str("alt").is_none() {
                    issues.push(
                        Issue::error("NQA-A003", "Figure output missing alt text metadata")
                            .in_cell(cell_idx),
                    );
                }
            }
        }
    }

    let images_ok = issues.is_empty();
    let report = Report::from_issues(issues);
    if images_ok {
        report.with_notes(vec!["All images have alt-text".to_string()])
    } else {
        report.with_hint("Add alt-text to all images for screen reader compatibility")
    }
}

fn markdown_issues(cell_idx: usize, cell: &Cell) -> Vec<Issue> {
    let source = cell.source_text();
    let index = LineIndex::new(&source);
    let mut issues = Vec::new();

    for tag in IMG_TAG_RE.find_iter(&source) {
        if !img_has_alt(tag.as_str()) {
            issues.push(
                Issue::error("NQA-A001", "<img> tag missing alt text")
                    .in_cell(cell_idx)
                    .at_line(index.line_of(tag.start())),
            );
        }
    }

    for re in [&*MD_INLINE_IMAGE_RE, &*MD_REF_IMAGE_RE] {
        for caps in re.captures_iter(&source) {
            if caps[1].trim().is_empty() {
                // Group 0 always participates in a match.
                let start = caps.get(0).map_or(0, |m| m.start());
                issues.push(
                    Issue::error("NQA-A002", "Markdown image missing alt text")
                        .in_cell(cell_idx)
                        .at_line(index.line_of(start)),
                );
            }
        }
    }

    issues
}

/// Parses one `<img>` tag and reports whether it has a non-blank `alt`.
fn img_has_alt(tag: &str) -> bool {
    let fragment = Html::parse_fragment(tag);
    let has_alt = fragment
        .select(&IMG_SELECTOR)
        .next()
        .and_then(|img| img.value().attr("alt"))
        .map_or(false, |alt| !alt.trim().is_empty());
    has_alt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CheckResult;

    fn markdown(source: &str) -> Notebook {
        let json = serde_json::json!({"cells": [{"cell_type": "markdown", "source": source}]});
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_img_alt_attribute() {
        assert!(img_has_alt(r#"<img src="a.png" alt="A map of rainfall">"#));
        assert!(img_has_alt("<IMG SRC=a.png ALT='plot'>"));
        assert!(!img_has_alt(r#"<img src="a.png" alt="  ">"#));
        assert!(!img_has_alt(r#"<img src="a.png">"#));
    }

    #[test]
    fn test_gt_inside_quoted_alt() {
        let report = scan_accessibility(&markdown(r#"<img alt="Temperature > 30C" src="a.png">"#));
        assert_eq!(report.status, CheckResult::Success);
        assert!(report.issues.is_empty());

        let report = scan_accessibility(&markdown("<img title='a > b' src=\"a.png\">"));
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].rule_id, "NQA-A001");
    }

    #[test]
    fn test_issue_lines_within_cell() {
        let report = scan_accessibility(&markdown("# Results\n\n![](plot.png)\n"));
        assert_eq!(report.status, CheckResult::Failure);
        assert_eq!(report.issues[0].cell, Some(0));
        assert_eq!(report.issues[0].line, Some(3));
    }

    #[test]
    fn test_multiline_img_tag() {
        let report = scan_accessibility(&markdown("<img\n  src=\"a.png\"\n  alt=\"Sea ice extent\"\n/>"));
        assert_eq!(report.status, CheckResult::Success);
    }
}
