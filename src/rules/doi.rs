use crate::analyzer::{load_notebook, NotebookCheck};
use crate::doi::{extract_dois, DoiResolver, Resolution};
use crate::notebook::Notebook;
use crate::report::{Issue, Report};
use std::collections::BTreeSet;
use std::path::Path;

/// Field names that mark an output as dataset metadata (e.g. an xarray repr).
pub const METADATA_FIELDS: [&str; 5] = ["references", "citation", "doi", "reference", "Attributes"];

/// Checks that dataset DOIs found in outputs are cited in markdown and resolve.
pub struct DoiCheck {
    /// `None` skips resolution entirely.
    resolver: Option<Box<dyn DoiResolver>>,
}

impl DoiCheck {
    pub fn new(resolver: Option<Box<dyn DoiResolver>>) -> Self {
        Self { resolver }
    }
}

impl NotebookCheck for DoiCheck {
    fn id(&self) -> &'static str {
        "doi"
    }

    fn command(&self) -> &'static str {
        "doi_checker"
    }

    fn check(&self, path: &Path) -> Report {
        match load_notebook(path) {
            Ok(notebook) => scan_doi(&notebook, self.resolver.as_deref()),
            Err(report) => report,
        }
    }
}

fn mentions_metadata(text: &str) -> bool {
    METADATA_FIELDS.iter().any(|field| text.contains(field))
}

/// DOIs found in code cell outputs that look like dataset metadata.
///
/// Only outputs whose text also names one of `METADATA_FIELDS` contribute.
pub fn dataset_dois(notebook: &Notebook) -> BTreeSet<String> {
    let mut dois = BTreeSet::new();
    for (_, cell) in notebook.code_cells() {
        for output in &cell.outputs {
            let texts = output.text().into_iter().chain(output.data_texts());
            for text in texts.filter(|t| mentions_metadata(t)) {
                dois.extend(extract_dois(&text));
            }
        }
    }
    dois
}

/// DOIs cited anywhere in markdown cells.
pub fn cited_dois(notebook: &Notebook) -> BTreeSet<String> {
    notebook
        .markdown_cells()
        .flat_map(|(_, cell)| extract_dois(&cell.source_text()))
        .collect()
}

/// Runs both phases of the DOI check.
///
/// Without dataset metadata DOIs the notebook has no citation obligation and
/// is skipped. Otherwise every dataset DOI must be cited (case-insensitively)
/// and must not be reported missing by the resolver. A resolver that cannot
/// answer only produces a warning.
pub fn scan_doi(notebook: &Notebook, resolver: Option<&dyn DoiResolver>) -> Report {
    let dataset = dataset_dois(notebook);
    if dataset.is_empty() {
        return Report::skipped("No dataset DOI metadata found, skipping");
    }

    let cited = cited_dois(notebook);
    let mut notes = vec!["Dataset DOIs found in metadata:".to_string()];
    notes.extend(dataset.iter().map(|doi| format!("  - {}", doi)));
    if cited.is_empty() {
        notes.push("DOIs cited in markdown: (none)".to_string());
    } else {
        notes.push("DOIs cited in markdown:".to_string());
        notes.extend(cited.iter().map(|doi| format!("  - {}", doi)));
    }

    let mut issues = Vec::new();

    if let Some(resolver) = resolver {
        notes.push("Validating DOIs resolve via doi.org...".to_string());
        for doi in &dataset {
            match resolver.resolve(doi) {
                Resolution::Resolves => notes.push(format!("  {}: resolves", doi)),
                Resolution::NotFound => issues.push(Issue::error(
                    "NQA-D001",
                    format!("DOI {} does not resolve (404)", doi),
                )),
                Resolution::Indeterminate => issues.push(Issue::warning(
                    "NQA-D003",
                    format!("DOI {} could not be verified (network error)", doi),
                )),
            }
        }
    }

    let cited_lower: BTreeSet<String> = cited.iter().map(|d| d.to_lowercase()).collect();
    let mut uncited = false;
    for doi in &dataset {
        if !cited_lower.contains(&doi.to_lowercase()) {
            uncited = true;
            issues.push(Issue::error(
                "NQA-D002",
                format!("Dataset DOI {} not cited in markdown", doi),
            ));
        }
    }

    let mut report = Report::from_issues(issues).with_notes(notes);
    if uncited {
        report = report.with_hint("Add DOI citation in markdown (e.g., https://doi.org/10.xxxx/xxxxx)");
    } else if !report.status.is_failure() {
        report.notes.push(format!(
            "All {} dataset DOI(s) are valid and cited",
            dataset.len()
        ));
    }
    report
}
