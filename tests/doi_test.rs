// Tests for the DOI citation checker.
// Resolution goes through a stub so no network is needed.

use notebook_qa::doi::{DoiResolver, Resolution};
use notebook_qa::notebook::Notebook;
use notebook_qa::report::{CheckResult, Severity};
use notebook_qa::rules::doi::scan_doi;
use serde_json::json;
use std::cell::RefCell;
use std::collections::HashMap;

/// Answers from a fixed table; unknown DOIs resolve.
struct StubResolver {
    answers: HashMap<&'static str, Resolution>,
    asked: RefCell<Vec<String>>,
}

impl StubResolver {
    fn new(answers: &[(&'static str, Resolution)]) -> Self {
        Self {
            answers: answers.iter().cloned().collect(),
            asked: RefCell::new(Vec::new()),
        }
    }
}

impl DoiResolver for StubResolver {
    fn resolve(&self, doi: &str) -> Resolution {
        self.asked.borrow_mut().push(doi.to_string());
        self.answers.get(doi).copied().unwrap_or(Resolution::Resolves)
    }
}

const DATASET_DOI: &str = "10.5281/zenodo.7654321";

fn dataset_output(doi: &str) -> serde_json::Value {
    json!({"output_type": "stream", "name": "stdout", "text": [
        "<xarray.Dataset>\n",
        "Attributes:\n",
        format!("    references:  https://doi.org/{}\n", doi)
    ]})
}

fn notebook(markdown: &str, outputs: Vec<serde_json::Value>) -> Notebook {
    serde_json::from_value(json!({"cells": [
        {"cell_type": "markdown", "source": markdown},
        {"cell_type": "code", "source": "ds = xr.open_dataset(path)\nds", "outputs": outputs}
    ]}))
    .unwrap()
}

#[test]
fn test_no_metadata_doi_is_skipped_regardless_of_markdown() {
    let nb = notebook(
        &format!("Cite https://doi.org/{}", DATASET_DOI),
        vec![json!({"output_type": "stream", "text": "plain output 10.1234/abcd"})],
    );
    let resolver = StubResolver::new(&[]);
    let report = scan_doi(&nb, Some(&resolver));
    assert_eq!(report.status, CheckResult::Skipped);
    assert!(resolver.asked.borrow().is_empty());
}

#[test]
fn test_cited_and_resolving_doi_passes() {
    let nb = notebook(
        &format!("Data: [Zenodo](https://doi.org/{})", DATASET_DOI.to_uppercase()),
        vec![dataset_output(DATASET_DOI)],
    );
    let resolver = StubResolver::new(&[]);
    let report = scan_doi(&nb, Some(&resolver));
    assert_eq!(report.status, CheckResult::Success);
    assert!(report.issues.is_empty());
    assert_eq!(*resolver.asked.borrow(), vec![DATASET_DOI.to_string()]);
}

#[test]
fn test_unresolvable_doi_fails_even_if_cited() {
    let nb = notebook(
        &format!("doi:{}", DATASET_DOI),
        vec![dataset_output(DATASET_DOI)],
    );
    let resolver = StubResolver::new(&[(DATASET_DOI, Resolution::NotFound)]);
    let report = scan_doi(&nb, Some(&resolver));
    assert_eq!(report.status, CheckResult::Failure);
    assert!(report.issues.iter().any(|i| i.rule_id == "NQA-D001"));
    assert!(!report.issues.iter().any(|i| i.rule_id == "NQA-D002"));
}

#[test]
fn test_uncited_doi_fails() {
    let nb = notebook("No citation here.", vec![dataset_output(DATASET_DOI)]);
    let report = scan_doi(&nb, None);
    assert_eq!(report.status, CheckResult::Failure);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].rule_id, "NQA-D002");
    assert!(report.hint.is_some());
}

#[test]
fn test_network_failure_never_fails() {
    let nb = notebook(
        &format!("https://doi.org/{}", DATASET_DOI),
        vec![dataset_output(DATASET_DOI)],
    );
    let resolver = StubResolver::new(&[(DATASET_DOI, Resolution::Indeterminate)]);
    let report = scan_doi(&nb, Some(&resolver));
    assert_eq!(report.status, CheckResult::Success);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].severity, Severity::Warning);
}

#[test]
fn test_rich_output_metadata() {
    let output = json!({"output_type": "execute_result", "data": {
        "text/plain": ["{'citation': 'Smith et al.', 'doi': '10.1000/xyz.123'}"]
    }});
    let nb = notebook("See 10.1000/XYZ.123 for details.", vec![output]);
    let report = scan_doi(&nb, None);
    assert_eq!(report.status, CheckResult::Success);
}
