use crate::utils::location;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Verdict of one checker on one notebook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckResult {
    Success,
    Failure,
    Skipped,
}

impl CheckResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckResult::Success => "success",
            CheckResult::Failure => "failure",
            CheckResult::Skipped => "skipped",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CheckResult::Failure)
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much an issue weighs on the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Fails the check.
    Error,
    /// Reported only; never fails the check.
    Warning,
}

/// A single problem found in a notebook.
#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    /// Unique rule identifier (e.g., "NQA-A001").
    pub rule_id: String,
    /// Description of the issue.
    pub message: String,
    /// Index of the offending cell, when the issue belongs to one.
    pub cell: Option<usize>,
    /// 1-indexed line inside the cell source.
    pub line: Option<usize>,
    pub severity: Severity,
}

impl Issue {
    /// Creates a blocking issue.
    pub fn error(rule_id: &str, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            message: message.into(),
            cell: None,
            line: None,
            severity: Severity::Error,
        }
    }

    /// Creates a non-blocking issue.
    pub fn warning(rule_id: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(rule_id, message)
        }
    }

    pub fn in_cell(mut self, cell: usize) -> Self {
        self.cell = Some(cell);
        self
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match location(self.cell, self.line) {
            Some(loc) => write!(f, "{}: {} [{}]", loc, self.message, self.rule_id),
            None => write!(f, "{} [{}]", self.message, self.rule_id),
        }
    }
}

/// Outcome of running one checker on one notebook.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub status: CheckResult,
    pub issues: Vec<Issue>,
    /// Informational lines (what was found and where).
    pub notes: Vec<String>,
    /// Remediation advice printed after a failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Report {
    /// Builds a report whose status follows from the issues:
    /// `failure` iff at least one blocking issue is present.
    pub fn from_issues(issues: Vec<Issue>) -> Self {
        let status = if issues.iter().any(Issue::is_blocking) {
            CheckResult::Failure
        } else {
            CheckResult::Success
        };
        Self {
            status,
            issues,
            notes: Vec::new(),
            hint: None,
        }
    }

    /// A report with no work done, carrying the reason as a note.
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            status: CheckResult::Skipped,
            issues: Vec::new(),
            notes: vec![reason.into()],
            hint: None,
        }
    }

    /// A failure that is not tied to notebook content (read errors, runner errors).
    pub fn failed(rule_id: &str, message: impl Into<String>) -> Self {
        Self::from_issues(vec![Issue::error(rule_id, message)])
    }

    pub fn with_notes(mut self, notes: Vec<String>) -> Self {
        self.notes.extend(notes);
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn blocking_issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.is_blocking())
    }
}
