//! QA configuration loaded from `.github/notebook-qa.yml`.
//!
//! ```yaml
//! # Globally disable specific checks (applies to all notebooks)
//! disabled_checks:
//!   - figures
//!
//! # Notebooks to skip entirely (all checks)
//! skip_notebooks:
//!   - "notebooks/draft.ipynb"
//!   - "notebooks/experimental/**"
//!
//! # Per-notebook check configuration
//! notebooks:
//!   "notebooks/example.ipynb":
//!     skip:
//!       - doi
//! ```
//!
//! Patterns use shell-style wildcards where `*` also crosses `/`.

use glob::{MatchOptions, Pattern};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Default location of the configuration file, relative to the repository root.
pub const DEFAULT_CONFIG_PATH: &str = ".github/notebook-qa.yml";

/// fnmatch semantics: case-sensitive, wildcards match path separators and leading dots.
const FNMATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Per-notebook settings under `notebooks:`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NotebookSettings {
    /// Check identifiers to skip for notebooks matching the pattern.
    pub skip: Option<Vec<String>>,
}

/// The parsed configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QaConfig {
    pub disabled_checks: Option<Vec<String>>,
    pub skip_notebooks: Option<Vec<String>>,
    pub notebooks: Option<BTreeMap<String, Option<NotebookSettings>>>,
}

impl QaConfig {
    /// Loads the configuration file.
    ///
    /// Never fails: a missing file yields an empty config silently, an
    /// unreadable or malformed one yields an empty config with a warning.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("no QA config at {}, using defaults", path.display());
            return Self::default();
        }
        Self::load_existing(path)
    }

    #[cfg(feature = "yaml")]
    fn load_existing(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Failed to load {}: {}", path.display(), e);
                return Self::default();
            }
        };
        match Self::from_yaml(&content) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    #[cfg(not(feature = "yaml"))]
    fn load_existing(path: &Path) -> Self {
        log::warn!(
            "YAML support not built in (feature `yaml`), cannot load {}",
            path.display()
        );
        Self::default()
    }

    /// Parses configuration YAML. An empty document is an empty config.
    #[cfg(feature = "yaml")]
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Option<QaConfig> = serde_yaml::from_str(content)?;
        Ok(config.unwrap_or_default())
    }

    /// True if `check_id` is listed under `disabled_checks`.
    pub fn is_check_disabled(&self, check_id: &str) -> bool {
        self.disabled_checks
            .iter()
            .flatten()
            .any(|id| id == check_id)
    }

    /// True if the notebook matches any `skip_notebooks` pattern.
    pub fn is_notebook_skipped(&self, notebook: &str) -> bool {
        self.skip_notebooks
            .iter()
            .flatten()
            .any(|pattern| glob_matches(pattern, notebook))
    }

    /// True if a `notebooks:` pattern matching the notebook lists `check_id` under `skip`.
    pub fn is_check_skipped_for_notebook(&self, check_id: &str, notebook: &str) -> bool {
        self.notebooks
            .iter()
            .flatten()
            .filter(|(pattern, _)| glob_matches(pattern, notebook))
            .filter_map(|(_, settings)| settings.as_ref())
            .flat_map(|settings| settings.skip.iter().flatten())
            .any(|id| id == check_id)
    }

    /// Keeps the notebooks that `check_id` should run on, in input order.
    ///
    /// Global disabling is not considered here; see `filtered_notebooks_for_check`.
    /// Duplicates are passed through.
    pub fn filter_notebooks(&self, check_id: &str, notebooks: &[String]) -> Vec<String> {
        notebooks
            .iter()
            .filter(|nb| !self.is_notebook_skipped(nb))
            .filter(|nb| !self.is_check_skipped_for_notebook(check_id, nb))
            .cloned()
            .collect()
    }

    /// Combines the global disable switch with `filter_notebooks`.
    ///
    /// Returns `(true, [])` when the check is globally disabled.
    pub fn filtered_notebooks_for_check(
        &self,
        check_id: &str,
        notebooks: &[String],
    ) -> (bool, Vec<String>) {
        if self.is_check_disabled(check_id) {
            return (true, Vec::new());
        }
        (false, self.filter_notebooks(check_id, notebooks))
    }
}

/// Shell-style match of `path` against `pattern`. Invalid patterns never match.
pub fn glob_matches(pattern: &str, path: &str) -> bool {
    match Pattern::new(pattern) {
        Ok(p) => p.matches_with(path, FNMATCH),
        Err(e) => {
            log::warn!("Ignoring invalid pattern {:?}: {}", pattern, e);
            false
        }
    }
}

#[cfg(all(test, feature = "yaml"))]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
disabled_checks:
  - linter
skip_notebooks:
  - "notebooks/draft.ipynb"
  - "notebooks/experimental/**"
notebooks:
  "notebooks/example.ipynb":
    skip:
      - doi
      - figures
  "notebooks/legacy_*.ipynb":
    skip: [metadata]
  "notebooks/empty.ipynb":
"#;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_disabled_checks() {
        let config = QaConfig::from_yaml(SAMPLE).unwrap();
        assert!(config.is_check_disabled("linter"));
        assert!(!config.is_check_disabled("doi"));
    }

    #[test]
    fn test_skip_notebooks_globs() {
        let config = QaConfig::from_yaml(SAMPLE).unwrap();
        assert!(config.is_notebook_skipped("notebooks/draft.ipynb"));
        assert!(config.is_notebook_skipped("notebooks/experimental/a.ipynb"));
        assert!(config.is_notebook_skipped("notebooks/experimental/deep/b.ipynb"));
        assert!(!config.is_notebook_skipped("notebooks/final.ipynb"));
    }

    #[test]
    fn test_per_notebook_skip() {
        let config = QaConfig::from_yaml(SAMPLE).unwrap();
        assert!(config.is_check_skipped_for_notebook("doi", "notebooks/example.ipynb"));
        assert!(!config.is_check_skipped_for_notebook("metadata", "notebooks/example.ipynb"));
        assert!(config.is_check_skipped_for_notebook("metadata", "notebooks/legacy_2019.ipynb"));
        assert!(!config.is_check_skipped_for_notebook("doi", "notebooks/empty.ipynb"));
    }

    #[test]
    fn test_filter_preserves_order_and_duplicates() {
        let config = QaConfig::from_yaml(SAMPLE).unwrap();
        let input = names(&[
            "b.ipynb",
            "notebooks/example.ipynb",
            "notebooks/draft.ipynb",
            "a.ipynb",
            "b.ipynb",
        ]);
        assert_eq!(
            config.filter_notebooks("doi", &input),
            names(&["b.ipynb", "a.ipynb", "b.ipynb"])
        );
        assert_eq!(
            config.filter_notebooks("accessibility", &input),
            names(&["b.ipynb", "notebooks/example.ipynb", "a.ipynb", "b.ipynb"])
        );
    }

    #[test]
    fn test_skip_notebooks_wins_over_per_notebook_settings() {
        let config = QaConfig::from_yaml(
            "skip_notebooks: ['nb/*.ipynb']\nnotebooks:\n  'nb/a.ipynb':\n    skip: []\n",
        )
        .unwrap();
        for check in ["accessibility", "doi", "figures", "metadata", "tests"] {
            assert!(config.filter_notebooks(check, &names(&["nb/a.ipynb"])).is_empty());
        }
    }

    #[test]
    fn test_globally_disabled() {
        let config = QaConfig::from_yaml(SAMPLE).unwrap();
        let (disabled, list) = config.filtered_notebooks_for_check("linter", &names(&["a.ipynb"]));
        assert!(disabled);
        assert!(list.is_empty());

        let (disabled, list) = config.filtered_notebooks_for_check("doi", &names(&["a.ipynb"]));
        assert!(!disabled);
        assert_eq!(list, names(&["a.ipynb"]));
    }

    #[test]
    fn test_empty_and_null_sections() {
        let config = QaConfig::from_yaml("").unwrap();
        assert!(!config.is_check_disabled("doi"));

        let config = QaConfig::from_yaml("disabled_checks:\nskip_notebooks:\n").unwrap();
        assert!(!config.is_notebook_skipped("a.ipynb"));
    }

    #[test]
    fn test_load_missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let missing = QaConfig::load(&dir.path().join("nope.yml"));
        assert!(missing.disabled_checks.is_none());

        let bad = dir.path().join("bad.yml");
        std::fs::write(&bad, "disabled_checks: [unclosed\n").unwrap();
        let config = QaConfig::load(&bad);
        assert!(config.disabled_checks.is_none());
        assert!(!config.is_check_disabled("doi"));
    }

    #[test]
    fn test_invalid_pattern_never_matches() {
        assert!(!glob_matches("a**b[", "a**b["));
        assert!(glob_matches("*.ipynb", "dir/sub/x.ipynb"));
    }
}
