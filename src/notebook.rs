use crate::error::{QaError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// MIME types treated as image payloads in code cell outputs.
pub const IMAGE_MIME_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/jpg"];

/// A parsed Jupyter notebook.
///
/// Only the parts the checkers look at are modelled; unknown keys are ignored
/// and missing sections default to empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Notebook {
    /// Cells in document order.
    #[serde(default)]
    pub cells: Vec<Cell>,
    /// Notebook-level metadata (`kernelspec`, `language_info`, user keys...).
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// The kind of a notebook cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    Markdown,
    Code,
    Raw,
    #[default]
    #[serde(other)]
    Other,
}

/// Multi-line text as stored in notebook JSON: either a list of lines or one string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Source {
    Lines(Vec<String>),
    Text(String),
}

impl Default for Source {
    fn default() -> Self {
        Source::Lines(Vec::new())
    }
}

impl Source {
    /// Joins the source into one string.
    ///
    /// Lines already carry their trailing newlines, so they are concatenated
    /// without a separator.
    pub fn joined(&self) -> String {
        match self {
            Source::Lines(lines) => lines.concat(),
            Source::Text(text) => text.clone(),
        }
    }
}

/// A single notebook cell.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub cell_type: CellType,
    #[serde(default)]
    pub source: Source,
    /// Captured outputs. Always empty for markdown cells.
    #[serde(default)]
    pub outputs: Vec<Output>,
}

impl Cell {
    pub fn is_markdown(&self) -> bool {
        self.cell_type == CellType::Markdown
    }

    pub fn is_code(&self) -> bool {
        self.cell_type == CellType::Code
    }

    /// Returns the cell source as a single string.
    pub fn source_text(&self) -> String {
        self.source.joined()
    }
}

/// One captured output of a code cell.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Output {
    /// `display_data`, `execute_result`, `stream`, `error`...
    #[serde(default)]
    pub output_type: String,
    /// Stream text, present on `stream` outputs.
    #[serde(default)]
    pub text: Option<Source>,
    /// MIME type to payload.
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Output {
    /// True for the output kinds that carry rich MIME bundles.
    pub fn is_rich(&self) -> bool {
        matches!(self.output_type.as_str(), "display_data" | "execute_result")
    }

    /// True when this is a rich output carrying an image payload.
    pub fn has_image(&self) -> bool {
        self.is_rich()
            && IMAGE_MIME_TYPES
                .iter()
                .any(|mime| self.data.contains_key(*mime))
    }

    /// Stream text joined into one string, if the output has any.
    pub fn text(&self) -> Option<String> {
        self.text.as_ref().map(Source::joined)
    }

    /// Textual payloads from the MIME bundle.
    ///
    /// Values stored as a string or a list of strings are returned joined;
    /// binary or structured payloads are skipped.
    pub fn data_texts(&self) -> Vec<String> {
        self.data
            .values()
            .filter_map(|value| match value {
                Value::String(s) => Some(s.clone()),
                Value::Array(items) => Some(
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<String>(),
                ),
                _ => None,
            })
            .collect()
    }

    /// Returns a metadata value as a non-blank string.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

impl Notebook {
    /// Parses notebook JSON from a string.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Iterates over `(index, cell)` for markdown cells only.
    pub fn markdown_cells(&self) -> impl Iterator<Item = (usize, &Cell)> {
        self.cells.iter().enumerate().filter(|(_, c)| c.is_markdown())
    }

    /// Iterates over `(index, cell)` for code cells only.
    pub fn code_cells(&self) -> impl Iterator<Item = (usize, &Cell)> {
        self.cells.iter().enumerate().filter(|(_, c)| c.is_code())
    }
}

/// Reads and parses a notebook file.
pub fn read_notebook(path: &Path) -> Result<Notebook> {
    let content = fs::read_to_string(path).map_err(|source| QaError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Notebook::from_json(&content).map_err(|source| QaError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
