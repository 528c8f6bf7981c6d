/// A utility struct to convert byte offsets to line numbers.
///
/// Regex matches give byte offsets into a cell's source, but issues are
/// reported with line numbers within the cell, which are easier to find.
pub struct LineIndex {
    /// Stores the byte index of the start of each line.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Creates a new `LineIndex` by scanning the text for newlines.
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, ch) in source.char_indices() {
            if ch == '\n' {
                // Record the start of the next line (current newline index + 1)
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Converts a byte offset to a 1-indexed line number.
    pub fn line_of(&self, offset: usize) -> usize {
        // Binary search to find which line range the offset falls into.
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        }
    }
}

/// Formats a location prefix such as `Cell 3, line 2`.
pub fn location(cell: Option<usize>, line: Option<usize>) -> Option<String> {
    match (cell, line) {
        (Some(cell), Some(line)) => Some(format!("Cell {}, line {}", cell, line)),
        (Some(cell), None) => Some(format!("Cell {}", cell)),
        _ => None,
    }
}
