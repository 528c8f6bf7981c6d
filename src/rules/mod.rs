// Rules module
// One scanner per checker; each exposes a `NotebookCheck` implementation.

/// Alt-text on markdown images and image outputs.
pub mod accessibility;

/// Dataset DOI citation and resolution.
pub mod doi;

/// Source attribution near figures.
pub mod figures;

/// "Last updated" version date.
pub mod metadata;
