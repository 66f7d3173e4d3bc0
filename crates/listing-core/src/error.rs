//! Error types for listing-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Structural failures that abort a pipeline run.
///
/// Per-field and per-row anomalies (bad ranks, missing nodes, unparsable
/// numbers, unmatched keys) never surface here; they degrade to empty cells.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Spreadsheet could not be opened or has no usable sheet
    #[error("failed to read spreadsheet '{path}': {message}")]
    Spreadsheet { path: PathBuf, message: String },

    /// The mapping rule table is structurally unusable
    #[error("invalid mapping rule table: {0}")]
    RuleTable(String),

    /// The path index could not be loaded
    #[error("invalid path index '{path}': {source}")]
    PathIndex {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The listing feed is not a well-formed document
    #[error("failed to parse listing feed: {0}")]
    FeedParse(String),

    /// The listing feed could not be downloaded
    #[error("failed to fetch feed from '{url}': {message}")]
    FeedFetch { url: String, message: String },

    /// Export layout is inconsistent (column map outside the row width, etc.)
    #[error("invalid export layout: {0}")]
    InvalidLayout(String),

    /// A required input location was not given
    #[error("missing input: {0}")]
    MissingInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
