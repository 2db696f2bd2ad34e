//! Error types for the social-sentiment library.
//!
//! Structural misses inside export JSON never reach this type: extractors
//! skip the node instead. What remains here is fatal to a run.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can abort an ingest, annotate or summarize run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Export file is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Table could not be read or written as CSV
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// An entity token in an annotated table has no `surface,type` shape
    #[error("Malformed entity token {token:?} in {} (row {row})", path.display())]
    MalformedEntity {
        /// Annotated file the token came from
        path: PathBuf,
        /// 1-based data row, header excluded
        row: usize,
        /// The offending token
        token: String,
    },

    /// Caller supplied inconsistent arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An annotation collaborator failed
    #[error("Annotation error: {0}")]
    Annotation(String),

    /// General error with context
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Result with PipelineError
pub type Result<T> = std::result::Result<T, PipelineError>;

impl From<anyhow::Error> for PipelineError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<tempfile::PersistError> for PipelineError {
    fn from(err: tempfile::PersistError) -> Self {
        Self::Io(err.error)
    }
}
