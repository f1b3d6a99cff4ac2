//! Error types for the SEC research agent

use thiserror::Error;

/// Result type alias for research agent operations
pub type Result<T> = std::result::Result<T, ResearchError>;

/// Faults that are not part of the normal answer flow.
///
/// Upstream "not found" and transient failures are not errors here; they are
/// carried as [`crate::models::FilingsOutcome`] values and end up in the
/// fallback report.
#[derive(Error, Debug)]
pub enum ResearchError {

    // =============================
    // Agent Errors
    // =============================

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid company identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Company directory error: {0}")]
    Directory(String),

    #[error("Invalid envelope: {0}")]
    Envelope(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
