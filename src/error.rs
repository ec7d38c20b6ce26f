//! Structured error types for the sitrep rendering engine.
//!
//! Only faults that abort a render appear here. Image fetch/decode failures
//! are recovered inside the resolution pipeline and surface as a visible
//! indicator in the document instead of an error.

use chrono::NaiveDate;
use thiserror::Error;

/// The unified error type returned by all public sitrep API functions.
#[derive(Debug, Error)]
pub enum SitrepError {
    /// JSON input failed to parse as a valid render request.
    #[error("failed to parse render request: {0}")]
    Parse(#[from] serde_json::Error),

    /// The requested date range is inverted.
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// Writing the finished document failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
