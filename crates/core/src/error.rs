//! Error types for chart-to-slide conversion.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur around the conversion pipeline.
///
/// The public conversion entry points never return these; a failure there
/// degrades to a fallback document and a log line. The variants exist for
/// the input-facing seams and for naming what was degraded.
#[derive(Error, Debug)]
pub enum Error {
    /// The input was not valid JSON.
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A foreign value could not be converted to plain data.
    #[error("Foreign value conversion error: {0}")]
    ForeignValue(String),

    /// A map key did not normalize to something usable as an object key.
    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    /// A chart payload did not have the expected mapping shape.
    #[error("Malformed chart payload: {0}")]
    MalformedChart(String),
}
