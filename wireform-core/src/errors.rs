//! Wireform error types.
//!
//! Estimator failures (noise-dominated captures, undetectable symbol rate,
//! no plateaus) are not errors: they produce an [`AnalysisResult`] without
//! signal parameters. Only invalid caller input and decoder failures are
//! surfaced through these types.
//!
//! [`AnalysisResult`]: crate::pipeline::AnalysisResult

use thiserror::Error;

/// Top-level error type for the analysis entry points
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Source decoder error: {0}")]
    Source(#[from] SourceError),
}

/// Failures raised by pluggable IQ decoders
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Unknown capture format: {0}")]
    UnknownFormat(String),

    #[error("Corrupt header in {origin}: {detail}")]
    CorruptHeader { origin: String, detail: String },

    #[error("Unsupported variant of {format}: {detail}")]
    UnsupportedVariant { format: String, detail: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Wireform operations
pub type Result<T> = std::result::Result<T, AnalysisError>;
