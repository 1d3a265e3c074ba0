//! Error types for the hearth calendar core.

use thiserror::Error;

/// Errors that can occur outside the render path (loading, saving, editing).
///
/// Day resolution and column packing never return these; they coerce
/// malformed values instead.
#[derive(Error, Debug)]
pub enum HearthError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid event record '{id}': {reason}")]
    InvalidRecord { id: String, reason: String },

    #[error("Event '{0}' comes from an external calendar and is read-only")]
    ReadOnlyEvent(String),

    #[error("Event '{0}' is not a recurring series")]
    NotRecurring(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Event '{0}' not found")]
    EventNotFound(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for hearth operations.
pub type HearthResult<T> = Result<T, HearthError>;
