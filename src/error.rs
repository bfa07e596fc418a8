//! Error types for the texquery crate.

use thiserror::Error;

/// Convenient result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TexQueryError>;

/// All errors surfaced by the library.
///
/// The query service maps these onto response envelopes: [`BadRequest`]
/// becomes a 400, [`Timeout`] a 500 with a plain-text body, everything else
/// a bare 500. Persistence failures are fatal to `init`/`update`
/// invocations.
///
/// [`BadRequest`]: TexQueryError::BadRequest
/// [`Timeout`]: TexQueryError::Timeout
#[derive(Debug, Error)]
pub enum TexQueryError {
    /// Malformed request envelope, unparseable query, or invalid numeric
    /// field.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The search or the preprocessor exceeded its wall-clock budget.
    #[error("timed out")]
    Timeout,

    /// The document store or the preprocessor was unreachable or returned
    /// malformed data.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Snapshot load or save failed.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// I/O error outside the snapshot path (stdio, sockets).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure not attributable to the request.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Anything else.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TexQueryError {
    /// Create a `BadRequest` error.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        TexQueryError::BadRequest(msg.into())
    }

    /// Create an `Upstream` error.
    pub fn upstream(msg: impl Into<String>) -> Self {
        TexQueryError::Upstream(msg.into())
    }

    /// Create a `Persistence` error.
    pub fn persistence(msg: impl Into<String>) -> Self {
        TexQueryError::Persistence(msg.into())
    }

    /// Create an `Internal` error.
    pub fn internal(msg: impl Into<String>) -> Self {
        TexQueryError::Internal(msg.into())
    }
}
