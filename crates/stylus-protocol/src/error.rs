//! Error types for stylus-protocol

/// Result type for stylus-protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while decoding controller messages
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The message is not valid JSON or does not match its schema
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A styles payload has the right JSON shape but the wrong contents
    #[error("Invalid styles payload: {reason}")]
    InvalidPayload { reason: String },
}
