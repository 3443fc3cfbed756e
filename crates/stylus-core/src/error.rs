//! Error types for stylus-core

/// Result type for stylus-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur inside the engine
///
/// None of these reach the host page: the engine's event entry points log
/// and swallow them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid engine configuration
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// The engine was shut down and no longer accepts work
    #[error("Engine has been shut down")]
    Disposed,

    /// The channel to the controller can no longer be opened
    #[error("Controller session invalidated")]
    SessionInvalidated,

    // Transparent wrappers for underlying crate errors
    /// Document error from stylus-dom
    #[error(transparent)]
    Dom(#[from] stylus_dom::Error),

    /// Protocol error from stylus-protocol
    #[error(transparent)]
    Protocol(#[from] stylus_protocol::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}
