use thiserror::Error;

/// The four failure kinds every engine operation is allowed to surface.
/// Nothing else escapes the engine's public API.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed input; the message is safe to show verbatim to the caller.
    #[error("{0}")]
    Validation(String),

    /// Missing/invalid session, or insufficient role/ownership. Deliberately
    /// carries no detail about which check failed.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found")]
    NotFound,

    /// Unexpected persistence failure. The cause goes to server-side logs,
    /// never to the client.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl EngineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }
}
