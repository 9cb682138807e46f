//! Protocol error types.

use thiserror::Error;

/// Errors that can occur while decoding or encoding messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Unsupported frame (expected a JSON text frame)")]
    UnsupportedFrame,

    #[error("Invalid color: {0:?}")]
    InvalidColor(String),
}
