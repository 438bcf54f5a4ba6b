//! Error types for the icon engine.

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the icon engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The compiled icon table is structurally unusable.
    #[error("Invalid icon table: {message}")]
    InvalidTable { message: String },

    /// Icon table (de)serialization error.
    #[error("Icon table JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An inlined image payload could not be decoded.
    #[error("Invalid image payload for icon '{icon}': {source}")]
    Payload {
        icon: String,
        #[source]
        source: base64::DecodeError,
    },
}

impl Error {
    /// Create an invalid-table error.
    pub fn invalid_table(message: impl Into<String>) -> Self {
        Self::InvalidTable {
            message: message.into(),
        }
    }

    /// Create a payload error.
    pub fn payload(icon: impl Into<String>, source: base64::DecodeError) -> Self {
        Self::Payload {
            icon: icon.into(),
            source,
        }
    }
}
