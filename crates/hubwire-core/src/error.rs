//! Error types for the hubwire data model.

use thiserror::Error;

/// Result type alias using hubwire `Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for hubwire operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Input was valid JSON but a field broke its typing rule.
    ///
    /// `field` is the wire name of the offending field, dotted for nested
    /// members (`authentication.symmetricKey.primaryKey`) and `$` for the root.
    #[error("Invalid value for field `{field}`: {reason}")]
    Decode { field: String, reason: String },

    /// Input is not valid JSON.
    #[error("Malformed JSON: {0}")]
    Notation(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn decode(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Wire name of the field that failed to decode, if this is a decode error.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Decode { field, .. } => Some(field.as_str()),
            _ => None,
        }
    }
}
