//! Error types for event decoding and encoding.
//!
//! Decode entry points never return these directly: they are collected into a
//! [`Decoded`](crate::Decoded) outcome next to the (possibly partial) value.
//! Encoding returns them through [`EventResult`].

use thiserror::Error;

// =============================================================================
// Event Errors
// =============================================================================

/// A protocol violation or codec failure on a single event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// The input was not a JSON object.
    #[error("{entity}: expected a JSON object")]
    NotAnObject {
        /// The envelope being decoded.
        entity: &'static str,
    },

    /// A field the protocol requires is absent.
    #[error("{entity}: missing required field '{field}'")]
    MissingField {
        /// The envelope being decoded.
        entity: &'static str,
        /// The absent wire key.
        field: &'static str,
    },

    /// A field is present but holds the wrong JSON type or an out-of-range value.
    #[error("{entity}: invalid field '{field}': {reason}")]
    InvalidField {
        /// The envelope being decoded.
        entity: &'static str,
        /// The offending wire key.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// The content codec rejected a payload.
    #[error("{entity}: failed to decode '{field}': {reason}")]
    ContentDecode {
        /// The envelope being decoded.
        entity: &'static str,
        /// The wire key holding the payload (`content` or `prev_content`).
        field: &'static str,
        /// Message from the content codec.
        reason: String,
    },

    /// The content codec could not serialize a payload.
    #[error("{entity}: failed to encode content: {reason}")]
    ContentEncode {
        /// The envelope being encoded.
        entity: &'static str,
        /// Message from the content codec.
        reason: String,
    },

    /// The event type has no wire string to write.
    #[error("event type is unsupported and carries no wire string")]
    UnrenderableType,

    /// Raw input was not valid JSON.
    #[error("malformed JSON: {reason}")]
    Malformed {
        /// Message from the JSON parser.
        reason: String,
    },
}

impl From<serde_json::Error> for EventError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed {
            reason: err.to_string(),
        }
    }
}

impl EventError {
    /// Creates a missing field error.
    pub fn missing(entity: &'static str, field: &'static str) -> Self {
        Self::MissingField { entity, field }
    }

    /// Creates an invalid field error.
    pub fn invalid(entity: &'static str, field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            entity,
            field,
            reason: reason.into(),
        }
    }

    /// Returns the wire key this error refers to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingField { field, .. }
            | Self::InvalidField { field, .. }
            | Self::ContentDecode { field, .. } => Some(*field),
            Self::NotAnObject { .. }
            | Self::ContentEncode { .. }
            | Self::UnrenderableType
            | Self::Malformed { .. } => None,
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for event operations.
pub type EventResult<T> = Result<T, EventError>;
