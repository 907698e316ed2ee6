//! The `error` module defines the error types used within `topicbus`.
//!
//! Every failure in the messaging core is local and recoverable: a name that
//! is already claimed, a name that cannot be found, a subscriber that has been
//! closed. "No message yet" is not an error and is reported as `None` by the
//! receive calls instead.

use thiserror::Error;

/// Main error type for `topicbus` operations.
#[derive(Error, Debug)]
pub enum BusError {
    /// A topic or shared variable with this name already exists for the
    /// requested type.
    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: &'static str, name: String },

    /// No topic or shared variable with this name exists for the requested
    /// type.
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    /// The subscriber was closed and its queue is drained.
    #[error("subscriber closed")]
    Closed,

    /// A serializer failed to encode or decode a payload.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Settings could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Result type alias for `topicbus` operations.
pub type Result<T> = std::result::Result<T, BusError>;

impl BusError {
    pub(crate) fn topic_exists(name: &str) -> Self {
        Self::AlreadyExists {
            kind: "topic",
            name: name.to_string(),
        }
    }

    pub(crate) fn topic_not_found(name: &str) -> Self {
        Self::NotFound {
            kind: "topic",
            name: name.to_string(),
        }
    }

    pub(crate) fn variable_exists(name: &str) -> Self {
        Self::AlreadyExists {
            kind: "variable",
            name: name.to_string(),
        }
    }

    pub(crate) fn variable_not_found(name: &str) -> Self {
        Self::NotFound {
            kind: "variable",
            name: name.to_string(),
        }
    }

    pub(crate) fn serialization(err: impl std::fmt::Display) -> Self {
        Self::Serialization(err.to_string())
    }

    /// Returns `true` for [`BusError::AlreadyExists`].
    #[must_use]
    pub const fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Returns `true` for [`BusError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
