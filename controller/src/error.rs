//! Error types for the table controller.

use thiserror::Error;

/// Failure reported by an injected [`crate::DataSource`].
///
/// Carries the human-readable message the caller mapped its transport error
/// into; the controller surfaces it verbatim as the table's error state. An
/// empty message is replaced with a generic fallback at the load/refresh
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FetchError(pub String);

impl FetchError {
    /// Create a fetch error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// The message as given by the data source.
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl From<String> for FetchError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for FetchError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}
