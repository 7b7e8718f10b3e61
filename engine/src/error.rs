//! Error types for the sift engine.

use thiserror::Error;

/// All possible errors from the sift engine.
///
/// Everything here is a construction-time configuration error. Once a
/// [`crate::TableConfig`] exists, every engine operation is total: malformed
/// runtime input degrades to a no-op or an empty match instead of failing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("rows per page must be positive")]
    InvalidRowsPerPage,

    #[error("empty field name in {0}")]
    EmptyFieldName(&'static str),

    #[error("duplicate field name '{name}' in {section}")]
    DuplicateFieldName { section: &'static str, name: String },
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
