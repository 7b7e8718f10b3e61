//! Substring search across configured fields.

use crate::{FieldName, Row};

/// Check whether a row matches a search query.
///
/// A row matches when **any** search key's string-coerced value contains the
/// query, case-insensitively. The empty query matches everything; a missing
/// field coerces to the empty string and so never matches a non-empty query.
pub fn matches_search<R: Row>(row: &R, search_keys: &[FieldName], query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    search_keys
        .iter()
        .any(|key| row.field(key).to_text().to_lowercase().contains(&needle))
}
