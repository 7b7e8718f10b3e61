//! Exact-match field filters.

use crate::{FieldName, FieldValue, Row};
use std::collections::BTreeMap;

/// Sentinel filter value meaning "no constraint on this field".
pub const FILTER_ALL: &str = "all";

/// Check whether a row satisfies every active filter.
///
/// Filters combine with logical AND. Matching is case-insensitive string
/// equality against the field's coerced text, with one special case kept
/// from the dashboards this engine serves: boolean fields compare against
/// the literal strings `"true"`/`"false"`. Other non-string field types are
/// not given their own comparison rules.
pub fn matches_filters<R: Row>(row: &R, filters: &BTreeMap<FieldName, String>) -> bool {
    filters.iter().all(|(key, wanted)| {
        if wanted == FILTER_ALL {
            return true;
        }
        match row.field(key) {
            FieldValue::Bool(b) => {
                let text = if b { "true" } else { "false" };
                text.eq_ignore_ascii_case(wanted)
            }
            value => value.to_text().to_lowercase() == wanted.to_lowercase(),
        }
    })
}
