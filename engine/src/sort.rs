//! Sorting for the filtered row set.
//!
//! The comparator gives a total order: numbers compare numerically, text
//! compares case-insensitively with digit runs compared as numbers (so
//! `"item2" < "item10"`), and null/missing values land after every defined
//! value in both directions.

use crate::{FieldName, FieldValue, Row};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Direction of a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// The opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Active sort: which field, and which way.
///
/// `key: None` means the fetch-result order is kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortConfig {
    pub key: Option<FieldName>,
    pub direction: SortDirection,
}

impl SortConfig {
    /// Create a sort on a field.
    pub fn new(key: impl Into<FieldName>, direction: SortDirection) -> Self {
        Self {
            key: Some(key.into()),
            direction,
        }
    }
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            key: None,
            direction: SortDirection::Asc,
        }
    }
}

/// Sort rows in place according to `sort`.
///
/// Uses a stable sort, so rows that compare equal keep their relative
/// fetch-result order.
pub fn sort_rows<R: Row>(rows: &mut [R], sort: &SortConfig) {
    let Some(key) = sort.key.as_deref() else {
        return;
    };
    rows.sort_by(|a, b| compare_directed(&a.field(key), &b.field(key), sort.direction));
}

/// Compare two field values under a direction.
///
/// Nulls sort after defined values regardless of direction; only the
/// defined-vs-defined comparison is negated for descending.
pub fn compare_directed(a: &FieldValue<'_>, b: &FieldValue<'_>, direction: SortDirection) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = compare_values(a, b);
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        }
    }
}

fn compare_values(a: &FieldValue<'_>, b: &FieldValue<'_>) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_number(), b.as_number()) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }
    compare_text(&a.to_text(), &b.to_text())
}

/// Case-insensitive, digit-run-aware text comparison.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        if a[i].is_ascii_digit() && b[j].is_ascii_digit() {
            let start_a = i;
            while i < a.len() && a[i].is_ascii_digit() {
                i += 1;
            }
            let start_b = j;
            while j < b.len() && b[j].is_ascii_digit() {
                j += 1;
            }

            let run_a = trim_leading_zeros(&a[start_a..i]);
            let run_b = trim_leading_zeros(&b[start_b..j]);
            let ord = run_a
                .len()
                .cmp(&run_b.len())
                .then_with(|| run_a.cmp(run_b));
            if ord != Ordering::Equal {
                return ord;
            }
        } else {
            let ord = a[i].cmp(&b[j]);
            if ord != Ordering::Equal {
                return ord;
            }
            i += 1;
            j += 1;
        }
    }

    (a.len() - i).cmp(&(b.len() - j))
}

fn trim_leading_zeros(digits: &[char]) -> &[char] {
    let first = digits.iter().position(|c| *c != '0').unwrap_or(digits.len());
    &digits[first..]
}
