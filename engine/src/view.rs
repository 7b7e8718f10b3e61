//! Derived view - the pipeline output a screen actually renders.
//!
//! Evaluation is a pure function of `(data, query)`: filter, sort, paginate,
//! and optionally aggregate. It never mutates anything, so re-running it with
//! the same inputs always yields the same view.

use crate::{page, sort::sort_rows, Row, SortConfig, TableQuery};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

/// One renderable snapshot of a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView<R> {
    /// Rows visible on the current page.
    pub rows: Vec<R>,
    /// Size of the filtered set.
    pub total_rows: usize,
    /// Page count at the current page size; 0 for an empty set.
    pub total_pages: usize,
    /// The 1-based page these rows came from.
    pub current_page: usize,
    /// Page size used for the slice.
    pub rows_per_page: usize,
    /// The sort that produced the row order.
    pub sort: SortConfig,
    /// Caller-defined aggregates, when configured.
    pub stats: Option<Value>,
}

/// Run the filter → sort → paginate pipeline.
pub fn evaluate<R: Row + Clone>(data: &[R], query: &TableQuery) -> TableView<R> {
    build_view(data, query, None::<fn(&[R], &[R]) -> Value>)
}

/// Run the pipeline and aggregate the filtered set.
///
/// `stats` receives the filtered rows and the full data set, in that order,
/// and its result is exposed verbatim on the view.
pub fn evaluate_with_stats<R, F>(data: &[R], query: &TableQuery, stats: F) -> TableView<R>
where
    R: Row + Clone,
    F: Fn(&[R], &[R]) -> Value,
{
    build_view(data, query, Some(stats))
}

fn build_view<R, F>(data: &[R], query: &TableQuery, stats: Option<F>) -> TableView<R>
where
    R: Row + Clone,
    F: Fn(&[R], &[R]) -> Value,
{
    let mut filtered: Vec<R> = data
        .iter()
        .filter(|row| query.matches(*row))
        .cloned()
        .collect();
    sort_rows(&mut filtered, query.sort());

    let total_rows = filtered.len();
    let total_pages = page::total_pages(total_rows, query.rows_per_page());
    let stats = stats.map(|f| f(&filtered, data));
    let rows = page::page_slice(&filtered, query.current_page(), query.rows_per_page()).to_vec();

    TableView {
        rows,
        total_rows,
        total_pages,
        current_page: query.current_page(),
        rows_per_page: query.rows_per_page(),
        sort: query.sort().clone(),
        stats,
    }
}

/// Distinct string-coerced values of a field across the full data set, in
/// first-seen order. Null/missing values are skipped. Screens use this to
/// populate filter dropdowns.
pub fn distinct_values<R: Row>(data: &[R], key: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for row in data {
        let value = row.field(key);
        if value.is_null() {
            continue;
        }
        let text = value.to_text().into_owned();
        if seen.insert(text.clone()) {
            out.push(text);
        }
    }
    out
}
