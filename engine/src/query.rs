//! Query state - everything the user has dialed in on a table.
//!
//! A [`TableQuery`] owns the applied search text, the per-field filters, the
//! date constraint, the sort, and the pagination cursor. Setters encode the
//! reset rules (a changed constraint sends the user back to page 1) so every
//! screen gets identical behavior.

use crate::{
    date::{DateFilter, DateFilterMode, QuickDateFilter},
    filter::{matches_filters, FILTER_ALL},
    normalize_day,
    search::matches_search,
    FieldName, Row, SortConfig, SortDirection, TableConfig,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// User-adjustable query state for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableQuery {
    search: String,
    filters: BTreeMap<FieldName, String>,
    search_keys: Vec<FieldName>,
    date_key: Option<FieldName>,
    date: DateFilter,
    sort: SortConfig,
    current_page: usize,
    rows_per_page: usize,
}

impl TableQuery {
    /// Initial query state for a config: empty search, every filter at
    /// [`FILTER_ALL`], no date constraint, the default sort, page 1.
    pub fn new(config: &TableConfig) -> Self {
        let filters = config
            .filter_keys
            .iter()
            .map(|key| (key.clone(), FILTER_ALL.to_string()))
            .collect();

        Self {
            search: String::new(),
            filters,
            search_keys: config.search_keys.clone(),
            date_key: config.date_filter_key.clone(),
            date: DateFilter::all(),
            sort: config.default_sort.clone().unwrap_or_default(),
            current_page: 1,
            rows_per_page: config.default_rows_per_page,
        }
    }

    /// The applied (post-debounce) search text.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// All filters, including inactive `"all"` entries.
    pub fn filters(&self) -> &BTreeMap<FieldName, String> {
        &self.filters
    }

    /// Current value of one filter, if the key is configured.
    pub fn filter(&self, key: &str) -> Option<&str> {
        self.filters.get(key).map(String::as_str)
    }

    /// The active date constraint.
    pub fn date_filter(&self) -> &DateFilter {
        &self.date
    }

    /// The active sort.
    pub fn sort(&self) -> &SortConfig {
        &self.sort
    }

    /// Current 1-based page.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Current page size.
    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    /// Apply a new search text. Returns whether it changed; a change resets
    /// to page 1.
    pub fn set_search(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if value == self.search {
            return false;
        }
        self.search = value;
        self.reset_page();
        true
    }

    /// Set one field filter and reset to page 1. [`FILTER_ALL`] removes the
    /// constraint. Returns `false` (and does nothing) for a key that is not
    /// configured as a filter key.
    pub fn set_filter(&mut self, key: &str, value: impl Into<String>) -> bool {
        let Some(slot) = self.filters.get_mut(key) else {
            return false;
        };
        *slot = value.into();
        self.reset_page();
        true
    }

    /// Remove one field filter.
    pub fn clear_filter(&mut self, key: &str) -> bool {
        self.set_filter(key, FILTER_ALL)
    }

    /// Remove every constraint: filters, search, and date filter, back to
    /// page 1.
    pub fn clear_all_filters(&mut self) {
        for value in self.filters.values_mut() {
            *value = FILTER_ALL.to_string();
        }
        self.search.clear();
        self.date = DateFilter::all();
        self.reset_page();
    }

    /// Switch the date-filter mode, keeping any stored dates.
    pub fn set_date_mode(&mut self, mode: DateFilterMode) {
        self.date.mode = mode;
        self.reset_page();
    }

    /// Set the exact-match day from user input. Empty input clears the day;
    /// unparseable input is a no-op returning `false`.
    pub fn set_single_date(&mut self, input: &str) -> bool {
        let Some(day) = parse_optional_day(input) else {
            return false;
        };
        self.date.single = day;
        self.reset_page();
        true
    }

    /// Set the range bounds from user input. Empty input leaves that side
    /// open; if either non-empty bound is unparseable the whole call is a
    /// no-op returning `false`.
    pub fn set_date_range(&mut self, start: &str, end: &str) -> bool {
        let (Some(start), Some(end)) = (parse_optional_day(start), parse_optional_day(end)) else {
            return false;
        };
        self.date.start = start;
        self.date.end = end;
        self.reset_page();
        true
    }

    /// Apply a quick preset relative to `today`, switching the mode.
    pub fn set_quick_date_filter(&mut self, kind: QuickDateFilter, today: NaiveDate) {
        self.date = DateFilter::quick(kind, today);
        self.reset_page();
    }

    /// Drop the date constraint and its stored dates.
    pub fn clear_date_filter(&mut self) {
        self.date = DateFilter::all();
        self.reset_page();
    }

    /// Sort by `key`, toggling direction when it is already the sort key.
    pub fn request_sort(&mut self, key: impl Into<FieldName>) {
        let key = key.into();
        if self.sort.key.as_deref() == Some(key.as_str()) {
            self.sort.direction = self.sort.direction.toggled();
        } else {
            self.sort = SortConfig {
                key: Some(key),
                direction: SortDirection::Asc,
            };
        }
    }

    /// Jump to a page. Stored as given; the navigation helpers in the
    /// controller are the clamped surface.
    pub fn set_current_page(&mut self, page: usize) {
        self.current_page = page;
    }

    /// Change the page size and reset to page 1. Zero is a no-op returning
    /// `false`.
    pub fn set_rows_per_page(&mut self, rows: usize) -> bool {
        if rows == 0 {
            return false;
        }
        self.rows_per_page = rows;
        self.reset_page();
        true
    }

    /// Change the page size from free-form text input. Anything that does
    /// not parse as a positive integer is a no-op returning `false`.
    pub fn set_rows_per_page_text(&mut self, input: &str) -> bool {
        match input.trim().parse::<usize>() {
            Ok(rows) => self.set_rows_per_page(rows),
            Err(_) => false,
        }
    }

    /// Check a row against every active constraint: search, field filters,
    /// and the date filter, combined with logical AND.
    pub fn matches<R: Row>(&self, row: &R) -> bool {
        if !matches_search(row, &self.search_keys, &self.search) {
            return false;
        }
        if !matches_filters(row, &self.filters) {
            return false;
        }
        match &self.date_key {
            Some(key) => self.date.matches(&row.field(key)),
            None => true,
        }
    }

    fn reset_page(&mut self) {
        self.current_page = 1;
    }
}

fn parse_optional_day(input: &str) -> Option<Option<NaiveDate>> {
    let input = input.trim();
    if input.is_empty() {
        return Some(None);
    }
    normalize_day(input).map(Some)
}
