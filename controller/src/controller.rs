//! The table controller - async shell around the engine.
//!
//! One controller is mounted per list screen. It owns the engine state,
//! drives load/refresh through the injected [`DataSource`], debounces search
//! input, and publishes a change version that rendering layers can await.
//!
//! Every fetch is tagged with a generation counter; only the most recently
//! issued fetch may commit its result, so a stale response from a slow
//! request (or one that lands after [`TableController::shutdown`]) is
//! discarded instead of clobbering newer state.

use crate::DataSource;
use serde_json::Value;
use sift_engine::{
    evaluate, evaluate_with_stats, DateFilter, DateFilterMode, QuickDateFilter, Row, SortConfig,
    TableConfig, TableQuery, TableView,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

/// Trailing-edge delay between a keystroke and the applied search text.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

const LOAD_FALLBACK: &str = "failed to load data";
const REFRESH_FALLBACK: &str = "failed to refresh data";

/// Aggregation callback receiving `(filtered, all)`.
pub type StatsFn<R> = Box<dyn Fn(&[R], &[R]) -> Value + Send + Sync>;

struct State<R> {
    all_data: Vec<R>,
    loading: bool,
    error: Option<String>,
    search_query: String,
    query: TableQuery,
}

struct Shared<R> {
    config: TableConfig,
    source: Box<dyn DataSource<R>>,
    stats: Option<StatsFn<R>>,
    state: Mutex<State<R>>,
    /// Generation of the most recently issued fetch.
    fetch_gen: AtomicU64,
    /// Generation of the most recently scheduled debounce commit.
    debounce_gen: AtomicU64,
    closed: AtomicBool,
    changes: watch::Sender<u64>,
}

impl<R> Shared<R> {
    fn lock(&self) -> MutexGuard<'_, State<R>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self) {
        self.changes.send_modify(|version| *version += 1);
    }
}

/// Async controller for one table instance.
///
/// Cheap to clone; clones share the same state. Must be used within a Tokio
/// runtime: [`TableController::set_search_query`] spawns the debounce timer.
pub struct TableController<R> {
    shared: Arc<Shared<R>>,
}

impl<R> Clone for TableController<R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<R> TableController<R>
where
    R: Row + Clone + Send + Sync + 'static,
{
    /// Create a controller. Call [`TableController::load`] once after the
    /// screen mounts.
    pub fn new(config: TableConfig, source: impl DataSource<R> + 'static) -> Self {
        Self::build(config, Box::new(source), None)
    }

    /// Create a controller with an aggregation callback. The callback runs
    /// on every [`TableController::view`] over `(filtered, all)` and its
    /// result is exposed verbatim on the view.
    pub fn with_stats(
        config: TableConfig,
        source: impl DataSource<R> + 'static,
        stats: impl Fn(&[R], &[R]) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self::build(config, Box::new(source), Some(Box::new(stats)))
    }

    fn build(
        config: TableConfig,
        source: Box<dyn DataSource<R>>,
        stats: Option<StatsFn<R>>,
    ) -> Self {
        let query = TableQuery::new(&config);
        let (changes, _) = watch::channel(0);
        Self {
            shared: Arc::new(Shared {
                config,
                source,
                stats,
                state: Mutex::new(State {
                    all_data: Vec::new(),
                    loading: false,
                    error: None,
                    search_query: String::new(),
                    query,
                }),
                fetch_gen: AtomicU64::new(0),
                debounce_gen: AtomicU64::new(0),
                closed: AtomicBool::new(false),
                changes,
            }),
        }
    }

    /// Initial data load.
    pub async fn load(&self) {
        self.run_fetch(LOAD_FALLBACK).await;
    }

    /// Re-fetch the full data set, typically after the caller performed a
    /// create/update/delete against the backend.
    pub async fn refresh(&self) {
        self.run_fetch(REFRESH_FALLBACK).await;
    }

    async fn run_fetch(&self, fallback: &'static str) {
        let generation = self.shared.fetch_gen.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.shared.lock();
            state.loading = true;
            state.error = None;
        }
        self.shared.publish();
        tracing::debug!(generation, "fetch started");

        let result = self.shared.source.fetch().await;

        {
            // The generation check and the commit share one critical section
            // so a newer fetch issued in between can never be overwritten.
            let mut state = self.shared.lock();
            if self.shared.closed.load(Ordering::SeqCst)
                || self.shared.fetch_gen.load(Ordering::SeqCst) != generation
            {
                tracing::debug!(generation, "stale fetch result discarded");
                return;
            }
            match result {
                Ok(rows) => {
                    tracing::debug!(generation, rows = rows.len(), "fetch committed");
                    state.all_data = rows;
                }
                Err(err) => {
                    let message = if err.message().is_empty() {
                        fallback.to_string()
                    } else {
                        err.to_string()
                    };
                    tracing::warn!(generation, error = %message, "fetch failed");
                    state.error = Some(message);
                    state.all_data = Vec::new();
                }
            }
            state.loading = false;
        }
        self.shared.publish();
    }

    /// Update the raw search text and schedule the debounced commit.
    ///
    /// The raw value is visible immediately (for the controlled input); the
    /// applied query changes only after [`SEARCH_DEBOUNCE`] of quiescence,
    /// and a changed query resets to page 1.
    pub fn set_search_query(&self, value: impl Into<String>) {
        let value = value.into();
        {
            let mut state = self.shared.lock();
            state.search_query = value.clone();
        }
        self.shared.publish();

        let generation = self.shared.debounce_gen.fetch_add(1, Ordering::SeqCst) + 1;
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            tokio::time::sleep(SEARCH_DEBOUNCE).await;
            let mut state = shared.state.lock().unwrap_or_else(PoisonError::into_inner);
            if shared.closed.load(Ordering::SeqCst)
                || shared.debounce_gen.load(Ordering::SeqCst) != generation
            {
                return;
            }
            let changed = state.query.set_search(value);
            drop(state);
            if changed {
                tracing::debug!("search query applied");
                shared.publish();
            }
        });
    }

    /// Set one field filter; `"all"` removes the constraint. Unknown keys
    /// are ignored.
    pub fn set_filter(&self, key: &str, value: impl Into<String>) {
        let applied = self.update(|state| state.query.set_filter(key, value));
        if !applied {
            tracing::warn!(key, "ignoring filter for unconfigured key");
        }
    }

    /// Remove one field filter.
    pub fn clear_filter(&self, key: &str) {
        self.update(|state| state.query.clear_filter(key));
    }

    /// Remove every constraint: filters, search (raw and applied), and the
    /// date filter. Cancels any pending debounce commit.
    pub fn clear_all_filters(&self) {
        self.shared.debounce_gen.fetch_add(1, Ordering::SeqCst);
        self.update(|state| {
            state.search_query.clear();
            state.query.clear_all_filters();
            true
        });
    }

    /// Switch the date-filter mode, keeping any stored dates.
    pub fn set_date_filter_mode(&self, mode: DateFilterMode) {
        self.update(|state| {
            state.query.set_date_mode(mode);
            true
        });
    }

    /// Set the exact-match day from user input. Unparseable input is a
    /// no-op; empty input clears the day.
    pub fn set_single_date(&self, input: &str) {
        let applied = self.update(|state| state.query.set_single_date(input));
        if !applied {
            tracing::debug!(input, "ignoring unparseable date");
        }
    }

    /// Set the range bounds from user input. Empty bounds stay open;
    /// unparseable input is a no-op.
    pub fn set_date_range(&self, start: &str, end: &str) {
        let applied = self.update(|state| state.query.set_date_range(start, end));
        if !applied {
            tracing::debug!(start, end, "ignoring unparseable date range");
        }
    }

    /// Apply a quick date preset relative to the local calendar day.
    pub fn set_quick_date_filter(&self, kind: QuickDateFilter) {
        let today = chrono::Local::now().date_naive();
        self.update(|state| {
            state.query.set_quick_date_filter(kind, today);
            true
        });
    }

    /// Drop the date constraint.
    pub fn clear_date_filter(&self) {
        self.update(|state| {
            state.query.clear_date_filter();
            true
        });
    }

    /// Sort by `key`, toggling direction when it is already the sort key.
    pub fn request_sort(&self, key: impl Into<String>) {
        self.update(|state| {
            state.query.request_sort(key);
            true
        });
    }

    /// Jump to a page, as given. The navigation helpers below are the
    /// clamped surface.
    pub fn set_current_page(&self, page: usize) {
        self.update(|state| {
            state.query.set_current_page(page);
            true
        });
    }

    /// Go to page 1.
    pub fn first_page(&self) {
        self.navigate(|_, _| 1);
    }

    /// Go back one page, stopping at page 1.
    pub fn prev_page(&self) {
        self.navigate(|page, _| page.saturating_sub(1));
    }

    /// Advance one page, stopping at the last page.
    pub fn next_page(&self) {
        self.navigate(|page, last| page.saturating_add(1).min(last));
    }

    /// Go to the last page.
    pub fn last_page(&self) {
        self.navigate(|_, last| last);
    }

    fn navigate(&self, target: impl FnOnce(usize, usize) -> usize) {
        self.update(|state| {
            let filtered = state
                .all_data
                .iter()
                .filter(|row| state.query.matches(*row))
                .count();
            let last = sift_engine::page::total_pages(filtered, state.query.rows_per_page()).max(1);
            let next =
                sift_engine::page::clamp_page(target(state.query.current_page(), last), last);
            if next == state.query.current_page() {
                return false;
            }
            state.query.set_current_page(next);
            true
        });
    }

    /// Change the page size and reset to page 1. Zero is ignored.
    pub fn set_rows_per_page(&self, rows: usize) {
        self.update(|state| state.query.set_rows_per_page(rows));
    }

    /// Change the page size from free-form text input; anything that is not
    /// a positive integer is ignored.
    pub fn set_rows_per_page_text(&self, input: &str) {
        self.update(|state| state.query.set_rows_per_page_text(input));
    }

    /// Evaluate the pipeline and return the renderable view.
    pub fn view(&self) -> TableView<R> {
        let state = self.shared.lock();
        match &self.shared.stats {
            Some(stats) => evaluate_with_stats(&state.all_data, &state.query, |filtered, all| {
                stats(filtered, all)
            }),
            None => evaluate(&state.all_data, &state.query),
        }
    }

    /// Distinct values of a field across the loaded data, for filter
    /// dropdowns.
    pub fn distinct_values(&self, key: &str) -> Vec<String> {
        let state = self.shared.lock();
        sift_engine::distinct_values(&state.all_data, key)
    }

    /// Whether a fetch is in flight.
    pub fn loading(&self) -> bool {
        self.shared.lock().loading
    }

    /// Message of the last failed fetch, cleared when a new fetch starts.
    pub fn error(&self) -> Option<String> {
        self.shared.lock().error.clone()
    }

    /// The raw search text, echoing the input field.
    pub fn search_query(&self) -> String {
        self.shared.lock().search_query.clone()
    }

    /// The applied (post-debounce) search text.
    pub fn debounced_search_query(&self) -> String {
        self.shared.lock().query.search().to_string()
    }

    /// All filters, including inactive `"all"` entries.
    pub fn filters(&self) -> BTreeMap<String, String> {
        self.shared.lock().query.filters().clone()
    }

    /// Current value of one filter, if configured.
    pub fn filter(&self, key: &str) -> Option<String> {
        self.shared.lock().query.filter(key).map(str::to_string)
    }

    /// The active date constraint.
    pub fn date_filter(&self) -> DateFilter {
        *self.shared.lock().query.date_filter()
    }

    /// The active sort.
    pub fn sort(&self) -> SortConfig {
        self.shared.lock().query.sort().clone()
    }

    /// Current 1-based page.
    pub fn current_page(&self) -> usize {
        self.shared.lock().query.current_page()
    }

    /// Current page size.
    pub fn rows_per_page(&self) -> usize {
        self.shared.lock().query.rows_per_page()
    }

    /// A copy of the full loaded data set, in fetch-result order.
    pub fn all_data(&self) -> Vec<R> {
        self.shared.lock().all_data.clone()
    }

    /// The configuration this controller was built with.
    pub fn config(&self) -> &TableConfig {
        &self.shared.config
    }

    /// Subscribe to state changes. The receiver carries a monotonically
    /// increasing version; await `changed()` instead of polling.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.changes.subscribe()
    }

    /// Mark the controller as torn down. In-flight fetch results and pending
    /// debounce commits are discarded from this point on.
    pub fn shutdown(&self) {
        self.shared.closed.store(true, Ordering::SeqCst);
        tracing::debug!("controller shut down");
    }

    fn update(&self, apply: impl FnOnce(&mut State<R>) -> bool) -> bool {
        let changed = {
            let mut state = self.shared.lock();
            apply(&mut state)
        };
        if changed {
            self.shared.publish();
        }
        changed
    }
}
