//! Integration tests for the table controller.
//!
//! Timing-sensitive tests run on a paused Tokio clock, so the debounce
//! window and slow fetches are exercised deterministically.

use futures::future::BoxFuture;
use serde_json::{json, Value};
use sift_controller::{from_fn, DataSource, FetchError, TableController, SEARCH_DEBOUNCE};
use sift_engine::{DateFilterMode, SortDirection, TableConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn test_config() -> TableConfig {
    TableConfig::new(10)
        .unwrap()
        .with_search_keys(["name"])
        .unwrap()
        .with_filter_keys(["cat"])
        .unwrap()
        .with_date_filter_key("date")
        .unwrap()
}

fn inventory() -> Vec<Value> {
    vec![
        json!({"name": "Apple", "qty": 5, "cat": "Fruit", "date": "2024-03-15"}),
        json!({"name": "Banana", "qty": 0, "cat": "Fruit", "date": "2024-03-14"}),
        json!({"name": "Carrot", "qty": 12, "cat": "Veg", "date": "2024-02-20"}),
        json!({"name": "Daikon", "qty": 3, "cat": "Veg", "date": "2024-03-01"}),
        json!({"name": "Endive", "qty": 7, "cat": "Veg", "date": "2024-03-02"}),
    ]
}

/// Replays a scripted sequence of delayed responses, one per fetch call.
/// The last entry repeats for any further calls.
struct ScriptedSource {
    calls: AtomicUsize,
    script: Vec<(Duration, Result<Vec<Value>, FetchError>)>,
}

impl ScriptedSource {
    fn new(script: Vec<(Duration, Result<Vec<Value>, FetchError>)>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            script,
        }
    }
}

impl DataSource<Value> for ScriptedSource {
    fn fetch(&self) -> BoxFuture<'_, Result<Vec<Value>, FetchError>> {
        let index = self
            .calls
            .fetch_add(1, Ordering::SeqCst)
            .min(self.script.len() - 1);
        let (delay, result) = self.script[index].clone();
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            result
        })
    }
}

// ============================================================================
// Load / Refresh
// ============================================================================

#[tokio::test]
async fn load_populates_data() {
    init_tracing();
    let controller = TableController::new(test_config(), from_fn(|| async { Ok(inventory()) }));

    controller.load().await;

    assert!(!controller.loading());
    assert_eq!(controller.error(), None);
    assert_eq!(controller.view().total_rows, 5);
    assert_eq!(controller.all_data().len(), 5);
}

#[tokio::test]
async fn failed_fetch_surfaces_message_and_empties_data() {
    init_tracing();
    let controller = TableController::new(
        test_config(),
        ScriptedSource::new(vec![
            (Duration::ZERO, Ok(inventory())),
            (Duration::ZERO, Err(FetchError::new("network down"))),
        ]),
    );

    controller.load().await;
    assert_eq!(controller.view().total_rows, 5);

    controller.refresh().await;

    assert_eq!(controller.error(), Some("network down".to_string()));
    assert_eq!(controller.view().total_rows, 0);
    assert!(controller.all_data().is_empty());
    assert!(!controller.loading());
}

#[tokio::test]
async fn empty_failure_message_falls_back_to_generic() {
    let controller = TableController::new(
        test_config(),
        ScriptedSource::new(vec![(Duration::ZERO, Err(FetchError::new("")))]),
    );

    controller.load().await;
    assert_eq!(controller.error(), Some("failed to load data".to_string()));

    controller.refresh().await;
    assert_eq!(
        controller.error(),
        Some("failed to refresh data".to_string())
    );
}

#[tokio::test]
async fn successful_refresh_clears_previous_error() {
    let controller = TableController::new(
        test_config(),
        ScriptedSource::new(vec![
            (Duration::ZERO, Err(FetchError::new("network down"))),
            (Duration::ZERO, Ok(inventory())),
        ]),
    );

    controller.load().await;
    assert!(controller.error().is_some());

    controller.refresh().await;
    assert_eq!(controller.error(), None);
    assert_eq!(controller.view().total_rows, 5);
}

#[tokio::test(start_paused = true)]
async fn stale_fetch_result_is_discarded() {
    init_tracing();
    let slow = (
        Duration::from_millis(500),
        Ok(vec![json!({"name": "stale"})]),
    );
    let fast = (
        Duration::from_millis(10),
        Ok(vec![json!({"name": "fresh"})]),
    );
    let controller = TableController::new(test_config(), ScriptedSource::new(vec![slow, fast]));

    // The second fetch is issued while the first is still in flight and
    // resolves first; the late first result must not overwrite it.
    tokio::join!(controller.load(), controller.refresh());

    let data = controller.all_data();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["name"], "fresh");
    assert!(!controller.loading());
}

#[tokio::test(start_paused = true)]
async fn result_arriving_after_shutdown_is_dropped() {
    let controller = TableController::new(
        test_config(),
        ScriptedSource::new(vec![(Duration::from_millis(100), Ok(inventory()))]),
    );

    let loader = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.load().await })
    };
    tokio::task::yield_now().await;

    controller.shutdown();
    loader.await.unwrap();

    assert!(controller.all_data().is_empty());
}

// ============================================================================
// Debounced Search
// ============================================================================

#[tokio::test(start_paused = true)]
async fn search_applies_after_quiet_period() {
    let controller = TableController::new(test_config(), from_fn(|| async { Ok(inventory()) }));
    controller.load().await;

    controller.set_search_query("an");

    // Raw echo is immediate, the applied query lags.
    assert_eq!(controller.search_query(), "an");
    assert_eq!(controller.debounced_search_query(), "");
    assert_eq!(controller.view().total_rows, 5);

    tokio::time::sleep(SEARCH_DEBOUNCE + Duration::from_millis(50)).await;

    assert_eq!(controller.debounced_search_query(), "an");
    let view = controller.view();
    assert_eq!(view.total_rows, 1);
    assert_eq!(view.rows[0]["name"], "Banana");
}

#[tokio::test(start_paused = true)]
async fn rapid_keystrokes_commit_only_the_final_value() {
    let controller = TableController::new(test_config(), from_fn(|| async { Ok(inventory()) }));
    controller.load().await;

    controller.set_search_query("a");
    tokio::time::sleep(Duration::from_millis(100)).await;
    controller.set_search_query("ap");
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Still inside the restarted window: nothing applied yet.
    assert_eq!(controller.debounced_search_query(), "");

    controller.set_search_query("app");
    tokio::time::sleep(SEARCH_DEBOUNCE + Duration::from_millis(50)).await;

    assert_eq!(controller.debounced_search_query(), "app");
    assert_eq!(controller.view().total_rows, 1);
}

#[tokio::test(start_paused = true)]
async fn debounced_search_resets_to_page_one() {
    let controller = TableController::new(test_config(), from_fn(|| async { Ok(inventory()) }));
    controller.load().await;
    controller.set_rows_per_page(2);
    controller.set_current_page(3);

    controller.set_search_query("a");
    assert_eq!(controller.current_page(), 3);

    tokio::time::sleep(SEARCH_DEBOUNCE + Duration::from_millis(50)).await;
    assert_eq!(controller.current_page(), 1);
}

#[tokio::test(start_paused = true)]
async fn clear_all_filters_cancels_pending_debounce() {
    let controller = TableController::new(test_config(), from_fn(|| async { Ok(inventory()) }));
    controller.load().await;

    controller.set_search_query("zzz");
    controller.clear_all_filters();

    tokio::time::sleep(SEARCH_DEBOUNCE + Duration::from_millis(50)).await;

    assert_eq!(controller.search_query(), "");
    assert_eq!(controller.debounced_search_query(), "");
    assert_eq!(controller.view().total_rows, 5);
}

// ============================================================================
// Filters, Sort, Pagination
// ============================================================================

#[tokio::test]
async fn filters_and_sort_compose() {
    let controller = TableController::new(test_config(), from_fn(|| async { Ok(inventory()) }));
    controller.load().await;

    controller.set_filter("cat", "Veg");
    controller.request_sort("qty");

    let view = controller.view();
    assert_eq!(view.total_rows, 3);
    assert_eq!(view.rows[0]["name"], "Daikon");
    assert_eq!(view.rows[1]["name"], "Endive");
    assert_eq!(view.rows[2]["name"], "Carrot");
    assert_eq!(view.sort.direction, SortDirection::Asc);

    controller.request_sort("qty");
    let view = controller.view();
    assert_eq!(view.rows[0]["name"], "Carrot");
    assert_eq!(view.sort.direction, SortDirection::Desc);
}

#[tokio::test]
async fn unknown_filter_key_is_ignored() {
    let controller = TableController::new(test_config(), from_fn(|| async { Ok(inventory()) }));
    controller.load().await;
    controller.set_current_page(2);

    controller.set_filter("vendor", "Acme");

    assert_eq!(controller.filter("vendor"), None);
    assert_eq!(controller.current_page(), 2);
    assert_eq!(controller.view().total_rows, 5);
}

#[tokio::test]
async fn filter_changes_reset_the_page() {
    let controller = TableController::new(test_config(), from_fn(|| async { Ok(inventory()) }));
    controller.load().await;
    controller.set_rows_per_page(2);

    controller.set_current_page(3);
    controller.set_filter("cat", "Veg");
    assert_eq!(controller.current_page(), 1);

    controller.set_current_page(2);
    controller.set_rows_per_page(4);
    assert_eq!(controller.current_page(), 1);

    controller.set_current_page(2);
    controller.clear_all_filters();
    assert_eq!(controller.current_page(), 1);
}

#[tokio::test]
async fn navigation_clamps_to_page_range() {
    let controller = TableController::new(test_config(), from_fn(|| async { Ok(inventory()) }));
    controller.load().await;
    controller.set_rows_per_page(2); // 5 rows -> 3 pages

    controller.next_page();
    assert_eq!(controller.current_page(), 2);
    controller.next_page();
    controller.next_page();
    assert_eq!(controller.current_page(), 3);

    controller.prev_page();
    assert_eq!(controller.current_page(), 2);
    controller.first_page();
    assert_eq!(controller.current_page(), 1);
    controller.prev_page();
    assert_eq!(controller.current_page(), 1);
    controller.last_page();
    assert_eq!(controller.current_page(), 3);
}

#[tokio::test]
async fn navigation_on_empty_result_stays_on_page_one() {
    let controller = TableController::new(
        test_config(),
        from_fn(|| async { Ok(Vec::<Value>::new()) }),
    );
    controller.load().await;

    controller.next_page();
    assert_eq!(controller.current_page(), 1);
    controller.last_page();
    assert_eq!(controller.current_page(), 1);
}

#[tokio::test]
async fn rows_per_page_text_input() {
    let controller = TableController::new(test_config(), from_fn(|| async { Ok(inventory()) }));
    controller.load().await;

    controller.set_rows_per_page_text("3");
    assert_eq!(controller.rows_per_page(), 3);

    controller.set_rows_per_page_text("0");
    controller.set_rows_per_page_text("-2");
    controller.set_rows_per_page_text("many");
    assert_eq!(controller.rows_per_page(), 3);
}

#[tokio::test]
async fn date_range_narrows_the_view() {
    let controller = TableController::new(test_config(), from_fn(|| async { Ok(inventory()) }));
    controller.load().await;

    controller.set_date_filter_mode(DateFilterMode::Range);
    controller.set_date_range("2024-03-01", "2024-03-14");

    let view = controller.view();
    assert_eq!(view.total_rows, 3);

    controller.clear_date_filter();
    assert_eq!(controller.view().total_rows, 5);
}

// ============================================================================
// Stats and Notifications
// ============================================================================

#[tokio::test]
async fn stats_recompute_over_the_filtered_set() {
    let controller = TableController::with_stats(
        test_config(),
        from_fn(|| async { Ok(inventory()) }),
        |filtered, all| {
            let qty_sum: i64 = filtered.iter().filter_map(|r| r["qty"].as_i64()).sum();
            json!({"qtySum": qty_sum, "totalItems": all.len()})
        },
    );
    controller.load().await;

    assert_eq!(
        controller.view().stats,
        Some(json!({"qtySum": 27, "totalItems": 5}))
    );

    controller.set_filter("cat", "Fruit");
    assert_eq!(
        controller.view().stats,
        Some(json!({"qtySum": 5, "totalItems": 5}))
    );
}

#[tokio::test]
async fn subscribers_are_notified_of_changes() {
    let controller = TableController::new(test_config(), from_fn(|| async { Ok(inventory()) }));
    let mut changes = controller.subscribe();
    let before = *changes.borrow_and_update();

    controller.load().await;

    tokio::time::timeout(Duration::from_secs(1), changes.changed())
        .await
        .expect("expected a change notification")
        .unwrap();
    assert!(*changes.borrow_and_update() > before);

    controller.set_filter("cat", "Veg");
    tokio::time::timeout(Duration::from_secs(1), changes.changed())
        .await
        .expect("expected a change notification")
        .unwrap();
}

#[tokio::test]
async fn distinct_values_for_dropdowns() {
    let controller = TableController::new(test_config(), from_fn(|| async { Ok(inventory()) }));
    controller.load().await;

    assert_eq!(controller.distinct_values("cat"), vec!["Fruit", "Veg"]);
}
