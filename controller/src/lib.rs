//! # Sift Controller
//!
//! The asynchronous shell around [`sift_engine`]: one [`TableController`]
//! per list screen, owning the engine state and driving it from UI events.
//!
//! The controller handles the three things the pure engine deliberately
//! does not:
//!
//! - **Fetching**: load/refresh through an injected [`DataSource`], with a
//!   generation counter so a stale response never overwrites newer state
//! - **Debouncing**: raw search keystrokes are echoed immediately but only
//!   applied to filtering after 300 ms of quiescence
//! - **Notification**: every committed state change bumps a
//!   [`tokio::sync::watch`] version that rendering layers can await
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::{json, Value};
//! use sift_controller::{from_fn, FetchError, TableController};
//! use sift_engine::TableConfig;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), sift_engine::Error> {
//! let config = TableConfig::new(10)?
//!     .with_search_keys(["name"])?
//!     .with_filter_keys(["category"])?;
//!
//! // The screen supplies the actual HTTP call.
//! let source = from_fn(|| async {
//!     Ok::<_, FetchError>(vec![
//!         json!({"name": "Apple", "category": "Fruit"}),
//!         json!({"name": "Carrot", "category": "Veg"}),
//!     ])
//! });
//!
//! let table = TableController::<Value>::new(config, source);
//! table.load().await;
//!
//! table.set_filter("category", "fruit");
//! let view = table.view();
//! assert_eq!(view.total_rows, 1);
//! assert_eq!(view.rows[0]["name"], "Apple");
//! # Ok(())
//! # }
//! ```

pub mod controller;
pub mod error;
pub mod source;

// Re-export main types at crate root
pub use controller::{StatsFn, TableController, SEARCH_DEBOUNCE};
pub use error::FetchError;
pub use source::{from_fn, DataSource, FnSource};
