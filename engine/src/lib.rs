//! # Sift Engine
//!
//! A deterministic list/table pipeline for dashboard screens.
//!
//! This crate provides the core logic behind every list-style screen of a
//! data dashboard: substring search, exact-match field filters, calendar-day
//! date filtering, sorting, pagination, and caller-defined aggregates over
//! an in-memory data set.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine has no knowledge of the network, timers, or
//!   platform; fetching and debouncing live in the controller crate
//! - **Deterministic**: the same data and query always produce the same view
//! - **Testable**: pure logic, no mocks needed
//! - **Opaque records**: the engine reads fields by name through the
//!   [`Row`] trait and never interprets their domain meaning
//!
//! ## Core Concepts
//!
//! ### Rows
//!
//! Data is whatever the backend returned. JSON objects work out of the box;
//! typed structs implement [`Row`] for compile-time field safety.
//!
//! ### Query state
//!
//! A [`TableQuery`] holds everything the user dialed in: applied search
//! text, per-field filters, the date constraint, sort, and pagination
//! cursor. Its setters encode the page-reset rules shared by every screen.
//!
//! ### Views
//!
//! [`evaluate`] runs filter → sort → paginate and returns a [`TableView`]:
//! the current page of rows plus totals. [`evaluate_with_stats`] also folds
//! the filtered set into a caller-defined aggregate.
//!
//! ## Quick Start
//!
//! ```rust
//! use sift_engine::{evaluate, TableConfig, TableQuery};
//! use serde_json::json;
//!
//! // 1. Describe the table
//! let config = TableConfig::new(10)?
//!     .with_search_keys(["name"])?
//!     .with_filter_keys(["category"])?;
//!
//! // 2. Start from the initial query state
//! let mut query = TableQuery::new(&config);
//!
//! // 3. Apply what the user dialed in
//! query.set_filter("category", "fruit");
//! query.request_sort("name");
//!
//! // 4. Evaluate against the fetched data
//! let data = vec![
//!     json!({"name": "Banana", "category": "Fruit"}),
//!     json!({"name": "Apple", "category": "Fruit"}),
//!     json!({"name": "Carrot", "category": "Veg"}),
//! ];
//! let view = evaluate(&data, &query);
//! assert_eq!(view.total_rows, 2);
//! assert_eq!(view.rows[0]["name"], "Apple");
//! # Ok::<(), sift_engine::Error>(())
//! ```

pub mod config;
pub mod date;
pub mod error;
pub mod filter;
pub mod page;
pub mod query;
pub mod row;
pub mod search;
pub mod sort;
pub mod view;

// Re-export main types at crate root
pub use config::TableConfig;
pub use date::{normalize_day, DateFilter, DateFilterMode, QuickDateFilter};
pub use error::Error;
pub use filter::FILTER_ALL;
pub use query::TableQuery;
pub use row::{FieldValue, Row};
pub use sort::{compare_text, SortConfig, SortDirection};
pub use view::{distinct_values, evaluate, evaluate_with_stats, TableView};

/// Type aliases for clarity
pub type FieldName = String;
