//! Data source contract - the injected fetch operation.
//!
//! The controller never does IO of its own. Each screen supplies a
//! [`DataSource`] that performs the actual HTTP call, attaches auth headers,
//! and maps transport failures into a [`FetchError`] with a message fit for
//! display.

use crate::FetchError;
use futures::future::BoxFuture;
use std::future::Future;

/// An injected, zero-argument async producer of the full row set.
pub trait DataSource<R>: Send + Sync {
    /// Fetch the complete data set for the table.
    fn fetch(&self) -> BoxFuture<'_, Result<Vec<R>, FetchError>>;
}

/// Adapter turning an async closure into a [`DataSource`].
///
/// Built with [`from_fn`].
pub struct FnSource<F> {
    f: F,
}

/// Wrap an async closure as a [`DataSource`].
pub fn from_fn<R, F, Fut>(f: F) -> FnSource<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<R>, FetchError>> + Send + 'static,
{
    FnSource { f }
}

impl<R, F, Fut> DataSource<R> for FnSource<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<R>, FetchError>> + Send + 'static,
{
    fn fetch(&self) -> BoxFuture<'_, Result<Vec<R>, FetchError>> {
        Box::pin((self.f)())
    }
}
