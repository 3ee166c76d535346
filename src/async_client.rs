//! Async wrapper around [`Explorer`] for use in async runtimes (Tokio, etc.).
//!
//! Runs every explorer operation on the blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free while
//! DuckDB queries run.
//!
//! # Example
//!
//! ```no_run
//! use carprice_explorer::{AsyncExplorer, FilterState};
//!
//! #[tokio::main]
//! async fn main() {
//!     let explorer = AsyncExplorer::builder().build().await.unwrap();
//!     let view = explorer.render(FilterState::new()).await.unwrap();
//! }
//! ```

use std::sync::Arc;

use crate::error::{ExplorerError, Result};
use crate::models::{Make, Model};
use crate::session::DashboardView;
use crate::{Explorer, ExplorerBuilder, FilterState};

// ---------------------------------------------------------------------------
// AsyncExplorerBuilder
// ---------------------------------------------------------------------------

/// Builds an [`AsyncExplorer`] from an [`ExplorerBuilder`].
pub struct AsyncExplorerBuilder {
    inner: ExplorerBuilder,
}

impl AsyncExplorerBuilder {
    /// Adjust the wrapped synchronous builder.
    pub fn configure<F>(mut self, f: F) -> Self
    where
        F: FnOnce(ExplorerBuilder) -> ExplorerBuilder,
    {
        self.inner = f(self.inner);
        self
    }

    /// Build the explorer on the blocking pool, since opening the warehouse
    /// touches the filesystem.
    pub async fn build(self) -> Result<AsyncExplorer> {
        let inner = self.inner;
        tokio::task::spawn_blocking(move || {
            let explorer = inner.build()?;
            Ok(AsyncExplorer {
                inner: Arc::new(explorer),
            })
        })
        .await
        .map_err(|e| ExplorerError::Task(format!("task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncExplorer
// ---------------------------------------------------------------------------

/// Async handle to a shared [`Explorer`]. Cheap to clone.
///
/// Callers keep their own [`FilterState`] and pass it to
/// [`render()`](Self::render). When a user changes a filter while an earlier
/// render is still in flight, the earlier result should simply be dropped;
/// its fetch still fills the cache.
#[derive(Clone)]
pub struct AsyncExplorer {
    inner: Arc<Explorer>,
}

impl AsyncExplorer {
    pub fn builder() -> AsyncExplorerBuilder {
        AsyncExplorerBuilder {
            inner: Explorer::builder(),
        }
    }

    pub fn from_explorer(explorer: Explorer) -> Self {
        Self {
            inner: Arc::new(explorer),
        }
    }

    /// Run a sync explorer operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Explorer) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let explorer = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || f(&explorer))
            .await
            .map_err(|e| ExplorerError::Task(format!("task join error: {e}")))?
    }

    pub async fn render(&self, state: FilterState) -> Result<DashboardView> {
        self.run(move |e| e.render(&state)).await
    }

    pub async fn makes(&self) -> Result<Arc<Vec<Make>>> {
        self.run(|e| e.makes()).await
    }

    pub async fn models(&self, make_id: i64) -> Result<Arc<Vec<Model>>> {
        self.run(move |e| e.models(make_id)).await
    }

    /// Drop every cached response.
    pub async fn refresh(&self) -> Result<()> {
        self.run(|e| {
            e.refresh();
            Ok(())
        })
        .await
    }
}
