//! Used-car price explorer.
//!
//! Lets a caller progressively narrow a used-car price dataset through an
//! ordered chain of dependent filters (make, model, mileage range, year,
//! horsepower range, transmission, fuel type) and read back the average price
//! per day for the current selection. Warehouse responses are cached with a
//! time-to-live; filtering happens in memory over the cached rows.
//!
//! # Quick start
//!
//! ```no_run
//! use carprice_explorer::{Explorer, FilterDimension};
//!
//! let explorer = Explorer::builder().database("warehouse.duckdb").build().unwrap();
//! let mut session = explorer.session();
//!
//! let view = session.render().unwrap();
//! let make = view.selector(FilterDimension::Make).options.options[0].value.clone();
//! let view = session.select(FilterDimension::Make, make).unwrap();
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod aggregate;
pub mod cache;
pub mod config;
pub mod connection;
pub mod error;
pub mod filter;
pub mod models;
pub mod queries;
pub mod session;
pub mod source;
pub mod sql_builder;

#[cfg(feature = "async")]
pub use async_client::AsyncExplorer;
pub use cache::{CacheKey, Clock, ManualClock, ResultCache, SystemClock};
pub use config::{DatasetScope, Settings, Tables};
pub use connection::Connection;
pub use error::{ExplorerError, Result};
pub use filter::{
    ClearPolicy, FilterAction, FilterDimension, FilterState, FilterValue, OptionSet, Selection,
};
pub use session::{DashboardView, Session};
pub use source::{DataSource, WarehouseSource};
pub use sql_builder::{QueryParam, SqlBuilder};

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use models::{Dataset, Make, Model};
use queries::{MakeParams, ModelsParams, PricePerDayParams, WarehouseQuery};

// ---------------------------------------------------------------------------
// ExplorerBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`Explorer`].
///
/// Use [`Explorer::builder()`] for defaults or [`ExplorerBuilder::from_env()`]
/// to start from the `CARPRICE_*` environment variables.
pub struct ExplorerBuilder {
    settings: Settings,
    connection: Option<Connection>,
    clock: Option<Arc<dyn Clock>>,
    verify_schema: bool,
}

impl Default for ExplorerBuilder {
    fn default() -> Self {
        Self::with_settings(Settings::default())
    }
}

impl ExplorerBuilder {
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            connection: None,
            clock: None,
            verify_schema: false,
        }
    }

    /// Start from [`Settings::from_env()`].
    pub fn from_env() -> Result<Self> {
        Ok(Self::with_settings(Settings::from_env()?))
    }

    /// Open the warehouse from a DuckDB database file.
    pub fn database<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.settings.database = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use an empty in-memory warehouse.
    pub fn in_memory(mut self) -> Self {
        self.settings.database = None;
        self
    }

    /// Use an already opened connection. Overrides any database path.
    pub fn connection(mut self, conn: Connection) -> Self {
        self.connection = Some(conn);
        self
    }

    /// Schema holding the warehouse tables. Defaults to `main`.
    pub fn schema(mut self, schema: &str) -> Self {
        self.settings.schema = schema.to_string();
        self
    }

    /// How long cached responses are served. Defaults to one hour.
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.settings.cache_ttl = ttl;
        self
    }

    /// Per-query timeout. Defaults to 30 seconds.
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.settings.query_timeout = timeout;
        self
    }

    /// Chart y-axis margin as a fraction of the price spread. Defaults to 0.1.
    pub fn price_margin(mut self, margin: f64) -> Self {
        self.settings.price_margin = margin;
        self
    }

    pub fn clear_policy(mut self, policy: ClearPolicy) -> Self {
        self.settings.clear_policy = policy;
        self
    }

    pub fn scope(mut self, scope: DatasetScope) -> Self {
        self.settings.scope = scope;
        self
    }

    /// Clock used for cache expiry.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Check that every warehouse table exists while building.
    pub fn verify_schema(mut self, verify: bool) -> Self {
        self.verify_schema = verify;
        self
    }

    /// Open the warehouse and build the explorer.
    pub fn build(self) -> Result<Explorer> {
        let tables = self.settings.tables()?;
        let conn = match self.connection {
            Some(conn) => conn,
            None => match &self.settings.database {
                Some(path) => Connection::open(path)?,
                None => Connection::open_in_memory()?,
            },
        }
        .with_timeout(self.settings.query_timeout);

        let source = WarehouseSource::new(conn, tables);
        if self.verify_schema {
            source.check_schema()?;
        }

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        Ok(Explorer::with_clock(Box::new(source), self.settings, clock))
    }
}

// ---------------------------------------------------------------------------
// Explorer
// ---------------------------------------------------------------------------

/// Shared entry point: a [`DataSource`] behind per-query result caches.
///
/// An explorer is `Send + Sync` and is meant to be shared by every session in
/// a process; each [`Session`] borrows it and keeps its own [`FilterState`].
pub struct Explorer {
    source: Box<dyn DataSource>,
    settings: Settings,
    makes: ResultCache<Vec<Make>>,
    models: ResultCache<Vec<Model>>,
    datasets: ResultCache<Dataset>,
}

impl Explorer {
    pub fn builder() -> ExplorerBuilder {
        ExplorerBuilder::default()
    }

    /// Wrap a custom data source.
    pub fn from_source(source: Box<dyn DataSource>, settings: Settings) -> Self {
        Self::with_clock(source, settings, Arc::new(SystemClock))
    }

    pub fn with_clock(
        source: Box<dyn DataSource>,
        settings: Settings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            settings,
            makes: ResultCache::with_clock(Arc::clone(&clock)),
            models: ResultCache::with_clock(Arc::clone(&clock)),
            datasets: ResultCache::with_clock(clock),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Start a session with an empty filter state.
    pub fn session(&self) -> Session<'_> {
        Session::new(self)
    }

    /// Build the dashboard for `state`, fetching through the caches.
    pub fn render(&self, state: &FilterState) -> Result<DashboardView> {
        session::render(self, state)
    }

    // -- Cached queries ------------------------------------------------------

    pub fn makes(&self) -> Result<Arc<Vec<Make>>> {
        let query = WarehouseQuery::ListMakes;
        self.makes
            .get_or_fetch(&query.cache_key(), self.settings.cache_ttl, || {
                self.source.list_makes()
            })
    }

    pub fn models(&self, make_id: i64) -> Result<Arc<Vec<Model>>> {
        let params = ModelsParams { make_id };
        let query = WarehouseQuery::ListModels(params);
        self.models
            .get_or_fetch(&query.cache_key(), self.settings.cache_ttl, || {
                self.source.list_models(params)
            })
    }

    /// Price rows of one model line.
    pub fn price_per_day(&self, make_id: i64, model_id: i64) -> Result<Arc<Dataset>> {
        let params = PricePerDayParams { make_id, model_id };
        let query = WarehouseQuery::PricePerDay(params);
        self.datasets
            .get_or_fetch(&query.cache_key(), self.settings.cache_ttl, || {
                Ok(Dataset::for_make(make_id, self.source.price_per_day(params)?))
            })
    }

    pub fn dataset_by_make(&self, make_id: i64) -> Result<Arc<Dataset>> {
        let params = MakeParams { make_id };
        let query = WarehouseQuery::DatasetByMake(params);
        self.datasets
            .get_or_fetch(&query.cache_key(), self.settings.cache_ttl, || {
                Ok(Dataset::for_make(make_id, self.source.dataset_by_make(params)?))
            })
    }

    pub fn full_dataset(&self) -> Result<Arc<Dataset>> {
        let query = WarehouseQuery::FullDataset;
        self.datasets
            .get_or_fetch(&query.cache_key(), self.settings.cache_ttl, || {
                Ok(Dataset::global(self.source.full_dataset()?))
            })
    }

    /// The dataset backing the attribute filters once `make_id` is selected,
    /// according to the configured [`DatasetScope`].
    pub fn dataset_for_make(&self, make_id: i64) -> Result<Arc<Dataset>> {
        match self.settings.scope {
            DatasetScope::ByMake => self.dataset_by_make(make_id),
            DatasetScope::Global => self.full_dataset(),
        }
    }

    // -- Cache maintenance ---------------------------------------------------

    /// Drop every cached response so the next access refetches.
    pub fn refresh(&self) {
        self.makes.clear();
        self.models.clear();
        self.datasets.clear();
        info!("explorer caches cleared");
    }

    /// Drop expired cache entries. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let ttl = self.settings.cache_ttl;
        self.makes.purge_expired(ttl)
            + self.models.purge_expired(ttl)
            + self.datasets.purge_expired(ttl)
    }

    /// Number of cached responses across all queries.
    pub fn cached_entries(&self) -> usize {
        self.makes.len() + self.models.len() + self.datasets.len()
    }
}

impl fmt::Display for Explorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Explorer(schema={}, scope={:?}, cache_ttl={:?}, cached_entries={})",
            self.settings.schema,
            self.settings.scope,
            self.settings.cache_ttl,
            self.cached_entries()
        )
    }
}
