//! The data source contract and its DuckDB implementation.

use tracing::{debug, info};

use crate::config::{Tables, WAREHOUSE_TABLES};
use crate::connection::Connection;
use crate::error::{ExplorerError, Result};
use crate::models::{Make, Model, PriceRow};
use crate::queries::{CatalogQuery, MakeParams, ModelsParams, PricePerDayParams, PriceQuery};

/// Executes the five logical warehouse queries.
///
/// Implementations must be shareable across sessions. An empty result is a
/// valid answer, not an error.
pub trait DataSource: Send + Sync {
    fn list_makes(&self) -> Result<Vec<Make>>;

    fn list_models(&self, params: ModelsParams) -> Result<Vec<Model>>;

    fn price_per_day(&self, params: PricePerDayParams) -> Result<Vec<PriceRow>>;

    fn dataset_by_make(&self, params: MakeParams) -> Result<Vec<PriceRow>>;

    fn full_dataset(&self) -> Result<Vec<PriceRow>>;
}

/// [`DataSource`] backed by a DuckDB warehouse.
pub struct WarehouseSource {
    conn: Connection,
    tables: Tables,
}

impl WarehouseSource {
    pub fn new(conn: Connection, tables: Tables) -> Self {
        Self { conn, tables }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn catalog(&self) -> CatalogQuery<'_> {
        CatalogQuery::new(&self.conn, &self.tables)
    }

    pub fn prices(&self) -> PriceQuery<'_> {
        PriceQuery::new(&self.conn, &self.tables)
    }

    /// Fail with [`ExplorerError::NotFound`] listing every warehouse table
    /// missing from the configured schema.
    pub fn check_schema(&self) -> Result<()> {
        let mut missing = Vec::new();
        for table in WAREHOUSE_TABLES {
            if !self.conn.table_exists(self.tables.schema(), table)? {
                missing.push(self.tables.qualified(table));
            }
        }
        if missing.is_empty() {
            debug!(schema = self.tables.schema(), "warehouse schema complete");
            Ok(())
        } else {
            Err(ExplorerError::NotFound(format!(
                "missing warehouse tables: {}",
                missing.join(", ")
            )))
        }
    }
}

impl DataSource for WarehouseSource {
    fn list_makes(&self) -> Result<Vec<Make>> {
        self.catalog().makes()
    }

    fn list_models(&self, params: ModelsParams) -> Result<Vec<Model>> {
        self.catalog().models(params)
    }

    fn price_per_day(&self, params: PricePerDayParams) -> Result<Vec<PriceRow>> {
        self.prices().price_per_day(params)
    }

    fn dataset_by_make(&self, params: MakeParams) -> Result<Vec<PriceRow>> {
        let rows = self.prices().dataset_by_make(params)?;
        info!(make_id = params.make_id, rows = rows.len(), "fetched make dataset");
        Ok(rows)
    }

    fn full_dataset(&self) -> Result<Vec<PriceRow>> {
        let rows = self.prices().full_dataset()?;
        info!(rows = rows.len(), "fetched full dataset");
        Ok(rows)
    }
}
