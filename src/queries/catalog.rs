//! Make and model catalog queries.

use crate::config::Tables;
use crate::connection::Connection;
use crate::error::Result;
use crate::models::{Make, Model};
use crate::queries::ModelsParams;
use crate::sql_builder::SqlBuilder;

/// Query interface for the `make` and `model` tables.
pub struct CatalogQuery<'a> {
    conn: &'a Connection,
    tables: &'a Tables,
}

impl<'a> CatalogQuery<'a> {
    pub fn new(conn: &'a Connection, tables: &'a Tables) -> Self {
        Self { conn, tables }
    }

    /// Every make, ordered by name.
    pub fn makes(&self) -> Result<Vec<Make>> {
        let (sql, params) = SqlBuilder::new(&self.tables.make())
            .distinct()
            .select(&["make_id", "name AS make"])
            .order_by(&["make ASC", "make_id ASC"])
            .build();

        self.conn.execute_into(&sql, &params)
    }

    /// Models of one make, ordered by name. Unknown makes yield no models.
    pub fn models(&self, params: ModelsParams) -> Result<Vec<Model>> {
        let (sql, params) = SqlBuilder::new(&self.tables.model())
            .distinct()
            .select(&["model_id", "name AS model"])
            .where_eq("make_id", params.make_id)
            .order_by(&["model ASC", "model_id ASC"])
            .build();

        self.conn.execute_into(&sql, &params)
    }
}
