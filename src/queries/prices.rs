//! Daily price rows from the `ad_price_history` table.
//!
//! The history holds one row per listing per observed price day. Rows are
//! averaged per day and attribute combination, with each attribute resolved
//! to its display label through the class tables.

use crate::config::Tables;
use crate::connection::Connection;
use crate::error::Result;
use crate::models::PriceRow;
use crate::queries::{MakeParams, PricePerDayParams};
use crate::sql_builder::SqlBuilder;

const PRICE_ROW_COLUMNS: [&str; 13] = [
    "ad.make_id AS make_id",
    "mk.name AS make",
    "ad.model_id AS model_id",
    "mo.name AS model",
    "CAST(CAST(ad.d AS DATE) AS VARCHAR) AS \"day\"",
    "CAST(ad.year_manufactured AS INTEGER) AS \"year\"",
    "km.km_class_id AS km_class_id",
    "km.name AS km_range",
    "hp.hp_class_id AS hp_class_id",
    "hp.name AS hp_range",
    "tt.name AS transmission_type",
    "ft.name AS fuel_type",
    "CAST(AVG(ad.p) AS INTEGER) AS price",
];

/// Query interface for aggregated price rows.
pub struct PriceQuery<'a> {
    conn: &'a Connection,
    tables: &'a Tables,
}

impl<'a> PriceQuery<'a> {
    pub fn new(conn: &'a Connection, tables: &'a Tables) -> Self {
        Self { conn, tables }
    }

    /// Price rows of one model line.
    pub fn price_per_day(&self, params: PricePerDayParams) -> Result<Vec<PriceRow>> {
        self.rows(Some(params.make_id), Some(params.model_id))
    }

    /// Price rows of every model of one make.
    pub fn dataset_by_make(&self, params: MakeParams) -> Result<Vec<PriceRow>> {
        self.rows(Some(params.make_id), None)
    }

    /// Price rows of the whole warehouse.
    pub fn full_dataset(&self) -> Result<Vec<PriceRow>> {
        self.rows(None, None)
    }

    fn rows(&self, make_id: Option<i64>, model_id: Option<i64>) -> Result<Vec<PriceRow>> {
        let t = self.tables;
        let mut qb = SqlBuilder::new(&format!("{} ad", t.price_history()));
        qb.select(&PRICE_ROW_COLUMNS)
            .inner_join(&format!("{} mk", t.make()), "mk.make_id = ad.make_id")
            .inner_join(&format!("{} mo", t.model()), "mo.model_id = ad.model_id")
            .inner_join(&format!("{} km", t.km_class()), "km.km_class_id = ad.km_class_id")
            .inner_join(&format!("{} hp", t.hp_class()), "hp.hp_class_id = ad.hp_class_id")
            .inner_join(
                &format!("{} tt", t.transmission_type()),
                "tt.transmission_type_id = ad.transmission_type_id",
            )
            .inner_join(
                &format!("{} ft", t.fuel_type()),
                "ft.fuel_type_id = ad.fuel_type_id",
            )
            .where_eq_opt("ad.make_id", make_id)
            .where_eq_opt("ad.model_id", model_id)
            .group_by(&["ALL"])
            .order_by(&[
                "\"day\" ASC",
                "make_id ASC",
                "model_id ASC",
                "km_class_id ASC",
                "hp_class_id ASC",
                "\"year\" DESC",
                "transmission_type ASC",
                "fuel_type ASC",
            ]);

        let (sql, params) = qb.build();
        self.conn.execute_into(&sql, &params)
    }
}
