//! Warehouse queries.
//!
//! Each logical query is a [`WarehouseQuery`] variant carrying its typed
//! parameters; the variant also names the query's cache identity. The SQL for
//! the variants lives in borrowing query wrappers over a
//! [`Connection`](crate::connection::Connection), one per table family.

pub mod catalog;
pub mod prices;

pub use catalog::CatalogQuery;
pub use prices::PriceQuery;

use serde::{Deserialize, Serialize};

use crate::cache::CacheKey;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Parameters of the list-models query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelsParams {
    pub make_id: i64,
}

/// Parameters of the price-per-day query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PricePerDayParams {
    pub make_id: i64,
    pub model_id: i64,
}

/// Parameters of the dataset-by-make query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MakeParams {
    pub make_id: i64,
}

// ---------------------------------------------------------------------------
// WarehouseQuery
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarehouseQuery {
    ListMakes,
    ListModels(ModelsParams),
    PricePerDay(PricePerDayParams),
    DatasetByMake(MakeParams),
    FullDataset,
}

impl WarehouseQuery {
    pub fn name(&self) -> &'static str {
        match self {
            WarehouseQuery::ListMakes => "list_makes",
            WarehouseQuery::ListModels(_) => "list_models",
            WarehouseQuery::PricePerDay(_) => "price_per_day",
            WarehouseQuery::DatasetByMake(_) => "dataset_by_make",
            WarehouseQuery::FullDataset => "full_dataset",
        }
    }

    /// Parameter values in binding order.
    pub fn params(&self) -> Vec<i64> {
        match self {
            WarehouseQuery::ListMakes | WarehouseQuery::FullDataset => Vec::new(),
            WarehouseQuery::ListModels(p) => vec![p.make_id],
            WarehouseQuery::PricePerDay(p) => vec![p.make_id, p.model_id],
            WarehouseQuery::DatasetByMake(p) => vec![p.make_id],
        }
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.name(), &self.params())
    }
}
