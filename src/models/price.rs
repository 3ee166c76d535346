use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PriceRow — One day of averaged prices for an attribute combination
// ---------------------------------------------------------------------------

/// A price observation already averaged upstream per day and attribute
/// combination. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub make_id: i64,
    pub make: String,
    pub model_id: i64,
    pub model: String,
    pub day: NaiveDate,
    pub year: i32,
    pub km_class_id: i64,
    pub km_range: String,
    pub hp_class_id: i64,
    pub hp_range: String,
    pub transmission_type: String,
    pub fuel_type: String,
    pub price: f64,
}

// ---------------------------------------------------------------------------
// PricePoint — One point of the chart series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub day: NaiveDate,
    pub price: i64,
}

// ---------------------------------------------------------------------------
// Dataset — Rows fetched for one scope
// ---------------------------------------------------------------------------

/// Rows backing the attribute filters, either for one make or for every make.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// `None` for the global dataset.
    pub make_id: Option<i64>,
    pub rows: Vec<PriceRow>,
}

impl Dataset {
    pub fn global(rows: Vec<PriceRow>) -> Self {
        Self {
            make_id: None,
            rows,
        }
    }

    pub fn for_make(make_id: i64, rows: Vec<PriceRow>) -> Self {
        Self {
            make_id: Some(make_id),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
