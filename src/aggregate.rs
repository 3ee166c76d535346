//! Daily price aggregation for the chart.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{PricePoint, PriceRow};

/// Group rows by day and average their prices.
///
/// Means are truncated to whole currency units; points come back in ascending
/// day order.
pub fn daily_average(rows: &[PriceRow]) -> Vec<PricePoint> {
    let mut by_day: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for row in rows {
        let slot = by_day.entry(row.day).or_insert((0.0, 0));
        slot.0 += row.price;
        slot.1 += 1;
    }

    by_day
        .into_iter()
        .map(|(day, (sum, count))| PricePoint {
            day,
            price: (sum / count as f64) as i64,
        })
        .collect()
}

/// Y-axis bounds of the chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YDomain {
    pub lower: f64,
    pub upper: f64,
}

/// `[min - m, max + m]` with `m = (max - min) * margin`. `None` for an empty
/// series.
pub fn y_domain(points: &[PricePoint], margin: f64) -> Option<YDomain> {
    let min = points.iter().map(|p| p.price).min()? as f64;
    let max = points.iter().map(|p| p.price).max()? as f64;
    let m = (max - min) * margin;
    Some(YDomain {
        lower: min - m,
        upper: max + m,
    })
}
