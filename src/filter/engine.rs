//! In-memory filtering of a [`Dataset`] against a [`FilterState`].

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::aggregate;
use crate::filter::{FilterDimension, FilterState, FilterValue};
use crate::models::{Dataset, PricePoint, PriceRow};

// ---------------------------------------------------------------------------
// OptionSet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub value: FilterValue,
    pub label: String,
}

impl From<FilterValue> for FilterOption {
    fn from(value: FilterValue) -> Self {
        Self {
            label: value.label(),
            value,
        }
    }
}

/// The distinct choices for one dimension, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSet {
    pub dimension: FilterDimension,
    pub options: Vec<FilterOption>,
}

impl OptionSet {
    pub fn empty(dimension: FilterDimension) -> Self {
        Self {
            dimension,
            options: Vec::new(),
        }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.label.as_str()).collect()
    }

    /// Look up the value behind a displayed label.
    pub fn find(&self, label: &str) -> Option<&FilterValue> {
        self.options
            .iter()
            .find(|o| o.label == label)
            .map(|o| &o.value)
    }

    pub fn contains(&self, value: &FilterValue) -> bool {
        self.options.iter().any(|o| &o.value == value)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Distinct values of `dimension` among the rows that match every selection
/// made before it.
///
/// Bucketed ranges sort by their class id, years newest first, everything else
/// by label.
pub fn options_for(dataset: &Dataset, state: &FilterState, dimension: FilterDimension) -> OptionSet {
    let mut seen: HashSet<FilterValue> = HashSet::new();
    let mut found: Vec<(Option<i64>, FilterValue)> = Vec::new();

    for row in dataset
        .rows
        .iter()
        .filter(|r| state.matches_before(r, dimension))
    {
        let value = FilterValue::from_row(dimension, row);
        if seen.insert(value.clone()) {
            found.push((dimension.ordinal(row), value));
        }
    }

    found.sort_by(|(a_ord, a), (b_ord, b)| compare_options(dimension, (*a_ord, a), (*b_ord, b)));

    OptionSet {
        dimension,
        options: found.into_iter().map(|(_, v)| v.into()).collect(),
    }
}

fn compare_options(
    dimension: FilterDimension,
    a: (Option<i64>, &FilterValue),
    b: (Option<i64>, &FilterValue),
) -> Ordering {
    match (dimension, a.1, b.1) {
        (FilterDimension::Year, FilterValue::Year(ya), FilterValue::Year(yb)) => yb.cmp(ya),
        (FilterDimension::KmRange | FilterDimension::HpRange, _, _) => a
            .0
            .cmp(&b.0)
            .then_with(|| a.1.label().cmp(&b.1.label())),
        _ => a.1.label().cmp(&b.1.label()),
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// Rows matching every set dimension. Unset dimensions impose no constraint.
pub fn filtered_rows(dataset: &Dataset, state: &FilterState) -> Vec<PriceRow> {
    dataset
        .rows
        .iter()
        .filter(|r| state.matches(r))
        .cloned()
        .collect()
}

/// What the chart shows for the current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// At least one attribute filter is set: the matching rows.
    Rows(Vec<PriceRow>),
    /// No attribute filter: one averaged point per day across all matching rows.
    DailyAverage(Vec<PricePoint>),
    /// Nothing matches the current selection.
    Empty,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::Empty)
    }

    /// The day-ordered price series to plot.
    pub fn points(&self) -> Vec<PricePoint> {
        match self {
            Selection::Rows(rows) => aggregate::daily_average(rows),
            Selection::DailyAverage(points) => points.clone(),
            Selection::Empty => Vec::new(),
        }
    }
}

pub fn selection(dataset: &Dataset, state: &FilterState) -> Selection {
    let rows = filtered_rows(dataset, state);
    if rows.is_empty() {
        Selection::Empty
    } else if state.attribute_filters_set() {
        Selection::Rows(rows)
    } else {
        Selection::DailyAverage(aggregate::daily_average(&rows))
    }
}
