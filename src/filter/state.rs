//! The dependent-filter state machine.
//!
//! A [`FilterState`] holds one optional value per [`FilterDimension`]. The set
//! dimensions always form a contiguous prefix of the dimension order:
//! transitions are pure and clear everything downstream of the dimension they
//! touch.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ExplorerError, Result};
use crate::filter::{FilterDimension, FilterValue};
use crate::models::PriceRow;

/// What "clear filters" resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearPolicy {
    /// Keep make and model, drop the attribute filters below them.
    #[default]
    KeepVehicle,
    /// Reset every dimension, make included.
    Everything,
}

impl FromStr for ClearPolicy {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep_vehicle" | "keep-vehicle" | "attributes" => Ok(ClearPolicy::KeepVehicle),
            "everything" | "all" => Ok(ClearPolicy::Everything),
            other => Err(ExplorerError::Config(format!(
                "unknown clear policy '{}'",
                other
            ))),
        }
    }
}

/// A user interaction with the selectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterAction {
    Select(FilterDimension, FilterValue),
    Deselect(FilterDimension),
    ClearFilters,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    values: [Option<FilterValue>; FilterDimension::COUNT],
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, dimension: FilterDimension) -> Option<&FilterValue> {
        self.values[dimension.index()].as_ref()
    }

    pub fn is_set(&self, dimension: FilterDimension) -> bool {
        self.values[dimension.index()].is_some()
    }

    /// Number of leading dimensions that are set.
    pub fn set_prefix_len(&self) -> usize {
        self.values.iter().take_while(|v| v.is_some()).count()
    }

    /// The first dimension still waiting for a value.
    pub fn next_unset(&self) -> Option<FilterDimension> {
        FilterDimension::ALL.get(self.set_prefix_len()).copied()
    }

    /// A selector is usable once all its predecessors are set.
    pub fn is_enabled(&self, dimension: FilterDimension) -> bool {
        dimension.predecessors().iter().all(|d| self.is_set(*d))
    }

    pub fn is_empty(&self) -> bool {
        self.set_prefix_len() == 0
    }

    pub fn is_complete(&self) -> bool {
        self.set_prefix_len() == FilterDimension::COUNT
    }

    /// Whether any dimension after make and model is set.
    pub fn attribute_filters_set(&self) -> bool {
        FilterDimension::ALL
            .iter()
            .any(|d| d.is_attribute() && self.is_set(*d))
    }

    pub fn make_id(&self) -> Option<i64> {
        match self.get(FilterDimension::Make) {
            Some(FilterValue::Make { make_id, .. }) => Some(*make_id),
            _ => None,
        }
    }

    pub fn model_id(&self) -> Option<i64> {
        match self.get(FilterDimension::Model) {
            Some(FilterValue::Model { model_id, .. }) => Some(*model_id),
            _ => None,
        }
    }

    /// Set dimensions in order, with their values.
    pub fn iter(&self) -> impl Iterator<Item = (FilterDimension, &FilterValue)> {
        FilterDimension::ALL
            .iter()
            .zip(self.values.iter())
            .filter_map(|(d, v)| v.as_ref().map(|v| (*d, v)))
    }

    // -- Transitions --------------------------------------------------------

    /// Select `value` for `dimension` and clear every later dimension.
    ///
    /// Every predecessor of `dimension` must already be set. Selecting the
    /// make therefore resets the whole state.
    pub fn select(&self, dimension: FilterDimension, value: FilterValue) -> Result<FilterState> {
        if !value.fits(dimension) {
            return Err(ExplorerError::InvalidArgument(format!(
                "value '{}' cannot be selected for {}",
                value, dimension
            )));
        }
        if let Some(missing) = dimension
            .predecessors()
            .iter()
            .find(|d| !self.is_set(**d))
        {
            return Err(ExplorerError::InvalidTransition {
                dimension,
                missing: *missing,
            });
        }

        let mut next = self.clone();
        next.values[dimension.index()] = Some(value);
        next.clear_from(dimension.index() + 1);
        Ok(next)
    }

    /// Clear `dimension` and everything after it.
    pub fn deselect(&self, dimension: FilterDimension) -> FilterState {
        let mut next = self.clone();
        next.clear_from(dimension.index());
        next
    }

    pub fn clear_all(&self, policy: ClearPolicy) -> FilterState {
        match policy {
            ClearPolicy::Everything => FilterState::new(),
            ClearPolicy::KeepVehicle => self.deselect(FilterDimension::KmRange),
        }
    }

    pub fn apply(&self, action: FilterAction, policy: ClearPolicy) -> Result<FilterState> {
        match action {
            FilterAction::Select(dimension, value) => self.select(dimension, value),
            FilterAction::Deselect(dimension) => Ok(self.deselect(dimension)),
            FilterAction::ClearFilters => Ok(self.clear_all(policy)),
        }
    }

    fn clear_from(&mut self, index: usize) {
        for slot in self.values.iter_mut().skip(index) {
            *slot = None;
        }
    }

    // -- Row matching -------------------------------------------------------

    /// Whether `row` matches every set dimension.
    pub fn matches(&self, row: &PriceRow) -> bool {
        self.iter().all(|(d, v)| v.matches(d, row))
    }

    /// Whether `row` matches every set dimension ordered before `dimension`.
    pub fn matches_before(&self, row: &PriceRow, dimension: FilterDimension) -> bool {
        self.iter()
            .take_while(|(d, _)| *d < dimension)
            .all(|(d, v)| v.matches(d, row))
    }
}
