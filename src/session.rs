//! Dashboard view model and per-user sessions.
//!
//! A render pass walks the dimensions in order: makes come from the catalog,
//! models from the selected make, attribute options from the scoped dataset.
//! The first empty stage produces a [`Notice`] and leaves every later selector
//! disabled.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::aggregate::{self, YDomain};
use crate::error::{ExplorerError, Result};
use crate::filter::{
    self, FilterAction, FilterDimension, FilterOption, FilterState, FilterValue, OptionSet,
};
use crate::models::PricePoint;
use crate::Explorer;

// ---------------------------------------------------------------------------
// View model
// ---------------------------------------------------------------------------

/// One dependent selector control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorView {
    pub dimension: FilterDimension,
    /// False until every preceding dimension is selected.
    pub enabled: bool,
    pub options: OptionSet,
    pub selected: Option<FilterValue>,
}

impl SelectorView {
    fn disabled(dimension: FilterDimension, selected: Option<FilterValue>) -> Self {
        Self {
            dimension,
            enabled: false,
            options: OptionSet::empty(dimension),
            selected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartView {
    pub points: Vec<PricePoint>,
    pub y_domain: YDomain,
}

/// Why the pipeline stopped early. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    NoMakes,
    NoModels,
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    /// One selector per dimension, in dimension order.
    pub selectors: Vec<SelectorView>,
    pub chart: Option<ChartView>,
    pub notice: Option<Notice>,
}

impl DashboardView {
    pub fn selector(&self, dimension: FilterDimension) -> &SelectorView {
        &self.selectors[dimension.index()]
    }

    fn set_options(&mut self, dimension: FilterDimension, options: OptionSet) {
        let selector = &mut self.selectors[dimension.index()];
        selector.enabled = true;
        selector.options = options;
    }
}

pub(crate) fn render(explorer: &Explorer, state: &FilterState) -> Result<DashboardView> {
    let mut view = DashboardView {
        selectors: FilterDimension::ALL
            .iter()
            .map(|d| SelectorView::disabled(*d, state.get(*d).cloned()))
            .collect(),
        chart: None,
        notice: None,
    };

    let makes = explorer.makes()?;
    view.set_options(
        FilterDimension::Make,
        catalog_options(FilterDimension::Make, makes.iter().map(FilterValue::from)),
    );
    if makes.is_empty() {
        view.notice = Some(Notice::NoMakes);
        return Ok(view);
    }

    let Some(make_id) = state.make_id() else {
        return Ok(view);
    };
    let models = explorer.models(make_id)?;
    view.set_options(
        FilterDimension::Model,
        catalog_options(FilterDimension::Model, models.iter().map(FilterValue::from)),
    );
    if models.is_empty() {
        view.notice = Some(Notice::NoModels);
        return Ok(view);
    }

    if !state.is_set(FilterDimension::Model) {
        return Ok(view);
    }
    let dataset = explorer.dataset_for_make(make_id)?;

    for dimension in FilterDimension::ALL.iter().filter(|d| d.is_attribute()) {
        if !state.is_enabled(*dimension) {
            break;
        }
        let options = filter::options_for(&dataset, state, *dimension);
        if options.is_empty() {
            view.notice = Some(Notice::NoData);
            return Ok(view);
        }
        view.set_options(*dimension, options);
    }

    let points = filter::selection(&dataset, state).points();
    match aggregate::y_domain(&points, explorer.settings().price_margin) {
        Some(y_domain) => view.chart = Some(ChartView { points, y_domain }),
        None => view.notice = Some(Notice::NoData),
    }
    Ok(view)
}

fn catalog_options<I>(dimension: FilterDimension, values: I) -> OptionSet
where
    I: Iterator<Item = FilterValue>,
{
    OptionSet {
        dimension,
        options: values.map(FilterOption::from).collect(),
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One user's walk through the filters.
///
/// Holds the current [`FilterState`] and re-renders after every action. A data
/// source failure halts the session: later renders return
/// [`ExplorerError::SessionHalted`]. Timeouts are retryable and do not halt.
pub struct Session<'a> {
    explorer: &'a Explorer,
    state: FilterState,
    halted: Option<String>,
}

impl<'a> Session<'a> {
    pub fn new(explorer: &'a Explorer) -> Self {
        Self {
            explorer,
            state: FilterState::new(),
            halted: None,
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    /// Apply an action and render the resulting state.
    ///
    /// An illegal transition leaves the state untouched.
    pub fn apply(&mut self, action: FilterAction) -> Result<DashboardView> {
        if let Some(reason) = &self.halted {
            return Err(ExplorerError::SessionHalted(reason.clone()));
        }

        let next = self
            .state
            .apply(action, self.explorer.settings().clear_policy)?;
        if next.make_id() != self.state.make_id() {
            debug!(
                from = ?self.state.make_id(),
                to = ?next.make_id(),
                "make changed; dataset scope switches"
            );
        }
        self.state = next;
        self.render()
    }

    pub fn select(
        &mut self,
        dimension: FilterDimension,
        value: FilterValue,
    ) -> Result<DashboardView> {
        self.apply(FilterAction::Select(dimension, value))
    }

    pub fn deselect(&mut self, dimension: FilterDimension) -> Result<DashboardView> {
        self.apply(FilterAction::Deselect(dimension))
    }

    pub fn clear_filters(&mut self) -> Result<DashboardView> {
        self.apply(FilterAction::ClearFilters)
    }

    /// Render the current state.
    pub fn render(&mut self) -> Result<DashboardView> {
        if let Some(reason) = &self.halted {
            return Err(ExplorerError::SessionHalted(reason.clone()));
        }

        match self.explorer.render(&self.state) {
            Ok(view) => Ok(view),
            Err(e) if e.is_retryable() => Err(e),
            Err(e) => {
                warn!(error = %e, "data source failure; halting session");
                self.halted = Some(e.to_string());
                Err(e)
            }
        }
    }
}
