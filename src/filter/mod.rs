//! Dependent filter dimensions, the selection state machine, and the
//! in-memory engine that turns a dataset plus a state into options and rows.

pub mod dimension;
pub mod engine;
pub mod state;

pub use dimension::{FilterDimension, FilterValue};
pub use engine::{filtered_rows, options_for, selection, FilterOption, OptionSet, Selection};
pub use state::{ClearPolicy, FilterAction, FilterState};
