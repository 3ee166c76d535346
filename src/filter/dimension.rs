use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{Make, Model, PriceRow};

// ---------------------------------------------------------------------------
// FilterDimension
// ---------------------------------------------------------------------------

/// The ordered filter stages. A dimension can only be selected once every
/// dimension before it is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterDimension {
    Make,
    Model,
    KmRange,
    Year,
    HpRange,
    Transmission,
    FuelType,
}

impl FilterDimension {
    /// Every dimension, in selection order.
    pub const ALL: [FilterDimension; 7] = [
        FilterDimension::Make,
        FilterDimension::Model,
        FilterDimension::KmRange,
        FilterDimension::Year,
        FilterDimension::HpRange,
        FilterDimension::Transmission,
        FilterDimension::FuelType,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Position in [`ALL`](Self::ALL).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Dimensions that must be set before this one.
    pub fn predecessors(self) -> &'static [FilterDimension] {
        &Self::ALL[..self.index()]
    }

    /// Dimensions cleared when this one changes.
    pub fn successors(self) -> &'static [FilterDimension] {
        &Self::ALL[self.index() + 1..]
    }

    pub fn previous(self) -> Option<FilterDimension> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    /// Attribute dimensions come after make and model and narrow the price rows
    /// of one model line.
    pub fn is_attribute(self) -> bool {
        self > FilterDimension::Model
    }

    /// Column name of the dimension's value in a price row.
    pub fn column(self) -> &'static str {
        match self {
            FilterDimension::Make => "make",
            FilterDimension::Model => "model",
            FilterDimension::KmRange => "km_range",
            FilterDimension::Year => "year",
            FilterDimension::HpRange => "hp_range",
            FilterDimension::Transmission => "transmission_type",
            FilterDimension::FuelType => "fuel_type",
        }
    }

    /// Ordinal class id of the row's value, for bucketed dimensions.
    pub fn ordinal(self, row: &PriceRow) -> Option<i64> {
        match self {
            FilterDimension::KmRange => Some(row.km_class_id),
            FilterDimension::HpRange => Some(row.hp_class_id),
            _ => None,
        }
    }
}

impl fmt::Display for FilterDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// FilterValue
// ---------------------------------------------------------------------------

/// A selected value. Make and model carry their ids; the remaining
/// dimensions compare by label, except the year.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterValue {
    Make { make_id: i64, make: String },
    Model { model_id: i64, model: String },
    Label(String),
    Year(i32),
}

impl FilterValue {
    pub fn label(&self) -> String {
        match self {
            FilterValue::Make { make, .. } => make.clone(),
            FilterValue::Model { model, .. } => model.clone(),
            FilterValue::Label(label) => label.clone(),
            FilterValue::Year(year) => year.to_string(),
        }
    }

    /// Whether this kind of value can be selected into `dimension`.
    pub fn fits(&self, dimension: FilterDimension) -> bool {
        matches!(
            (dimension, self),
            (FilterDimension::Make, FilterValue::Make { .. })
                | (FilterDimension::Model, FilterValue::Model { .. })
                | (FilterDimension::Year, FilterValue::Year(_))
                | (FilterDimension::KmRange, FilterValue::Label(_))
                | (FilterDimension::HpRange, FilterValue::Label(_))
                | (FilterDimension::Transmission, FilterValue::Label(_))
                | (FilterDimension::FuelType, FilterValue::Label(_))
        )
    }

    /// Equality match of this value against the row's field for `dimension`.
    pub fn matches(&self, dimension: FilterDimension, row: &PriceRow) -> bool {
        match (dimension, self) {
            (FilterDimension::Make, FilterValue::Make { make_id, .. }) => row.make_id == *make_id,
            (FilterDimension::Model, FilterValue::Model { model_id, .. }) => {
                row.model_id == *model_id
            }
            (FilterDimension::KmRange, FilterValue::Label(l)) => row.km_range == *l,
            (FilterDimension::Year, FilterValue::Year(y)) => row.year == *y,
            (FilterDimension::HpRange, FilterValue::Label(l)) => row.hp_range == *l,
            (FilterDimension::Transmission, FilterValue::Label(l)) => row.transmission_type == *l,
            (FilterDimension::FuelType, FilterValue::Label(l)) => row.fuel_type == *l,
            _ => false,
        }
    }

    /// Project the row's value for `dimension`.
    pub fn from_row(dimension: FilterDimension, row: &PriceRow) -> FilterValue {
        match dimension {
            FilterDimension::Make => FilterValue::Make {
                make_id: row.make_id,
                make: row.make.clone(),
            },
            FilterDimension::Model => FilterValue::Model {
                model_id: row.model_id,
                model: row.model.clone(),
            },
            FilterDimension::KmRange => FilterValue::Label(row.km_range.clone()),
            FilterDimension::Year => FilterValue::Year(row.year),
            FilterDimension::HpRange => FilterValue::Label(row.hp_range.clone()),
            FilterDimension::Transmission => FilterValue::Label(row.transmission_type.clone()),
            FilterDimension::FuelType => FilterValue::Label(row.fuel_type.clone()),
        }
    }

    pub fn label_of<S: Into<String>>(label: S) -> FilterValue {
        FilterValue::Label(label.into())
    }
}

impl From<Make> for FilterValue {
    fn from(m: Make) -> Self {
        FilterValue::Make {
            make_id: m.make_id,
            make: m.make,
        }
    }
}

impl From<&Make> for FilterValue {
    fn from(m: &Make) -> Self {
        m.clone().into()
    }
}

impl From<Model> for FilterValue {
    fn from(m: Model) -> Self {
        FilterValue::Model {
            model_id: m.model_id,
            model: m.model,
        }
    }
}

impl From<&Model> for FilterValue {
    fn from(m: &Model) -> Self {
        m.clone().into()
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
