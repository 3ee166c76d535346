use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ExplorerError, Result};
use crate::filter::ClearPolicy;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_PRICE_MARGIN: f64 = 0.1;
pub const DEFAULT_SCHEMA: &str = "main";

pub const ENV_DATABASE: &str = "CARPRICE_DATABASE";
pub const ENV_SCHEMA: &str = "CARPRICE_SCHEMA";
pub const ENV_CACHE_TTL_SECS: &str = "CARPRICE_CACHE_TTL_SECS";
pub const ENV_QUERY_TIMEOUT_SECS: &str = "CARPRICE_QUERY_TIMEOUT_SECS";
pub const ENV_PRICE_MARGIN: &str = "CARPRICE_PRICE_MARGIN";
pub const ENV_CLEAR_POLICY: &str = "CARPRICE_CLEAR_POLICY";
pub const ENV_SCOPE: &str = "CARPRICE_SCOPE";

/// Logical warehouse tables, in the order they are joined into price rows.
pub const WAREHOUSE_TABLES: [&str; 7] = [
    "make",
    "model",
    "km_class",
    "hp_class",
    "transmission_type",
    "fuel_type",
    "ad_price_history",
];

/// Which dataset backs the attribute filters once a make is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatasetScope {
    /// Fetch one dataset per make (dataset-by-make query).
    #[default]
    ByMake,
    /// Fetch the full dataset once and filter the make in memory.
    Global,
}

impl FromStr for DatasetScope {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "make" | "by_make" | "by-make" => Ok(DatasetScope::ByMake),
            "global" | "full" => Ok(DatasetScope::Global),
            other => Err(ExplorerError::Config(format!(
                "unknown dataset scope '{}'",
                other
            ))),
        }
    }
}

/// Table names qualified with the configured schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tables {
    schema: String,
}

impl Tables {
    /// Qualify tables with `schema`.
    ///
    /// The schema is spliced into SQL text, so only identifier characters
    /// are accepted.
    pub fn new(schema: &str) -> Result<Self> {
        let valid = !schema.is_empty()
            && schema
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(ExplorerError::Config(format!(
                "invalid schema name '{}'",
                schema
            )));
        }
        Ok(Self {
            schema: schema.to_string(),
        })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn qualified(&self, table: &str) -> String {
        format!("{}.{}", self.schema, table)
    }

    pub fn make(&self) -> String {
        self.qualified("make")
    }

    pub fn model(&self) -> String {
        self.qualified("model")
    }

    pub fn km_class(&self) -> String {
        self.qualified("km_class")
    }

    pub fn hp_class(&self) -> String {
        self.qualified("hp_class")
    }

    pub fn transmission_type(&self) -> String {
        self.qualified("transmission_type")
    }

    pub fn fuel_type(&self) -> String {
        self.qualified("fuel_type")
    }

    pub fn price_history(&self) -> String {
        self.qualified("ad_price_history")
    }
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            schema: DEFAULT_SCHEMA.to_string(),
        }
    }
}

/// Runtime settings, usually read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// DuckDB database file. `None` opens an in-memory database.
    pub database: Option<PathBuf>,
    pub schema: String,
    pub cache_ttl: Duration,
    pub query_timeout: Duration,
    /// Fraction of the price spread added above and below the chart's y-axis.
    pub price_margin: f64,
    pub clear_policy: ClearPolicy,
    pub scope: DatasetScope,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: Some(default_database_path()),
            schema: DEFAULT_SCHEMA.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            price_margin: DEFAULT_PRICE_MARGIN,
            clear_policy: ClearPolicy::default(),
            scope: DatasetScope::default(),
        }
    }
}

impl Settings {
    /// Read settings from `CARPRICE_*` environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(db) = lookup(ENV_DATABASE) {
            settings.database = match db.trim() {
                "" | ":memory:" => None,
                path => Some(PathBuf::from(path)),
            };
        }
        if let Some(schema) = lookup(ENV_SCHEMA) {
            Tables::new(schema.trim())?;
            settings.schema = schema.trim().to_string();
        }
        if let Some(secs) = lookup(ENV_CACHE_TTL_SECS) {
            settings.cache_ttl = Duration::from_secs(parse_var(ENV_CACHE_TTL_SECS, &secs)?);
        }
        if let Some(secs) = lookup(ENV_QUERY_TIMEOUT_SECS) {
            settings.query_timeout =
                Duration::from_secs(parse_var(ENV_QUERY_TIMEOUT_SECS, &secs)?);
        }
        if let Some(margin) = lookup(ENV_PRICE_MARGIN) {
            let k: f64 = parse_var(ENV_PRICE_MARGIN, &margin)?;
            if !(k.is_finite() && k >= 0.0) {
                return Err(ExplorerError::Config(format!(
                    "{} must be a non-negative number, got {}",
                    ENV_PRICE_MARGIN, margin
                )));
            }
            settings.price_margin = k;
        }
        if let Some(policy) = lookup(ENV_CLEAR_POLICY) {
            settings.clear_policy = policy.parse()?;
        }
        if let Some(scope) = lookup(ENV_SCOPE) {
            settings.scope = scope.parse()?;
        }

        Ok(settings)
    }

    pub fn tables(&self) -> Result<Tables> {
        Tables::new(&self.schema)
    }
}

fn parse_var<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| ExplorerError::Config(format!("cannot parse {}='{}'", name, raw)))
}

pub fn default_database_path() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("carprice-explorer").join("warehouse.duckdb")
    } else {
        PathBuf::from(".carprice-explorer").join("warehouse.duckdb")
    }
}
