//! Shared test fixtures for the explorer integration tests.
//!
//! `setup_sample_warehouse()` creates an in-memory DuckDB connection populated
//! with small warehouse tables via NDJSON temp files. `FakeSource` is an
//! in-memory `DataSource` that counts calls per query.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use carprice_explorer::models::{Make, Model, PriceRow};
use carprice_explorer::queries::{MakeParams, ModelsParams, PricePerDayParams};
use carprice_explorer::{
    Connection, DataSource, Explorer, ExplorerError, ManualClock, Result, Settings,
};
use chrono::NaiveDate;
use tempfile::NamedTempFile;

pub const AUDI: i64 = 1;
pub const BMW: i64 = 2;
pub const DACIA: i64 = 3;
pub const LADA: i64 = 4;

pub const A4: i64 = 10;
pub const A3: i64 = 11;
pub const X1: i64 = 20;
pub const SANDERO: i64 = 30;

/// Create an in-memory warehouse with makes, models, class tables and price
/// history.
///
/// Audi A4 has two attribute combinations over two days, Audi A3 and BMW X1
/// one row each, Dacia has a model without prices and Lada has no models.
pub fn setup_sample_warehouse() -> Connection {
    let conn = Connection::open_in_memory().unwrap();

    write_ndjson_and_register(
        &conn,
        "make",
        &[
            serde_json::json!({"make_id": AUDI, "name": "Audi"}),
            serde_json::json!({"make_id": BMW, "name": "BMW"}),
            serde_json::json!({"make_id": DACIA, "name": "Dacia"}),
            serde_json::json!({"make_id": LADA, "name": "Lada"}),
        ],
    );

    write_ndjson_and_register(
        &conn,
        "model",
        &[
            serde_json::json!({"model_id": A4, "make_id": AUDI, "name": "A4"}),
            serde_json::json!({"model_id": A3, "make_id": AUDI, "name": "A3"}),
            serde_json::json!({"model_id": X1, "make_id": BMW, "name": "X1"}),
            serde_json::json!({"model_id": SANDERO, "make_id": DACIA, "name": "Sandero"}),
        ],
    );

    // Lexical order of the labels differs from the class order on purpose.
    write_ndjson_and_register(
        &conn,
        "km_class",
        &[
            serde_json::json!({"km_class_id": 1, "name": "0-50k"}),
            serde_json::json!({"km_class_id": 2, "name": "50-100k"}),
            serde_json::json!({"km_class_id": 3, "name": "100k+"}),
        ],
    );

    write_ndjson_and_register(
        &conn,
        "hp_class",
        &[
            serde_json::json!({"hp_class_id": 1, "name": "<100"}),
            serde_json::json!({"hp_class_id": 2, "name": "100-150"}),
            serde_json::json!({"hp_class_id": 3, "name": ">150"}),
        ],
    );

    write_ndjson_and_register(
        &conn,
        "transmission_type",
        &[
            serde_json::json!({"transmission_type_id": 1, "name": "manual"}),
            serde_json::json!({"transmission_type_id": 2, "name": "automatic"}),
        ],
    );

    write_ndjson_and_register(
        &conn,
        "fuel_type",
        &[
            serde_json::json!({"fuel_type_id": 1, "name": "petrol"}),
            serde_json::json!({"fuel_type_id": 2, "name": "diesel"}),
        ],
    );

    let history = vec![
        // Audi A4, 2019, 50-100k, 100-150, manual, petrol (two listings)
        history_row(1, AUDI, A4, 2019, 2, 2, 1, 1, "2024-01-01", 10000),
        history_row(1, AUDI, A4, 2019, 2, 2, 1, 1, "2024-01-02", 9800),
        history_row(3, AUDI, A4, 2019, 2, 2, 1, 1, "2024-01-01", 10400),
        // Audi A4, 2020, 0-50k, >150, automatic, diesel
        history_row(2, AUDI, A4, 2020, 1, 3, 2, 2, "2024-01-01", 11000),
        history_row(2, AUDI, A4, 2020, 1, 3, 2, 2, "2024-01-02", 10800),
        // Audi A3
        history_row(4, AUDI, A3, 2018, 3, 1, 1, 1, "2024-01-01", 9000),
        // BMW X1
        history_row(5, BMW, X1, 2021, 1, 3, 2, 2, "2024-01-01", 30000),
    ];
    write_ndjson_and_register(&conn, "ad_price_history", &history);

    conn
}

#[allow(clippy::too_many_arguments)]
fn history_row(
    ad_id: i64,
    make_id: i64,
    model_id: i64,
    year: i64,
    km: i64,
    hp: i64,
    transmission: i64,
    fuel: i64,
    day: &str,
    price: i64,
) -> serde_json::Value {
    serde_json::json!({
        "ad_id": ad_id,
        "make_id": make_id,
        "model_id": model_id,
        "year_manufactured": year,
        "km_class_id": km,
        "hp_class_id": hp,
        "transmission_type_id": transmission,
        "fuel_type_id": fuel,
        "d": day,
        "p": price
    })
}

/// Build an explorer over the sample warehouse with a manual clock.
pub fn sample_explorer() -> (Explorer, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let explorer = Explorer::builder()
        .connection(setup_sample_warehouse())
        .clock(clock.clone())
        .build()
        .unwrap();
    (explorer, clock)
}

/// Write a slice of JSON values as NDJSON to a temp file and register it
/// as a DuckDB table via `Connection::register_table_from_ndjson`.
pub fn write_ndjson_and_register(conn: &Connection, table_name: &str, rows: &[serde_json::Value]) {
    let mut file = NamedTempFile::new().unwrap();
    for row in rows {
        writeln!(file, "{}", serde_json::to_string(row).unwrap()).unwrap();
    }
    file.flush().unwrap();

    let path = file.path().to_str().unwrap();
    conn.register_table_from_ndjson(table_name, path).unwrap();
    // DuckDB has copied the rows into an in-memory table by now.
}

// ---------------------------------------------------------------------------
// In-memory rows
// ---------------------------------------------------------------------------

pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// A price row with fixed attributes; override fields with struct update.
pub fn row(make_id: i64, model_id: i64, day_str: &str, fuel: &str, price: f64) -> PriceRow {
    PriceRow {
        make_id,
        make: format!("make-{}", make_id),
        model_id,
        model: format!("model-{}", model_id),
        day: day(day_str),
        year: 2020,
        km_class_id: 1,
        km_range: "0-50k".to_string(),
        hp_class_id: 1,
        hp_range: "<100".to_string(),
        transmission_type: "manual".to_string(),
        fuel_type: fuel.to_string(),
        price,
    }
}

// ---------------------------------------------------------------------------
// FakeSource
// ---------------------------------------------------------------------------

/// In-memory data source counting calls per query name.
#[derive(Default)]
pub struct FakeSource {
    pub makes: Vec<Make>,
    pub models: HashMap<i64, Vec<Model>>,
    pub rows: Vec<PriceRow>,
    pub fail: AtomicBool,
    pub calls: parking_lot::Mutex<HashMap<&'static str, usize>>,
    pub total_calls: AtomicUsize,
}

impl FakeSource {
    pub fn calls(&self, query: &str) -> usize {
        self.calls.lock().get(query).copied().unwrap_or(0)
    }

    fn record(&self, query: &'static str) -> Result<()> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        *self.calls.lock().entry(query).or_insert(0) += 1;
        if self.fail.load(Ordering::SeqCst) {
            return Err(ExplorerError::NotFound(format!("{} unavailable", query)));
        }
        Ok(())
    }
}

impl DataSource for FakeSource {
    fn list_makes(&self) -> Result<Vec<Make>> {
        self.record("list_makes")?;
        Ok(self.makes.clone())
    }

    fn list_models(&self, params: ModelsParams) -> Result<Vec<Model>> {
        self.record("list_models")?;
        Ok(self.models.get(&params.make_id).cloned().unwrap_or_default())
    }

    fn price_per_day(&self, params: PricePerDayParams) -> Result<Vec<PriceRow>> {
        self.record("price_per_day")?;
        Ok(self
            .rows
            .iter()
            .filter(|r| r.make_id == params.make_id && r.model_id == params.model_id)
            .cloned()
            .collect())
    }

    fn dataset_by_make(&self, params: MakeParams) -> Result<Vec<PriceRow>> {
        self.record("dataset_by_make")?;
        Ok(self
            .rows
            .iter()
            .filter(|r| r.make_id == params.make_id)
            .cloned()
            .collect())
    }

    fn full_dataset(&self) -> Result<Vec<PriceRow>> {
        self.record("full_dataset")?;
        Ok(self.rows.clone())
    }
}

/// A shared fake source: the explorer owns a boxed handle while the test keeps
/// the `Arc` to inspect call counts.
pub struct SharedSource(pub Arc<FakeSource>);

impl DataSource for SharedSource {
    fn list_makes(&self) -> Result<Vec<Make>> {
        self.0.list_makes()
    }

    fn list_models(&self, params: ModelsParams) -> Result<Vec<Model>> {
        self.0.list_models(params)
    }

    fn price_per_day(&self, params: PricePerDayParams) -> Result<Vec<PriceRow>> {
        self.0.price_per_day(params)
    }

    fn dataset_by_make(&self, params: MakeParams) -> Result<Vec<PriceRow>> {
        self.0.dataset_by_make(params)
    }

    fn full_dataset(&self) -> Result<Vec<PriceRow>> {
        self.0.full_dataset()
    }
}

/// The three-row dataset: make A with models X (petrol, diesel) and Y.
pub fn scenario_source() -> Arc<FakeSource> {
    let mut models = HashMap::new();
    models.insert(
        1,
        vec![
            Model {
                model_id: 100,
                model: "X".to_string(),
            },
            Model {
                model_id: 200,
                model: "Y".to_string(),
            },
        ],
    );
    Arc::new(FakeSource {
        makes: vec![Make {
            make_id: 1,
            make: "A".to_string(),
        }],
        models,
        rows: vec![
            scenario_row(100, "X", "petrol", 10000.0),
            PriceRow {
                year: 2019,
                ..scenario_row(100, "X", "diesel", 11000.0)
            },
            scenario_row(200, "Y", "petrol", 9000.0),
        ],
        ..Default::default()
    })
}

fn scenario_row(model_id: i64, model: &str, fuel: &str, price: f64) -> PriceRow {
    PriceRow {
        make: "A".to_string(),
        model: model.to_string(),
        ..row(1, model_id, "2024-01-01", fuel, price)
    }
}

pub fn fake_explorer(source: Arc<FakeSource>, settings: Settings) -> (Explorer, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let explorer = Explorer::with_clock(Box::new(SharedSource(source)), settings, clock.clone());
    (explorer, clock)
}
