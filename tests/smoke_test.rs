//! Smoke test against a real warehouse.
//!
//! Reads `CARPRICE_*` from the environment, checks the schema, then walks every
//! selector by picking its first option and reports what each step shows.
//!
//! Run with:
//! ```sh
//! CARPRICE_DATABASE=/path/to/warehouse.duckdb cargo test -- --ignored --nocapture
//! ```

use carprice_explorer::{ExplorerBuilder, FilterDimension};

/// Print a section header to stderr.
fn section(name: &str) {
    eprintln!("\n{}", "=".repeat(60));
    eprintln!("  {}", name);
    eprintln!("{}", "=".repeat(60));
}

/// Counters for pass/fail reporting.
struct Counters {
    pass: usize,
    fail: usize,
}

impl Counters {
    fn new() -> Self {
        Self { pass: 0, fail: 0 }
    }

    fn check(&mut self, label: &str, condition: bool, detail: &str) {
        let status = if condition { "PASS" } else { "FAIL" };
        if condition {
            self.pass += 1;
        } else {
            self.fail += 1;
        }
        if detail.is_empty() {
            eprintln!("  [{}] {}", status, label);
        } else {
            eprintln!("  [{}] {} -- {}", status, label, detail);
        }
    }
}

#[test]
#[ignore]
fn smoke_test() {
    let mut c = Counters::new();

    section("Open warehouse");
    let explorer = ExplorerBuilder::from_env()
        .expect("read CARPRICE_* settings")
        .verify_schema(true)
        .build()
        .expect("open warehouse");
    eprintln!("  {}", explorer);

    section("Walk selectors");
    let mut session = explorer.session();
    let mut view = session.render().expect("initial render");
    for dimension in FilterDimension::ALL {
        let selector = view.selector(dimension);
        c.check(
            &format!("{} enabled", dimension),
            selector.enabled,
            &format!("{} options", selector.options.len()),
        );
        let Some(first) = selector.options.options.first() else {
            eprintln!("  stopping at {}: notice {:?}", dimension, view.notice);
            break;
        };
        let value = first.value.clone();
        eprintln!("  select {} = {}", dimension, first.label);
        view = session.select(dimension, value).expect("select");

        let points = view.chart.as_ref().map(|ch| ch.points.len()).unwrap_or(0);
        if dimension >= FilterDimension::Model {
            c.check(
                &format!("chart after {}", dimension),
                view.chart.is_some() || view.notice.is_some(),
                &format!("{} points", points),
            );
        }
    }

    section("Cache");
    let before = explorer.cached_entries();
    session.render().expect("cached render");
    c.check(
        "re-render adds no entries",
        explorer.cached_entries() == before,
        &format!("{} entries", before),
    );

    section("Summary");
    eprintln!("  PASS: {}  FAIL: {}", c.pass, c.fail);
    assert_eq!(c.fail, 0, "{} checks failed", c.fail);
}
