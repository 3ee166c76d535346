//! Unit tests for the SqlBuilder query construction.

use carprice_explorer::{QueryParam, SqlBuilder};

// ---------------------------------------------------------------------------
// Basic construction
// ---------------------------------------------------------------------------

#[test]
fn new_creates_select_star_from_table() {
    let (sql, params) = SqlBuilder::new("make").build();
    assert_eq!(sql, "SELECT *\nFROM make");
    assert!(params.is_empty());
}

#[test]
fn select_replaces_default_star() {
    let (sql, _) = SqlBuilder::new("make")
        .select(&["make_id", "name AS make"])
        .build();
    assert!(sql.starts_with("SELECT make_id, name AS make\n"));
}

#[test]
fn distinct_is_placed_after_select() {
    let (sql, _) = SqlBuilder::new("model")
        .distinct()
        .select(&["model_id"])
        .build();
    assert!(sql.starts_with("SELECT DISTINCT model_id\n"));
}

// ---------------------------------------------------------------------------
// Joins and WHERE conditions
// ---------------------------------------------------------------------------

#[test]
fn inner_join_follows_from_clause() {
    let (sql, _) = SqlBuilder::new("ad_price_history ad")
        .inner_join("make mk", "mk.make_id = ad.make_id")
        .inner_join("model mo", "mo.model_id = ad.model_id")
        .build();
    assert_eq!(
        sql,
        "SELECT *\nFROM ad_price_history ad\n\
         INNER JOIN make mk ON mk.make_id = ad.make_id\n\
         INNER JOIN model mo ON mo.model_id = ad.model_id"
    );
}

#[test]
fn where_eq_binds_typed_params() {
    let (sql, params) = SqlBuilder::new("model")
        .where_eq("make_id", 7)
        .where_eq("name", "A4")
        .build();
    assert!(sql.contains("WHERE make_id = ? AND name = ?"));
    assert_eq!(
        params,
        vec![QueryParam::Int(7), QueryParam::Text("A4".to_string())]
    );
}

#[test]
fn where_eq_opt_skips_missing_values() {
    let (sql, params) = SqlBuilder::new("ad_price_history")
        .where_eq_opt("make_id", Some(1_i64))
        .where_eq_opt::<i64>("model_id", None)
        .build();
    assert!(sql.contains("WHERE make_id = ?"));
    assert!(!sql.contains("model_id"));
    assert_eq!(params, vec![QueryParam::Int(1)]);
}

#[test]
fn values_never_appear_in_sql_text() {
    let (sql, params) = SqlBuilder::new("make")
        .where_eq("name", "x'; DROP TABLE make; --")
        .build();
    assert!(!sql.contains("DROP"));
    assert_eq!(params.len(), 1);
}

// ---------------------------------------------------------------------------
// GROUP BY / ORDER BY / LIMIT
// ---------------------------------------------------------------------------

#[test]
fn clauses_are_emitted_in_sql_order() {
    let (sql, _) = SqlBuilder::new("ad_price_history")
        .select(&["d", "AVG(p) AS price"])
        .where_eq("make_id", 1)
        .group_by(&["d"])
        .order_by(&["d ASC"])
        .limit(10)
        .build();
    assert_eq!(
        sql,
        "SELECT d, AVG(p) AS price\nFROM ad_price_history\nWHERE make_id = ?\n\
         GROUP BY d\nORDER BY d ASC\nLIMIT 10"
    );
}

#[test]
fn order_by_accumulates_across_calls() {
    let (sql, _) = SqlBuilder::new("model")
        .order_by(&["model ASC"])
        .order_by(&["model_id ASC"])
        .build();
    assert!(sql.ends_with("ORDER BY model ASC, model_id ASC"));
}

#[test]
fn query_param_conversions() {
    assert_eq!(QueryParam::from(3_i32), QueryParam::Int(3));
    assert_eq!(QueryParam::from(3_i64), QueryParam::Int(3));
    assert_eq!(
        QueryParam::from(String::from("diesel")),
        QueryParam::Text("diesel".to_string())
    );
}
