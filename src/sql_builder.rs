//! SQL builder with typed, parameterized query construction.
//!
//! Values always travel as bound [`QueryParam`]s behind `?` placeholders, never
//! through string interpolation. Only table and column identifiers, which come
//! from code and configuration, are spliced into the SQL text.
//!
//! # Example
//!
//! ```rust
//! use carprice_explorer::SqlBuilder;
//! let (sql, params) = SqlBuilder::new("model")
//!     .select(&["model_id", "name AS model"])
//!     .where_eq("make_id", 7)
//!     .order_by(&["model ASC"])
//!     .build();
//! ```

use duckdb::types::ToSqlOutput;
use duckdb::ToSql;

/// A scalar bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    Int(i64),
    Text(String),
}

impl From<i64> for QueryParam {
    fn from(n: i64) -> Self {
        QueryParam::Int(n)
    }
}

impl From<i32> for QueryParam {
    fn from(n: i32) -> Self {
        QueryParam::Int(n.into())
    }
}

impl From<&str> for QueryParam {
    fn from(s: &str) -> Self {
        QueryParam::Text(s.to_string())
    }
}

impl From<String> for QueryParam {
    fn from(s: String) -> Self {
        QueryParam::Text(s)
    }
}

impl ToSql for QueryParam {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        match self {
            QueryParam::Int(n) => n.to_sql(),
            QueryParam::Text(s) => s.to_sql(),
        }
    }
}

/// Builds parameterized SQL queries. Methods return `&mut Self` for chaining.
pub struct SqlBuilder {
    select_cols: Vec<String>,
    is_distinct: bool,
    from_table: String,
    joins: Vec<String>,
    where_clauses: Vec<String>,
    params: Vec<QueryParam>,
    group_by_cols: Vec<String>,
    order_by_cols: Vec<String>,
    limit_val: Option<usize>,
}

impl SqlBuilder {
    /// Create a builder targeting the given table or view.
    pub fn new(table: &str) -> Self {
        Self {
            select_cols: vec!["*".to_string()],
            is_distinct: false,
            from_table: table.to_string(),
            joins: Vec::new(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            group_by_cols: Vec::new(),
            order_by_cols: Vec::new(),
            limit_val: None,
        }
    }

    /// Set the columns to select (replaces the default `*`).
    pub fn select(&mut self, cols: &[&str]) -> &mut Self {
        self.select_cols = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.is_distinct = true;
        self
    }

    /// Add an `INNER JOIN {table} ON {on}`.
    pub fn inner_join(&mut self, table: &str, on: &str) -> &mut Self {
        self.joins.push(format!("INNER JOIN {} ON {}", table, on));
        self
    }

    /// Add an equality condition: `{column} = ?`.
    pub fn where_eq<P: Into<QueryParam>>(&mut self, column: &str, value: P) -> &mut Self {
        self.where_clauses.push(format!("{} = ?", column));
        self.params.push(value.into());
        self
    }

    /// Add an equality condition only when a value is present.
    pub fn where_eq_opt<P: Into<QueryParam>>(
        &mut self,
        column: &str,
        value: Option<P>,
    ) -> &mut Self {
        if let Some(v) = value {
            self.where_eq(column, v);
        }
        self
    }

    pub fn group_by(&mut self, cols: &[&str]) -> &mut Self {
        self.group_by_cols.extend(cols.iter().map(|c| c.to_string()));
        self
    }

    /// Add ORDER BY clauses (e.g. `"day ASC"`).
    pub fn order_by(&mut self, clauses: &[&str]) -> &mut Self {
        self.order_by_cols.extend(clauses.iter().map(|c| c.to_string()));
        self
    }

    pub fn limit(&mut self, n: usize) -> &mut Self {
        self.limit_val = Some(n);
        self
    }

    /// Build the final SQL string and parameter list.
    pub fn build(&self) -> (String, Vec<QueryParam>) {
        let distinct = if self.is_distinct { "DISTINCT " } else { "" };
        let mut parts = vec![
            format!("SELECT {}{}", distinct, self.select_cols.join(", ")),
            format!("FROM {}", self.from_table),
        ];

        parts.extend(self.joins.iter().cloned());

        if !self.where_clauses.is_empty() {
            parts.push(format!("WHERE {}", self.where_clauses.join(" AND ")));
        }

        if !self.group_by_cols.is_empty() {
            parts.push(format!("GROUP BY {}", self.group_by_cols.join(", ")));
        }

        if !self.order_by_cols.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by_cols.join(", ")));
        }

        if let Some(n) = self.limit_val {
            parts.push(format!("LIMIT {}", n));
        }

        (parts.join("\n"), self.params.clone())
    }
}
