//! # Table queries
//!
//! [`Query`] describes one read against a table of the hosted database and renders
//! it into the query-string form the REST endpoint understands:
//!
//! | Builder call | Rendered pair |
//! |--------------|---------------|
//! | `select("id,full_name")` | `select=id,full_name` |
//! | `eq("status", "active")` | `status=eq.active` |
//! | `gt("start_time", ts)` | `start_time=gt.<ts>` |
//! | `is_null("user_id")` | `user_id=is.null` |
//! | `in_list("year", [2025, 2026])` | `year=in.(2025,2026)` |
//! | `any_of(["user_id.eq.X", "user_id.is.null"])` | `or=(user_id.eq.X,user_id.is.null)` |
//! | `order("created_at", Descending)` | `order=created_at.desc` |
//! | `limit(5)` | `limit=5` |
//!
//! Building a query never touches the network; [`crate::BackendClient`] executes it.

use std::fmt::Display;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    fn as_str(&self) -> &'static str {
        match self {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    table: String,
    select: String,
    filters: Vec<(String, String)>,
    order: Vec<String>,
    limit: Option<usize>,
}

impl Query {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            select: "*".to_string(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = columns.into();
        self
    }

    fn filter(mut self, column: &str, op: &str, value: impl Display) -> Self {
        self.filters.push((column.to_string(), format!("{op}.{value}")));
        self
    }

    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "eq", value)
    }

    pub fn neq(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "neq", value)
    }

    pub fn gt(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "gt", value)
    }

    pub fn gte(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "gte", value)
    }

    pub fn lt(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "lt", value)
    }

    pub fn lte(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "lte", value)
    }

    pub fn is_null(self, column: &str) -> Self {
        self.filter(column, "is", "null")
    }

    pub fn in_list<V: Display>(self, column: &str, values: impl IntoIterator<Item = V>) -> Self {
        let joined = values
            .into_iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.filter(column, "in", format!("({joined})"))
    }

    /// Match rows satisfying any of the raw `column.op.value` conditions.
    pub fn any_of<S: AsRef<str>>(mut self, conditions: impl IntoIterator<Item = S>) -> Self {
        let joined = conditions
            .into_iter()
            .map(|c| c.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.filters.push(("or".to_string(), format!("({joined})")));
        self
    }

    pub fn order(mut self, column: &str, direction: Direction) -> Self {
        self.order.push(format!("{column}.{}", direction.as_str()));
        self
    }

    /// Like [`order`](Self::order) with NULLs sorted after every value.
    pub fn order_nulls_last(mut self, column: &str, direction: Direction) -> Self {
        self.order.push(format!("{column}.{}.nullslast", direction.as_str()));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// Query-string pairs, in builder order.
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.select.clone())];
        params.extend(self.filters.iter().cloned());
        if !self.order.is_empty() {
            params.push(("order".to_string(), self.order.join(",")));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

/// Total row count from a `Content-Range` header such as `0-24/573` or `*/0`.
pub fn parse_content_range(value: &str) -> Option<usize> {
    let (_, total) = value.rsplit_once('/')?;
    total.trim().parse().ok()
}
