use std::fmt::Display;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// Equality filters, ordering and limit of a single table operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Select {
    pub filters: Vec<(String, String)>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Select {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.filters.push((column.to_string(), value.to_string()));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Renders the query string understood by PostgREST.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![("select".to_string(), "*".to_string())];

        for (column, value) in &self.filters {
            query.push((column.clone(), format!("eq.{value}")));
        }

        if let Some(order) = &self.order {
            let direction = if order.ascending { "asc" } else { "desc" };

            let order = format!("{}.{direction}", order.column);

            query.push(("order".to_string(), order));
        }

        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }

        query
    }
}

/// The hosted relational store. Every method is exactly one round trip.
#[async_trait]
pub trait Remote: Send + Sync {
    async fn select(&self, table: &str, query: &Select) -> Result<Vec<Value>>;

    async fn insert(&self, table: &str, row: Value) -> Result<Value>;

    /// Inserts or merges on the `on_conflict` column.
    async fn upsert(&self, table: &str, row: Value, on_conflict: &str) -> Result<Value>;

    async fn update(&self, table: &str, query: &Select, changes: Value) -> Result<Vec<Value>>;

    async fn delete(&self, table: &str, query: &Select) -> Result<()>;

    async fn rpc(&self, function: &str, args: Value) -> Result<Value>;

    async fn select_single(&self, table: &str, query: &Select) -> Result<Option<Value>> {
        let query = query.clone().limit(1);

        Ok(self.select(table, &query).await?.into_iter().next())
    }
}

pub fn from_row<T: DeserializeOwned>(row: Value) -> Result<T> {
    serde_json::from_value(row).map_err(|e| anyhow!("Error while parsing response: {e}"))
}

pub fn from_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>> {
    rows.into_iter().map(from_row).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_postgrest_query() {
        let query = Select::new()
            .eq("user_id", "abc")
            .order("downloads", false)
            .limit(5)
            .to_query();

        assert_eq!(
            query,
            vec![
                ("select".to_string(), "*".to_string()),
                ("user_id".to_string(), "eq.abc".to_string()),
                ("order".to_string(), "downloads.desc".to_string()),
                ("limit".to_string(), "5".to_string()),
            ]
        );
    }
}
