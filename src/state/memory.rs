//! In-process stand-in for the hosted store, used by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Map, Value};

use super::remote::{Remote, Select};

#[derive(Default)]
pub struct MemoryRemote {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    next_id: AtomicUsize,
    selects: AtomicUsize,
    failure: Mutex<Option<String>>,
    delay: Mutex<Option<Duration>>,
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn matches(row: &Value, query: &Select) -> bool {
    query
        .filters
        .iter()
        .all(|(column, value)| row.get(column).map(as_text).as_deref() == Some(value.as_str()))
}

fn compare(a: &Value, b: &Value) -> std::cmp::Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .unwrap_or_default()
            .total_cmp(&b.as_f64().unwrap_or_default()),
        (a, b) => as_text(a).cmp(&as_text(b)),
    }
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self {
            next_id: AtomicUsize::new(1),
            ..Default::default()
        }
    }

    /// Makes the next operation fail with `message`.
    pub fn fail_next(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn selects(&self) -> usize {
        self.selects.load(Ordering::SeqCst)
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Inserts a row as is, bypassing column defaults.
    pub fn seed(&self, table: &str, row: Value) {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(row);
    }

    async fn round_trip(&self) -> Result<()> {
        let delay = *self.delay.lock().unwrap();

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self.failure.lock().unwrap().take() {
            bail!("{message}");
        }

        Ok(())
    }

    fn with_defaults(&self, table: &str, row: Value) -> Result<Value> {
        let Value::Object(fields) = row else {
            bail!("Rows must be objects");
        };

        let mut defaults = match table {
            "projects" => json!({
                "id": self.next_id.fetch_add(1, Ordering::SeqCst),
                "created_at": Utc::now(),
                "description": null,
                "prompt": null,
                "status": "in-progress",
                "framework": null,
                "downloads": 0,
            }),
            "user_settings" => json!({
                "email_notifications": true,
                "push_notifications": false,
                "api_key": null,
            }),
            _ => json!({}),
        };

        let defaults = defaults
            .as_object_mut()
            .ok_or_else(|| anyhow!("Invalid defaults"))?;

        defaults.extend(fields);

        Ok(Value::Object(std::mem::take(defaults)))
    }
}

#[async_trait]
impl Remote for MemoryRemote {
    async fn select(&self, table: &str, query: &Select) -> Result<Vec<Value>> {
        self.selects.fetch_add(1, Ordering::SeqCst);
        self.round_trip().await?;

        let mut rows = self
            .rows(table)
            .into_iter()
            .filter(|row| matches(row, query))
            .collect::<Vec<_>>();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = compare(&a[&order.column], &b[&order.column]);

                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value> {
        self.round_trip().await?;

        let row = self.with_defaults(table, row)?;
        self.seed(table, row.clone());

        Ok(row)
    }

    async fn upsert(&self, table: &str, row: Value, on_conflict: &str) -> Result<Value> {
        self.round_trip().await?;

        let key = row
            .get(on_conflict)
            .map(as_text)
            .ok_or_else(|| anyhow!("Missing conflict column `{on_conflict}`"))?;

        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();

        if let Some(existing) = rows
            .iter_mut()
            .find(|existing| existing.get(on_conflict).map(as_text).as_deref() == Some(&key))
        {
            merge(existing, row);
            return Ok(existing.clone());
        }

        drop(tables);
        let row = self.with_defaults(table, row)?;
        self.seed(table, row.clone());

        Ok(row)
    }

    async fn update(&self, table: &str, query: &Select, changes: Value) -> Result<Vec<Value>> {
        self.round_trip().await?;

        let mut tables = self.tables.lock().unwrap();

        Ok(tables
            .entry(table.to_string())
            .or_default()
            .iter_mut()
            .filter(|row| matches(row, query))
            .map(|row| {
                merge(row, changes.clone());
                row.clone()
            })
            .collect())
    }

    async fn delete(&self, table: &str, query: &Select) -> Result<()> {
        self.round_trip().await?;

        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .retain(|row| !matches(row, query));

        Ok(())
    }

    async fn rpc(&self, function: &str, args: Value) -> Result<Value> {
        self.round_trip().await?;

        match function {
            "get_user_stats" => {
                let user_id = args["p_user_id"].as_str().unwrap_or_default().to_string();
                let projects = self
                    .rows("projects")
                    .into_iter()
                    .filter(|row| row["user_id"] == user_id.as_str())
                    .collect::<Vec<_>>();

                let count = |status: &str| {
                    projects.iter().filter(|p| p["status"] == status).count()
                };
                let downloads = projects
                    .iter()
                    .filter_map(|p| p["downloads"].as_i64())
                    .sum::<i64>();

                Ok(json!([{
                    "total_downloads": downloads,
                    "deployed_count": count("deployed"),
                    "in_progress_count": count("in-progress"),
                }]))
            }
            other => bail!("Could not find the function public.{other}"),
        }
    }
}

fn merge(row: &mut Value, changes: Value) {
    if let (Value::Object(row), Value::Object(changes)) = (row, changes) {
        let changes: Map<String, Value> = changes;
        row.extend(changes);
    }
}
