use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Document};
use mongodb::Database;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::metrics::track_store_operation;
use crate::models::portfolio::PortfolioTable;

/// Row store for the portfolio tables. Rows are JSON objects carrying a
/// string `id`; ordering is the caller's concern.
#[async_trait]
pub trait TableStore: Send + Sync {
    fn backend(&self) -> &'static str;
    async fn list(&self, table: PortfolioTable) -> Result<Vec<Value>>;
    async fn get(&self, table: PortfolioTable, id: &str) -> Result<Option<Value>>;
    async fn insert(&self, table: PortfolioTable, row: Value) -> Result<()>;
    /// Replaces a row; `false` when no row has that id.
    async fn update(&self, table: PortfolioTable, id: &str, row: Value) -> Result<bool>;
    async fn delete(&self, table: PortfolioTable, id: &str) -> Result<bool>;
    async fn ping(&self) -> Result<()>;
}

fn row_id(row: &Value) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

#[derive(Default)]
pub struct MemoryTableStore {
    tables: RwLock<HashMap<PortfolioTable, Vec<Value>>>,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn list(&self, table: PortfolioTable) -> Result<Vec<Value>> {
        Ok(self
            .tables
            .read()
            .await
            .get(&table)
            .cloned()
            .unwrap_or_default())
    }

    async fn get(&self, table: PortfolioTable, id: &str) -> Result<Option<Value>> {
        Ok(self
            .tables
            .read()
            .await
            .get(&table)
            .and_then(|rows| rows.iter().find(|row| row_id(row) == Some(id)).cloned()))
    }

    async fn insert(&self, table: PortfolioTable, row: Value) -> Result<()> {
        let id = row_id(&row)
            .ok_or_else(|| anyhow!("row for {} has no id", table))?
            .to_string();
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table).or_default();
        if rows.iter().any(|existing| row_id(existing) == Some(id.as_str())) {
            return Err(anyhow!("duplicate id {} in {}", id, table));
        }
        rows.push(row);
        Ok(())
    }

    async fn update(&self, table: PortfolioTable, id: &str, row: Value) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(&table) else {
            return Ok(false);
        };
        match rows.iter_mut().find(|existing| row_id(existing) == Some(id)) {
            Some(existing) => {
                *existing = row;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, table: PortfolioTable, id: &str) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(&table) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|row| row_id(row) != Some(id));
        Ok(rows.len() != before)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// One MongoDB collection per table; the row `id` is stored as `_id`.
pub struct MongoTableStore {
    mongo: Database,
}

impl MongoTableStore {
    pub fn new(mongo: Database) -> Self {
        Self { mongo }
    }

    fn collection(&self, table: PortfolioTable) -> mongodb::Collection<Document> {
        self.mongo.collection::<Document>(table.name())
    }
}

fn to_document(mut row: Value) -> Result<Document> {
    let object = row
        .as_object_mut()
        .ok_or_else(|| anyhow!("row must be a JSON object"))?;
    if let Some(id) = object.remove("id") {
        object.insert("_id".to_string(), id);
    }
    bson::to_document(&row).context("Failed to convert row to BSON")
}

fn from_document(document: Document) -> Result<Value> {
    let mut row: Value =
        bson::from_document(document).context("Failed to convert BSON row to JSON")?;
    if let Some(object) = row.as_object_mut() {
        if let Some(id) = object.remove("_id") {
            object.insert("id".to_string(), id);
        }
    }
    Ok(row)
}

#[async_trait]
impl TableStore for MongoTableStore {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    async fn list(&self, table: PortfolioTable) -> Result<Vec<Value>> {
        let documents: Vec<Document> = track_store_operation("mongodb", "find", table.name(), async {
            let cursor = self
                .collection(table)
                .find(Document::new())
                .await
                .with_context(|| format!("Failed to query {}", table))?;
            cursor
                .try_collect()
                .await
                .with_context(|| format!("Failed to read {}", table))
        })
        .await?;

        documents.into_iter().map(from_document).collect()
    }

    async fn get(&self, table: PortfolioTable, id: &str) -> Result<Option<Value>> {
        let found = track_store_operation("mongodb", "find_one", table.name(), async {
            self.collection(table)
                .find_one(doc! { "_id": id })
                .await
                .with_context(|| format!("Failed to read {} row", table))
        })
        .await?;

        found.map(from_document).transpose()
    }

    async fn insert(&self, table: PortfolioTable, row: Value) -> Result<()> {
        let document = to_document(row)?;
        track_store_operation("mongodb", "insert_one", table.name(), async {
            self.collection(table)
                .insert_one(document)
                .await
                .with_context(|| format!("Failed to insert into {}", table))?;
            Ok(())
        })
        .await
    }

    async fn update(&self, table: PortfolioTable, id: &str, row: Value) -> Result<bool> {
        let document = to_document(row)?;
        let result = track_store_operation("mongodb", "replace_one", table.name(), async {
            self.collection(table)
                .replace_one(doc! { "_id": id }, document)
                .await
                .with_context(|| format!("Failed to update {} row", table))
        })
        .await?;

        Ok(result.matched_count > 0)
    }

    async fn delete(&self, table: PortfolioTable, id: &str) -> Result<bool> {
        let result = track_store_operation("mongodb", "delete_one", table.name(), async {
            self.collection(table)
                .delete_one(doc! { "_id": id })
                .await
                .with_context(|| format!("Failed to delete {} row", table))
        })
        .await?;

        Ok(result.deleted_count > 0)
    }

    async fn ping(&self) -> Result<()> {
        self.mongo
            .run_command(doc! { "ping": 1 })
            .await
            .context("MongoDB ping failed")?;
        Ok(())
    }
}
