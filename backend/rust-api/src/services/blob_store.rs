use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::{doc, Document};
use mongodb::Database;
use redis::aio::ConnectionManager;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::metrics::{record_game_state_lookup, track_store_operation};

/// Key-value store for serialized JSON blobs (game state, content sections).
#[async_trait]
pub trait BlobStore: Send + Sync {
    fn backend(&self) -> &'static str;
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn put(&self, key: &str, value: &str) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
    async fn ping(&self) -> Result<()>;
}

#[derive(Default)]
pub struct MemoryBlobStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Blobs as plain Redis strings, optionally expiring.
pub struct RedisBlobStore {
    redis: ConnectionManager,
    ttl_seconds: Option<u64>,
}

impl RedisBlobStore {
    pub fn new(redis: ConnectionManager, ttl_seconds: Option<u64>) -> Self {
        Self { redis, ttl_seconds }
    }
}

#[async_trait]
impl BlobStore for RedisBlobStore {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.redis.clone();
        let value: Option<String> = track_store_operation("redis", "get", "game_state", async {
            redis::cmd("GET")
                .arg(key)
                .query_async(&mut conn)
                .await
                .context("Failed to read blob from Redis")
        })
        .await?;

        record_game_state_lookup(value.is_some());
        Ok(value)
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.redis.clone();
        track_store_operation("redis", "set", "game_state", async {
            let mut cmd = redis::cmd("SET");
            cmd.arg(key).arg(value);
            if let Some(ttl) = self.ttl_seconds {
                cmd.arg("EX").arg(ttl);
            }
            cmd.query_async::<()>(&mut conn)
                .await
                .context("Failed to write blob to Redis")
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.redis.clone();
        track_store_operation("redis", "del", "game_state", async {
            redis::cmd("DEL")
                .arg(key)
                .query_async::<()>(&mut conn)
                .await
                .context("Failed to delete blob from Redis")
        })
        .await
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.redis.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .context("Redis PING failed")?;
        Ok(())
    }
}

/// Blobs as `{ _id: key, value, updated_at }` documents in `site_settings`.
pub struct MongoBlobStore {
    mongo: Database,
}

impl MongoBlobStore {
    pub const COLLECTION: &'static str = "site_settings";

    pub fn new(mongo: Database) -> Self {
        Self { mongo }
    }

    fn collection(&self) -> mongodb::Collection<Document> {
        self.mongo.collection::<Document>(Self::COLLECTION)
    }
}

#[async_trait]
impl BlobStore for MongoBlobStore {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let found = track_store_operation("mongodb", "find_one", Self::COLLECTION, async {
            self.collection()
                .find_one(doc! { "_id": key })
                .await
                .context("Failed to read site setting")
        })
        .await?;

        Ok(found.and_then(|document| document.get_str("value").ok().map(str::to_string)))
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let document = doc! {
            "_id": key,
            "value": value,
            "updated_at": Utc::now().to_rfc3339(),
        };
        track_store_operation("mongodb", "replace_one", Self::COLLECTION, async {
            self.collection()
                .replace_one(doc! { "_id": key }, document)
                .with_options(
                    mongodb::options::ReplaceOptions::builder()
                        .upsert(true)
                        .build(),
                )
                .await
                .context("Failed to write site setting")?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        track_store_operation("mongodb", "delete_one", Self::COLLECTION, async {
            self.collection()
                .delete_one(doc! { "_id": key })
                .await
                .context("Failed to delete site setting")?;
            Ok(())
        })
        .await
    }

    async fn ping(&self) -> Result<()> {
        self.mongo
            .run_command(doc! { "ping": 1 })
            .await
            .context("MongoDB ping failed")?;
        Ok(())
    }
}
