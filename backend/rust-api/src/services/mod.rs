use crate::config::{Config, StorageBackend};
use anyhow::{anyhow, Context};
use redis::aio::ConnectionManager;
use std::sync::Arc;
use std::time::Duration;

use self::blob_store::{BlobStore, MemoryBlobStore, MongoBlobStore, RedisBlobStore};
use self::catalog::{finance_challenge, TaskCatalog};
use self::content_service::ContentService;
use self::portfolio_service::PortfolioService;
use self::quiz_service::QuizService;
use self::table_store::{MemoryTableStore, MongoTableStore, TableStore};

pub mod blob_store;
pub mod catalog;
pub mod content_service;
pub mod game_machine;
pub mod gating;
pub mod page_controller;
pub mod portfolio_service;
pub mod quiz_service;
pub mod table_store;

pub struct AppState {
    pub config: Config,
    pub quiz: QuizService,
    pub content: ContentService,
    pub portfolio: PortfolioService,
}

impl AppState {
    /// Connects the configured backends and builds the services.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let catalog = Arc::new(TaskCatalog::new(finance_challenge()).context("Invalid task catalog")?);

        let (game_store, content_store, tables): (
            Arc<dyn BlobStore>,
            Arc<dyn BlobStore>,
            Arc<dyn TableStore>,
        ) = match config.storage_backend {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage, nothing survives a restart");
                (
                    Arc::new(MemoryBlobStore::new()),
                    Arc::new(MemoryBlobStore::new()),
                    Arc::new(MemoryTableStore::new()),
                )
            }
            StorageBackend::External => {
                let mongo_uri = config
                    .mongo_uri
                    .as_deref()
                    .ok_or_else(|| anyhow!("MONGO_URI is required for external storage"))?;
                let redis_uri = config
                    .redis_uri
                    .as_deref()
                    .ok_or_else(|| anyhow!("REDIS_URI is required for external storage"))?;

                let mongo_client = mongodb::Client::with_uri_str(mongo_uri)
                    .await
                    .context("Failed to connect to MongoDB")?;
                let mongo = mongo_client.database(&config.mongo_database);
                tracing::info!("MongoDB connected");

                let redis = connect_redis(redis_uri).await?;
                (
                    Arc::new(RedisBlobStore::new(redis, config.game_state_ttl_seconds)),
                    Arc::new(MongoBlobStore::new(mongo.clone())),
                    Arc::new(MongoTableStore::new(mongo)),
                )
            }
        };

        Ok(Self::with_stores(config, catalog, game_store, content_store, tables))
    }

    pub fn with_stores(
        config: Config,
        catalog: Arc<TaskCatalog>,
        game_store: Arc<dyn BlobStore>,
        content_store: Arc<dyn BlobStore>,
        tables: Arc<dyn TableStore>,
    ) -> Self {
        let quiz = QuizService::new(
            catalog,
            game_store,
            Duration::from_millis(config.gate_delay_ms),
            Duration::from_secs(config.session_idle_seconds),
            config.site_origin.clone(),
        );

        Self {
            quiz,
            content: ContentService::new(content_store),
            portfolio: PortfolioService::new(tables),
            config,
        }
    }
}

async fn connect_redis(redis_uri: &str) -> anyhow::Result<ConnectionManager> {
    tracing::info!("Attempting to connect to Redis...");
    let client = redis::Client::open(redis_uri).context("Invalid Redis URI")?;

    let redis = tokio::time::timeout(Duration::from_secs(30), ConnectionManager::new(client))
        .await
        .map_err(|_| anyhow!("Redis connection timeout after 30s"))??;

    let mut conn = redis.clone();
    tokio::time::timeout(
        Duration::from_secs(5),
        redis::cmd("PING").query_async::<String>(&mut conn),
    )
    .await
    .map_err(|_| anyhow!("Redis PING timeout after 5s"))??;

    tracing::info!("Redis connection established successfully");
    Ok(redis)
}
