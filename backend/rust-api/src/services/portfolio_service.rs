use anyhow::Context;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::metrics::CONTENT_UPDATES_TOTAL;
use crate::models::portfolio::{PortfolioRow, PortfolioTable, ReorderRequest, RowOrder};

use super::table_store::TableStore;

#[derive(Debug, Error)]
pub enum PortfolioError {
    #[error("{label} not found")]
    NotFound { label: &'static str, id: String },
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("Invalid row: {0}")]
    InvalidRow(ValidationError),
    #[error("{0} rows are ordered by name and cannot be reordered")]
    NotReorderable(PortfolioTable),
    #[error("Reorder list has unknown or repeated id {0}")]
    ReorderMismatch(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// CRUD over the portfolio tables. Generic over the row type so each table
/// keeps its own request shapes and validation.
pub struct PortfolioService {
    store: Arc<dyn TableStore>,
}

fn sort_rows<R: PortfolioRow>(rows: &mut [R]) {
    match R::ORDER {
        RowOrder::OrderIndex => rows.sort_by_key(|row| row.order_index().unwrap_or(i32::MAX)),
        RowOrder::Name => rows.sort_by(|a, b| a.sort_name().cmp(b.sort_name())),
    }
}

impl PortfolioService {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    pub fn store_backend(&self) -> &'static str {
        self.store.backend()
    }

    pub async fn ping_store(&self) -> anyhow::Result<()> {
        self.store.ping().await
    }

    pub async fn list<R: PortfolioRow>(&self) -> Result<Vec<R>, PortfolioError> {
        let raw = self.store.list(R::TABLE).await?;
        let mut rows: Vec<R> = raw
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<R>(value) {
                Ok(row) => Some(row),
                Err(e) => {
                    tracing::warn!(table = %R::TABLE, "Skipping unreadable row: {}", e);
                    None
                }
            })
            .collect();
        sort_rows(&mut rows);
        Ok(rows)
    }

    async fn find<R: PortfolioRow>(&self, id: &str) -> Result<R, PortfolioError> {
        let value = self
            .store
            .get(R::TABLE, id)
            .await?
            .ok_or_else(|| PortfolioError::NotFound {
                label: R::LABEL,
                id: id.to_string(),
            })?;
        serde_json::from_value(value)
            .with_context(|| format!("Stored {} row {} is unreadable", R::TABLE, id))
            .map_err(PortfolioError::from)
    }

    pub async fn create<R: PortfolioRow>(&self, request: R::Create) -> Result<R, PortfolioError> {
        request.validate()?;

        let order_index = match R::requested_order(&request) {
            Some(order_index) => order_index,
            None => self
                .list::<R>()
                .await?
                .iter()
                .filter_map(PortfolioRow::order_index)
                .max()
                .map_or(0, |max| max + 1),
        };

        let row = R::from_create(Uuid::new_v4().to_string(), request, order_index, Utc::now());
        let value = serde_json::to_value(&row).context("Failed to encode row")?;
        self.store.insert(R::TABLE, value).await?;

        CONTENT_UPDATES_TOTAL
            .with_label_values(&[R::TABLE.name(), "create"])
            .inc();
        tracing::info!(table = %R::TABLE, id = row.id(), "Row created");
        Ok(row)
    }

    pub async fn update<R: PortfolioRow>(
        &self,
        id: &str,
        request: R::Update,
    ) -> Result<R, PortfolioError> {
        request.validate()?;

        let mut row = self.find::<R>(id).await?;
        row.apply_update(request, Utc::now());
        row.validate_merged().map_err(PortfolioError::InvalidRow)?;

        let value = serde_json::to_value(&row).context("Failed to encode row")?;
        if !self.store.update(R::TABLE, id, value).await? {
            return Err(PortfolioError::NotFound {
                label: R::LABEL,
                id: id.to_string(),
            });
        }

        CONTENT_UPDATES_TOTAL
            .with_label_values(&[R::TABLE.name(), "update"])
            .inc();
        tracing::info!(table = %R::TABLE, id, "Row updated");
        Ok(row)
    }

    pub async fn delete<R: PortfolioRow>(&self, id: &str) -> Result<(), PortfolioError> {
        if !self.store.delete(R::TABLE, id).await? {
            return Err(PortfolioError::NotFound {
                label: R::LABEL,
                id: id.to_string(),
            });
        }

        CONTENT_UPDATES_TOTAL
            .with_label_values(&[R::TABLE.name(), "delete"])
            .inc();
        tracing::info!(table = %R::TABLE, id, "Row deleted");
        Ok(())
    }

    /// Rewrites `order_index` so listed rows follow the given id order.
    /// Rows left out keep their index.
    pub async fn reorder<R: PortfolioRow>(
        &self,
        request: ReorderRequest,
    ) -> Result<Vec<R>, PortfolioError> {
        request.validate()?;
        if R::ORDER != RowOrder::OrderIndex {
            return Err(PortfolioError::NotReorderable(R::TABLE));
        }

        let rows = self.list::<R>().await?;
        let known: HashSet<&str> = rows.iter().map(PortfolioRow::id).collect();
        let mut seen = HashSet::new();
        if let Some(bad) = request
            .ids
            .iter()
            .find(|id| !known.contains(id.as_str()) || !seen.insert(id.as_str()))
        {
            return Err(PortfolioError::ReorderMismatch(bad.clone()));
        }

        for (position, id) in request.ids.iter().enumerate() {
            let Some(mut row) = rows.iter().find(|row| row.id() == id).cloned() else {
                continue;
            };
            row.set_order_index(position as i32);
            let value = serde_json::to_value(&row).context("Failed to encode row")?;
            self.store.update(R::TABLE, id, value).await?;
        }

        CONTENT_UPDATES_TOTAL
            .with_label_values(&[R::TABLE.name(), "reorder"])
            .inc();
        tracing::info!(table = %R::TABLE, count = request.ids.len(), "Rows reordered");
        self.list::<R>().await
    }
}
