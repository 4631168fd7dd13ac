//! Business logic services

pub mod catalog;
pub mod stock;

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    repository::{BookStore, BookTransaction},
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub stock: stock::StockService,
}

impl Services {
    /// Create all services on top of the given store
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self {
            catalog: catalog::CatalogService::new(Arc::clone(&store)),
            stock: stock::StockService::new(store),
        }
    }
}

/// Roll back `tx` and fail with `err`
pub(crate) async fn abort<T>(tx: Box<dyn BookTransaction>, err: AppError) -> AppResult<T> {
    tracing::debug!("Rolling back transaction: {}", err);
    if let Err(rollback_err) = tx.rollback().await {
        tracing::warn!("Rollback failed: {}", rollback_err);
    }
    Err(err)
}
