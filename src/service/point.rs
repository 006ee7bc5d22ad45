//! Point operations over the primary store and the search index.
//!
//! The primary store is always written first; the index write happens only once the store
//! write has succeeded. An index failure after that is returned to the caller as-is: the
//! store write is not rolled back and nothing is retried.

use crate::domain::{Point, PointPatch};
use crate::error::AppError;
use crate::pagination::{Page, PageRequest};
use crate::search::SearchIndex;
use crate::store::PointStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct PointService {
    store: Arc<dyn PointStore>,
    index: Arc<dyn SearchIndex>,
}

impl PointService {
    pub fn new(store: Arc<dyn PointStore>, index: Arc<dyn SearchIndex>) -> Self {
        PointService { store, index }
    }

    /// Insert (no id) or overwrite (id set) in the primary store, then mirror the stored row into the index.
    pub async fn persist_and_index(&self, point: &Point) -> Result<Point, AppError> {
        let saved = match point.id {
            None => self.store.insert(point).await?,
            Some(_) => self.store.update(point).await?,
        };
        self.index.upsert(&saved).await?;
        Ok(saved)
    }

    pub async fn exists(&self, id: i64) -> Result<bool, AppError> {
        self.store.exists(id).await
    }

    pub async fn find_one(&self, id: i64) -> Result<Option<Point>, AppError> {
        self.store.find(id).await
    }

    pub async fn find_page(&self, request: &PageRequest) -> Result<Page<Point>, AppError> {
        self.store.find_page(request).await
    }

    /// Merge `patch` into the stored point with `id`. `None` when the point is gone by the time it is fetched.
    pub async fn partial_update(&self, id: i64, patch: PointPatch) -> Result<Option<Point>, AppError> {
        let Some(existing) = self.store.find(id).await? else {
            return Ok(None);
        };
        let merged = patch.merge_into(existing);
        self.persist_and_index(&merged).await.map(Some)
    }

    /// Remove from the store, then from the index. Missing ids are not an error.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.store.delete(id).await?;
        self.index.delete(id).await?;
        Ok(())
    }

    pub async fn search(&self, query: &str, request: &PageRequest) -> Result<Page<Point>, AppError> {
        Ok(self.index.search(query, request).await?)
    }

    /// Readiness: both collaborators must answer.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.store.ping().await?;
        self.index.ping().await?;
        Ok(())
    }
}
