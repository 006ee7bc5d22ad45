//! Primary store: authoritative persistence for points, keyed by a store-assigned id.

mod memory;
mod postgres;

pub use memory::MemoryPointStore;
pub(crate) use memory::page_of;
pub use postgres::{ensure_database_exists, PgPointStore};

use crate::domain::Point;
use crate::error::AppError;
use crate::pagination::{Page, PageRequest};
use async_trait::async_trait;

#[async_trait]
pub trait PointStore: Send + Sync {
    /// Persist a point without id; the store assigns a fresh, never reused id.
    async fn insert(&self, point: &Point) -> Result<Point, AppError>;

    /// Overwrite every field of the point with `point.id`. Fails with `RowNotFound` if it is gone.
    async fn update(&self, point: &Point) -> Result<Point, AppError>;

    async fn exists(&self, id: i64) -> Result<bool, AppError>;

    async fn find(&self, id: i64) -> Result<Option<Point>, AppError>;

    /// Remove the point if present. Deleting a missing id is not an error.
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    async fn find_page(&self, request: &PageRequest) -> Result<Page<Point>, AppError>;

    /// Cheap connectivity check for readiness.
    async fn ping(&self) -> Result<(), AppError>;
}
