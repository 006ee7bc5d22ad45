//! Search index: a denormalized, eventually consistent copy of every point for free-text queries.

mod elasticsearch;
mod memory;

pub use elasticsearch::ElasticsearchIndex;
pub use memory::MemorySearchIndex;

use crate::domain::Point;
use crate::pagination::{Page, PageRequest};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("index responded {status}: {body}")]
    Status { status: u16, body: String },
    #[error("point has no id")]
    MissingId,
    #[error("index unavailable")]
    Unavailable,
}

#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Insert or replace the document keyed by `point.id`.
    async fn upsert(&self, point: &Point) -> Result<(), SearchError>;

    /// Remove the document if present. A missing document is not an error.
    async fn delete(&self, id: i64) -> Result<(), SearchError>;

    /// Run `query` through the index's own query grammar and return one page of matches.
    async fn search(&self, query: &str, request: &PageRequest) -> Result<Page<Point>, SearchError>;

    async fn ping(&self) -> Result<(), SearchError>;
}
