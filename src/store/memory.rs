//! In-process point store. Ids come from a monotonically increasing counter and are never reused.

use super::PointStore;
use crate::domain::Point;
use crate::error::AppError;
use crate::pagination::{Direction, Page, PageRequest, SortOrder, SortProperty};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

const FIRST_ID: i64 = 1000;

#[derive(Debug)]
struct Inner {
    next_id: i64,
    rows: BTreeMap<i64, Point>,
    writes: u64,
}

#[derive(Debug)]
pub struct MemoryPointStore {
    inner: RwLock<Inner>,
}

impl Default for MemoryPointStore {
    fn default() -> Self {
        MemoryPointStore {
            inner: RwLock::new(Inner {
                next_id: FIRST_ID,
                rows: BTreeMap::new(),
                writes: 0,
            }),
        }
    }
}

impl MemoryPointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of insert/update/delete calls so far.
    pub async fn writes(&self) -> u64 {
        self.inner.read().await.writes
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

pub(crate) fn compare_points(a: &Point, b: &Point, orders: &[SortOrder]) -> Ordering {
    for order in orders {
        let ord = match order.property {
            SortProperty::Id => a.id.cmp(&b.id),
            SortProperty::Title => a.title.cmp(&b.title),
            SortProperty::Description => a.description.cmp(&b.description),
        };
        let ord = match order.direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Sort and slice `items` into the requested page.
pub(crate) fn page_of(mut items: Vec<Point>, request: &PageRequest) -> Page<Point> {
    let orders = request.sort_or_default();
    items.sort_by(|a, b| compare_points(a, b, &orders));
    let total = items.len() as u64;
    let content = items
        .into_iter()
        .skip(request.offset() as usize)
        .take(request.size as usize)
        .collect();
    Page::new(content, request, total)
}

#[async_trait]
impl PointStore for MemoryPointStore {
    async fn insert(&self, point: &Point) -> Result<Point, AppError> {
        let mut inner = self.inner.write().await;
        inner.writes += 1;
        let id = inner.next_id;
        inner.next_id += 1;
        let stored = point.clone().with_id(id);
        inner.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, point: &Point) -> Result<Point, AppError> {
        let id = point
            .id
            .ok_or_else(|| AppError::BadRequest("cannot update a point without id".into()))?;
        let mut inner = self.inner.write().await;
        inner.writes += 1;
        match inner.rows.get_mut(&id) {
            Some(row) => {
                *row = point.clone();
                Ok(row.clone())
            }
            None => Err(AppError::Db(sqlx::Error::RowNotFound)),
        }
    }

    async fn exists(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.inner.read().await.rows.contains_key(&id))
    }

    async fn find(&self, id: i64) -> Result<Option<Point>, AppError> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        inner.writes += 1;
        inner.rows.remove(&id);
        Ok(())
    }

    async fn find_page(&self, request: &PageRequest) -> Result<Page<Point>, AppError> {
        let items: Vec<Point> = self.inner.read().await.rows.values().cloned().collect();
        Ok(page_of(items, request))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
