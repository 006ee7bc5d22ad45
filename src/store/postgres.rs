//! PostgreSQL point store and database bootstrap.

use super::PointStore;
use crate::domain::Point;
use crate::error::AppError;
use crate::migration::POINT_TABLE;
use crate::pagination::{Direction, Page, PageRequest, SortOrder};
use async_trait::async_trait;
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

type PointRow = (i64, String, String);

fn row_to_point((id, title, description): PointRow) -> Point {
    Point {
        id: Some(id),
        title,
        description,
    }
}

/// ORDER BY clause from sort orders. Column names come from a closed enum, never from input.
fn order_by(orders: &[SortOrder]) -> String {
    orders
        .iter()
        .map(|o| {
            let dir = match o.direction {
                Direction::Asc => "ASC",
                Direction::Desc => "DESC",
            };
            format!("\"{}\" {}", o.property.as_str(), dir)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Clone, Debug)]
pub struct PgPointStore {
    pool: PgPool,
}

impl PgPointStore {
    pub fn new(pool: PgPool) -> Self {
        PgPointStore { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl PointStore for PgPointStore {
    async fn insert(&self, point: &Point) -> Result<Point, AppError> {
        let sql = format!(
            "INSERT INTO {} (title, description) VALUES ($1, $2) RETURNING id, title, description",
            POINT_TABLE
        );
        tracing::debug!(sql = %sql, "query");
        let row: PointRow = sqlx::query_as(&sql)
            .bind(&point.title)
            .bind(&point.description)
            .fetch_one(&self.pool)
            .await?;
        Ok(row_to_point(row))
    }

    async fn update(&self, point: &Point) -> Result<Point, AppError> {
        let id = point
            .id
            .ok_or_else(|| AppError::BadRequest("cannot update a point without id".into()))?;
        let sql = format!(
            "UPDATE {} SET title = $1, description = $2 WHERE id = $3 RETURNING id, title, description",
            POINT_TABLE
        );
        tracing::debug!(sql = %sql, id, "query");
        let row: Option<PointRow> = sqlx::query_as(&sql)
            .bind(&point.title)
            .bind(&point.description)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_point).ok_or(AppError::Db(sqlx::Error::RowNotFound))
    }

    async fn exists(&self, id: i64) -> Result<bool, AppError> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", POINT_TABLE);
        let (exists,): (bool,) = sqlx::query_as(&sql).bind(id).fetch_one(&self.pool).await?;
        Ok(exists)
    }

    async fn find(&self, id: i64) -> Result<Option<Point>, AppError> {
        let sql = format!("SELECT id, title, description FROM {} WHERE id = $1", POINT_TABLE);
        tracing::debug!(sql = %sql, id, "query");
        let row: Option<PointRow> = sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.map(row_to_point))
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", POINT_TABLE);
        tracing::debug!(sql = %sql, id, "query");
        sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(())
    }

    async fn find_page(&self, request: &PageRequest) -> Result<Page<Point>, AppError> {
        let sql = format!(
            "SELECT id, title, description FROM {} ORDER BY {} LIMIT $1 OFFSET $2",
            POINT_TABLE,
            order_by(&request.sort_or_default())
        );
        tracing::debug!(sql = %sql, page = request.page, size = request.size, "query");
        let rows: Vec<PointRow> = sqlx::query_as(&sql)
            .bind(i64::from(request.size))
            .bind(request.offset() as i64)
            .fetch_all(&self.pool)
            .await?;
        let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", POINT_TABLE))
            .fetch_one(&self.pool)
            .await?;
        Ok(Page::new(
            rows.into_iter().map(row_to_point).collect(),
            request,
            total.max(0) as u64,
        ))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url.rfind('/').ok_or_else(|| AppError::BadRequest("DATABASE_URL: no path".into()))? + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
