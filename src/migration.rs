//! DDL for the point table and its id sequence. Idempotent; safe to run on every startup.

use crate::error::AppError;
use sqlx::PgPool;

pub const POINT_TABLE: &str = "point";

/// Statements in dependency order: the sequence must exist before the table default refers to it.
const MIGRATIONS: &[&str] = &[
    "CREATE SEQUENCE IF NOT EXISTS sequence_generator START WITH 1000 INCREMENT BY 1",
    r#"
    CREATE TABLE IF NOT EXISTS point (
        id BIGINT PRIMARY KEY DEFAULT nextval('sequence_generator'),
        title VARCHAR(20) NOT NULL,
        description TEXT NOT NULL
    )
    "#,
];

pub async fn apply_migrations(pool: &PgPool) -> Result<(), AppError> {
    for sql in MIGRATIONS {
        sqlx::query(sql).execute(pool).await?;
    }
    tracing::info!(table = POINT_TABLE, "schema ready");
    Ok(())
}
