//! Point server: connects to PostgreSQL and Elasticsearch, bootstraps schema and index, serves the API.
//!
//! Run from repo root: `cargo run -p point-server`

use point_service::{
    app, apply_migrations, ensure_database_exists, AppState, ElasticsearchIndex, PgPointStore, PointService,
    Settings,
};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("point_service=info,point_server=info")),
        )
        .init();

    let settings = Settings::from_env()?;

    ensure_database_exists(&settings.database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.database_max_connections)
        .connect(&settings.database_url)
        .await?;
    apply_migrations(&pool).await?;

    let index = ElasticsearchIndex::new(
        settings.elasticsearch_url.clone(),
        settings.search_index_name.clone(),
        settings.search_refresh,
    );
    index.ensure_index().await?;

    let points = PointService::new(Arc::new(PgPointStore::new(pool)), Arc::new(index));
    let bind_addr = settings.bind_addr.clone();
    let state = AppState::new(points, settings);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
