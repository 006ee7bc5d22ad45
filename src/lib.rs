//! Point service: REST CRUD for points, stored in PostgreSQL and mirrored into a search index.

pub mod config;
pub mod domain;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod openapi;
pub mod pagination;
pub mod response;
pub mod routes;
pub mod search;
pub mod service;
pub mod state;
pub mod store;

pub use config::Settings;
pub use domain::{FieldPatch, Point, PointPatch};
pub use error::{AppError, ConfigError};
pub use migration::apply_migrations;
pub use pagination::{Page, PageRequest};
pub use routes::{app, common_routes, common_routes_with_ready, point_routes};
pub use search::{ElasticsearchIndex, MemorySearchIndex, SearchError, SearchIndex};
pub use service::PointService;
pub use state::AppState;
pub use store::{ensure_database_exists, MemoryPointStore, PgPointStore, PointStore};
