//! Runtime settings from environment variables (a `.env` file is loaded by the binary).

use crate::error::ConfigError;
use std::str::FromStr;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/points";
pub const DEFAULT_ELASTICSEARCH_URL: &str = "http://localhost:9200";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub database_max_connections: u32,
    pub elasticsearch_url: String,
    pub search_index_name: String,
    /// Index writes wait for a refresh so searches see them immediately.
    pub search_refresh: bool,
    /// Prefix of the `X-{app}-alert` / `X-{app}-error` headers.
    pub application_name: String,
    /// Mount point of the entity routes, e.g. `/api`.
    pub api_prefix: String,
    pub bind_addr: String,
    pub max_body_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_url: DEFAULT_DATABASE_URL.into(),
            database_max_connections: 5,
            elasticsearch_url: DEFAULT_ELASTICSEARCH_URL.into(),
            search_index_name: "point".into(),
            search_refresh: true,
            application_name: "pointsApp".into(),
            api_prefix: "/api".into(),
            bind_addr: "0.0.0.0:8080".into(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut s = Settings::default();
        if let Some(v) = lookup("DATABASE_URL") {
            s.database_url = v;
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            s.database_max_connections = parse("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("ELASTICSEARCH_URL") {
            s.elasticsearch_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = lookup("SEARCH_INDEX_NAME") {
            s.search_index_name = v;
        }
        if let Some(v) = lookup("SEARCH_REFRESH") {
            s.search_refresh = parse("SEARCH_REFRESH", &v)?;
        }
        if let Some(v) = lookup("APP_NAME") {
            s.application_name = v;
        }
        if let Some(v) = lookup("API_PREFIX") {
            s.api_prefix = normalize_prefix(&v);
        }
        if let Some(v) = lookup("BIND_ADDR") {
            s.bind_addr = v;
        }
        if let Some(v) = lookup("MAX_BODY_BYTES") {
            s.max_body_bytes = parse("MAX_BODY_BYTES", &v)?;
        }
        Ok(s)
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

/// `api/` and `/api/` both become `/api`; empty stays empty (routes at the root).
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
