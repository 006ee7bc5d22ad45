//! Shared application state for all routes.

use crate::config::Settings;
use crate::service::PointService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub points: PointService,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(points: PointService, settings: Settings) -> Self {
        AppState {
            points,
            settings: Arc::new(settings),
        }
    }
}
