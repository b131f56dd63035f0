//! Application state for the monitor service.

use std::sync::Arc;

use common::config::AppConfig;

use crate::engine::MetricsMonitor;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub monitor: Arc<MetricsMonitor>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(config: AppConfig, monitor: Arc<MetricsMonitor>) -> Self {
        Self { config, monitor }
    }
}
