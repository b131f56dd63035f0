//! Shared data models for the monitoring service.

pub mod metrics;

// Re-export commonly used types
pub use metrics::{DerivedMetrics, HealthState, MonitorConfigInfo, RawStatsSnapshot};
