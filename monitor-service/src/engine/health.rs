//! Health classification from threshold rules.

use common::config::MonitorConfig;
use common::models::HealthState;

/// Soft thresholds above which a reachable server reports WARNING.
#[derive(Debug, Clone, Copy)]
pub struct HealthThresholds {
    /// Active connection count ceiling.
    pub connection_alert: u32,
    /// Total slow query count ceiling.
    pub slow_query_alert: u64,
    /// Estimated CPU usage ceiling, percent.
    pub cpu_alert: f64,
    /// Estimated memory usage ceiling, percent.
    pub memory_alert: f64,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            connection_alert: 100,
            slow_query_alert: 100,
            cpu_alert: 80.0,
            memory_alert: 90.0,
        }
    }
}

impl From<&MonitorConfig> for HealthThresholds {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            connection_alert: config.connection_alert_threshold,
            slow_query_alert: config.slow_query_alert_threshold,
            ..Default::default()
        }
    }
}

impl HealthThresholds {
    /// Classifies the latest sample.
    ///
    /// Pure function of its inputs: the same fields and thresholds always
    /// yield the same state. DOWN is never produced here; unreachability is
    /// decided by the collector before any fields exist to evaluate.
    pub fn evaluate(
        &self,
        active_connections: u32,
        slow_queries_total: u64,
        cpu_usage_percent: f64,
        memory_usage_percent: f64,
    ) -> HealthState {
        let mut reasons: Vec<&str> = Vec::new();

        if active_connections > self.connection_alert {
            reasons.push("high connection count");
        }
        if slow_queries_total > self.slow_query_alert {
            reasons.push("elevated slow queries");
        }
        if cpu_usage_percent > self.cpu_alert {
            reasons.push("high cpu load");
        }
        if memory_usage_percent > self.memory_alert {
            reasons.push("high memory usage");
        }

        if reasons.is_empty() {
            HealthState::Up
        } else {
            HealthState::Warning(reasons.join(", "))
        }
    }
}
