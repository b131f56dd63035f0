//! Monitoring and performance metrics models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

/// One raw reading of the server's runtime counters and gauges.
///
/// Produced once per poll cycle and never mutated afterwards. The
/// `cumulative_*` fields are monotonically increasing counters that reset
/// only when the server restarts.
#[derive(Debug, Clone, PartialEq)]
pub struct RawStatsSnapshot {
    /// Wall-clock time the reading was taken.
    pub timestamp: DateTime<Utc>,
    /// Total queries served since server startup (`Questions`).
    pub cumulative_queries: u64,
    /// Total connection attempts since server startup (`Connections`).
    pub cumulative_connections: u64,
    /// Total slow queries since server startup (`Slow_queries`).
    pub cumulative_slow_queries: u64,
    /// Currently connected threads (`Threads_connected`).
    pub current_connections: u32,
    /// Server uptime in seconds (`Uptime`).
    pub uptime_seconds: u64,
    /// Total data + index size across all schemas, in bytes.
    pub data_size_bytes: u64,
    /// InnoDB buffer pool size in bytes, when readable.
    pub buffer_pool_bytes: Option<u64>,
}

/// Derived metrics for one poll cycle.
///
/// The authoritative output of the metrics engine; serialized as-is by the
/// API layer. `cpu_usage_percent` and `memory_usage_percent` are heuristic
/// estimates derived from connection count and query rate, not OS-level
/// measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DerivedMetrics {
    /// Wall-clock time of the poll cycle.
    pub timestamp: DateTime<Utc>,
    /// Currently connected threads.
    pub active_connections: u32,
    /// Query throughput since the previous poll. Always >= 0.
    pub queries_per_second: f64,
    /// Total slow queries since server startup.
    #[serde(rename = "slow_queries")]
    pub slow_queries_total: u64,
    /// Server uptime in seconds.
    pub uptime_seconds: u64,
    /// Uptime in human-readable form, e.g. "1d 0h".
    pub uptime_formatted: String,
    /// Total data size in megabytes, one decimal place.
    pub database_size_mb: f64,
    /// Estimated CPU usage, 0-100.
    pub cpu_usage_percent: f64,
    /// Estimated memory usage, 0-100.
    pub memory_usage_percent: f64,
    /// Overall health classification.
    #[schema(value_type = String, example = "UP")]
    pub health_status: HealthState,
}

/// Coarse health classification of the monitored server.
///
/// Recomputed fresh each cycle from the latest sample only; there is no
/// hysteresis, so a single over-threshold sample reports `Warning` and a
/// single failed poll reports `Down`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthState {
    /// Reachable, all thresholds respected.
    Up,
    /// Reachable, but one or more soft thresholds tripped. The string names
    /// every tripped threshold, comma-separated.
    Warning(String),
    /// Unreachable, or the poll failed entirely. Carries a reason for
    /// failures that will not self-heal (e.g. missing privileges).
    Down(Option<String>),
}

impl HealthState {
    /// Whether the server was reachable this cycle.
    pub fn is_reachable(&self) -> bool {
        !matches!(self, HealthState::Down(_))
    }
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthState::Up => write!(f, "UP"),
            HealthState::Warning(reason) => write!(f, "WARNING: {}", reason),
            HealthState::Down(None) => write!(f, "DOWN"),
            HealthState::Down(Some(reason)) => write!(f, "DOWN: {}", reason),
        }
    }
}

impl std::str::FromStr for HealthState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "UP" {
            Ok(HealthState::Up)
        } else if let Some(reason) = s.strip_prefix("WARNING: ") {
            Ok(HealthState::Warning(reason.to_string()))
        } else if s == "DOWN" {
            Ok(HealthState::Down(None))
        } else if let Some(reason) = s.strip_prefix("DOWN: ") {
            Ok(HealthState::Down(Some(reason.to_string())))
        } else {
            Err(format!("unrecognized health state: {}", s))
        }
    }
}

// On the wire the health state is a plain string ("UP", "WARNING: ...",
// "DOWN"), matching what the dashboard frontend matches against.
impl Serialize for HealthState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for HealthState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Non-sensitive configuration echo served by `GET /api/config`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonitorConfigInfo {
    /// Monitored server host.
    pub database_host: String,
    /// Monitored server port.
    pub database_port: u16,
    /// Database name used for the connection.
    pub database_name: String,
    /// Seconds between poll cycles.
    pub refresh_interval_seconds: u64,
    /// History buffer capacity.
    pub max_history_points: usize,
    /// Slow query duration threshold in seconds.
    pub slow_query_threshold_seconds: f64,
    /// Connection count WARNING threshold.
    pub connection_alert_threshold: u32,
    /// Slow query count WARNING threshold.
    pub slow_query_alert_threshold: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metrics() -> DerivedMetrics {
        DerivedMetrics {
            timestamp: Utc::now(),
            active_connections: 12,
            queries_per_second: 45.0,
            slow_queries_total: 3,
            uptime_seconds: 86400,
            uptime_formatted: "1d 0h".to_string(),
            database_size_mb: 512.5,
            cpu_usage_percent: 34.5,
            memory_usage_percent: 28.1,
            health_status: HealthState::Up,
        }
    }

    #[test]
    fn test_wire_field_names() {
        let value = serde_json::to_value(sample_metrics()).unwrap();
        let object = value.as_object().unwrap();
        for field in [
            "active_connections",
            "queries_per_second",
            "slow_queries",
            "uptime_seconds",
            "uptime_formatted",
            "database_size_mb",
            "cpu_usage_percent",
            "memory_usage_percent",
            "health_status",
            "timestamp",
        ] {
            assert!(object.contains_key(field), "missing field {}", field);
        }
        assert!(!object.contains_key("slow_queries_total"));
    }

    #[test]
    fn test_health_state_strings() {
        assert_eq!(HealthState::Up.to_string(), "UP");
        assert_eq!(
            HealthState::Warning("high connection count".into()).to_string(),
            "WARNING: high connection count"
        );
        assert_eq!(HealthState::Down(None).to_string(), "DOWN");
        assert_eq!(
            HealthState::Down(Some("insufficient privileges: missing PROCESS".into())).to_string(),
            "DOWN: insufficient privileges: missing PROCESS"
        );
    }

    #[test]
    fn test_health_state_roundtrip() {
        for state in [
            HealthState::Up,
            HealthState::Warning("elevated slow queries".into()),
            HealthState::Down(None),
        ] {
            let json = serde_json::to_string(&state).unwrap();
            let parsed: HealthState = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, state);
        }
    }
}
