//! Metrics snapshot builder.
//!
//! Orchestrates one poll cycle: fetch raw stats, derive rates and
//! estimates, classify health, and record the sample in the rolling
//! history. All mutable poll state lives behind a single lock so exactly
//! one cycle executes at a time.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use common::errors::StatsError;
use common::models::{DerivedMetrics, HealthState, RawStatsSnapshot};
use common::utils::format_uptime;

use crate::engine::health::HealthThresholds;
use crate::engine::history::HistoryBuffer;
use crate::engine::rate::query_rate;
use crate::stats_source::StatsSource;

/// State mutated by the poll cycle. Single writer, guarded by the monitor
/// lock.
struct PollState {
    previous: Option<RawStatsSnapshot>,
    last_rate: f64,
    latest: Option<DerivedMetrics>,
    history: HistoryBuffer,
}

/// The metrics engine: owns the poll state and produces one
/// [`DerivedMetrics`] per cycle.
///
/// Each instance is independent, so tests and multi-monitor setups can run
/// side by side without shared globals.
pub struct MetricsMonitor {
    source: Arc<dyn StatsSource>,
    thresholds: HealthThresholds,
    /// Serializes whole poll cycles. Separate from the state lock so a slow
    /// fetch never holds up API reads.
    poll_lock: Mutex<()>,
    state: Mutex<PollState>,
}

impl MetricsMonitor {
    /// Creates a monitor over the given stats source.
    pub fn new(
        source: Arc<dyn StatsSource>,
        thresholds: HealthThresholds,
        max_history_points: usize,
    ) -> Self {
        Self {
            source,
            thresholds,
            poll_lock: Mutex::new(()),
            state: Mutex::new(PollState {
                previous: None,
                last_rate: 0.0,
                latest: None,
                history: HistoryBuffer::new(max_history_points),
            }),
        }
    }

    /// Runs one complete poll cycle and returns the derived sample.
    ///
    /// Never fails: a source error is converted into a DOWN sample with
    /// zeroed rate fields and last-known uptime/size, so the API layer
    /// always has a well-formed body to serve.
    pub async fn poll(&self) -> DerivedMetrics {
        // The fetch runs outside the state lock: latest()/history() must
        // answer promptly even while the server is slow or hung. The poll
        // lock keeps concurrent cycles serialized.
        let _cycle = self.poll_lock.lock().await;
        let fetched = self.source.fetch().await;

        let mut state = self.state.lock().await;
        let metrics = match fetched {
            Ok(snapshot) => self.derive(&mut state, snapshot),
            Err(err) => Self::mark_down(&mut state, err),
        };

        state.history.append(metrics.clone());
        state.latest = Some(metrics.clone());
        metrics
    }

    /// Latest completed sample, if at least one poll has run.
    pub async fn latest(&self) -> Option<DerivedMetrics> {
        self.state.lock().await.latest.clone()
    }

    /// Copy of the rolling history, oldest first.
    pub async fn history(&self) -> Vec<DerivedMetrics> {
        self.state.lock().await.history.snapshot()
    }

    fn derive(&self, state: &mut PollState, snapshot: RawStatsSnapshot) -> DerivedMetrics {
        let rate = query_rate(state.previous.as_ref(), &snapshot, state.last_rate);
        if rate.warm_up {
            tracing::debug!("first poll cycle, rate defaults to zero");
        }

        let cpu_usage_percent =
            estimate_cpu(snapshot.current_connections, rate.queries_per_second);
        let memory_usage_percent =
            estimate_memory(snapshot.buffer_pool_bytes, snapshot.current_connections);

        let health_status = self.thresholds.evaluate(
            snapshot.current_connections,
            snapshot.cumulative_slow_queries,
            cpu_usage_percent,
            memory_usage_percent,
        );

        let metrics = DerivedMetrics {
            timestamp: snapshot.timestamp,
            active_connections: snapshot.current_connections,
            queries_per_second: rate.queries_per_second,
            slow_queries_total: snapshot.cumulative_slow_queries,
            uptime_seconds: snapshot.uptime_seconds,
            uptime_formatted: format_uptime(snapshot.uptime_seconds),
            database_size_mb: round_mb(snapshot.data_size_bytes),
            cpu_usage_percent,
            memory_usage_percent,
            health_status,
        };

        state.last_rate = rate.queries_per_second;
        state.previous = Some(snapshot);

        tracing::info!(
            health = %metrics.health_status,
            qps = metrics.queries_per_second,
            connections = metrics.active_connections,
            "poll cycle completed"
        );
        metrics
    }

    /// Builds the DOWN sample for a failed poll. Rate and connection fields
    /// are zeroed; uptime and size keep their last-known values so the
    /// dashboard does not flicker to zero on a transient outage.
    fn mark_down(state: &mut PollState, err: StatsError) -> DerivedMetrics {
        if err.is_transient() {
            tracing::warn!(error = %err, "poll failed, next scheduled poll will retry");
        } else {
            tracing::error!(error = %err, "poll failed and will not self-heal");
        }

        let reason = match &err {
            StatsError::Permission(_) => Some(err.to_string()),
            _ => None,
        };

        let last = state.latest.as_ref();
        DerivedMetrics {
            timestamp: Utc::now(),
            active_connections: 0,
            queries_per_second: 0.0,
            slow_queries_total: last.map(|m| m.slow_queries_total).unwrap_or(0),
            uptime_seconds: last.map(|m| m.uptime_seconds).unwrap_or(0),
            uptime_formatted: last
                .map(|m| m.uptime_formatted.clone())
                .unwrap_or_else(|| "0s".to_string()),
            database_size_mb: last.map(|m| m.database_size_mb).unwrap_or(0.0),
            cpu_usage_percent: 0.0,
            memory_usage_percent: 0.0,
            health_status: HealthState::Down(reason),
        }
    }
}

/// Estimated CPU usage from connection count and query rate.
///
/// Heuristic, not an OS measurement: base server overhead plus a capped
/// contribution per connection and per query.
fn estimate_cpu(active_connections: u32, queries_per_second: f64) -> f64 {
    let base_load = 5.0;
    let connection_load = (active_connections as f64 * 2.0).min(30.0);
    let query_load = (queries_per_second * 0.5).min(40.0);
    round1((base_load + connection_load + query_load).min(100.0))
}

/// Estimated memory usage from buffer pool size and connection count.
///
/// Heuristic: buffer pool plus ~2 MB per connection plus fixed overhead,
/// as a share of an assumed 8 GB host.
fn estimate_memory(buffer_pool_bytes: Option<u64>, active_connections: u32) -> f64 {
    const SYSTEM_MEMORY_MB: f64 = 8192.0;
    let buffer_pool_mb = buffer_pool_bytes.unwrap_or(0) as f64 / (1024.0 * 1024.0);
    let connection_mb = active_connections as f64 * 2.0;
    let overhead_mb = 100.0;
    let used = buffer_pool_mb + connection_mb + overhead_mb;
    round1((used / SYSTEM_MEMORY_MB * 100.0).min(100.0))
}

fn round_mb(bytes: u64) -> f64 {
    round1(bytes as f64 / (1024.0 * 1024.0))
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
