//! Raw stats source.
//!
//! Reads the monitored server's runtime counters and gauges. The trait seam
//! lets the collector be driven by a mock source in tests.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row};

use common::errors::{StatsError, StatsResult};
use common::models::RawStatsSnapshot;

/// A source of raw server statistics.
///
/// Implementations must fail with a distinguishable [`StatsError`] rather
/// than return partial data.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Takes one complete reading of the server's counters and gauges.
    async fn fetch(&self) -> StatsResult<RawStatsSnapshot>;
}

/// Stats source backed by a MySQL connection pool.
///
/// Reads `SHOW GLOBAL STATUS`, `SHOW GLOBAL VARIABLES` and
/// `information_schema.tables`. Every query runs under a deadline so a hung
/// server turns into a failed poll instead of blocking the cycle.
pub struct MySqlStatsSource {
    pool: MySqlPool,
    query_timeout: Duration,
}

impl MySqlStatsSource {
    /// Creates a new MySQL stats source.
    pub fn new(pool: MySqlPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// Runs a query with the configured deadline applied.
    async fn fetch_all(&self, sql: &str) -> StatsResult<Vec<sqlx::mysql::MySqlRow>> {
        tokio::time::timeout(self.query_timeout, sqlx::query(sql).fetch_all(&self.pool))
            .await
            .map_err(|_| StatsError::Timeout(self.query_timeout))?
            .map_err(StatsError::from_sqlx)
    }
}

/// Required counters parsed out of `SHOW GLOBAL STATUS`.
struct StatusCounters {
    uptime_seconds: u64,
    cumulative_queries: u64,
    cumulative_connections: u64,
    cumulative_slow_queries: u64,
    current_connections: u32,
}

/// Parses the status rows, failing if any required counter is absent or
/// unparsable. Partial data never leaves the source: a counter the
/// monitoring account cannot see is a distinguishable permission failure,
/// not a silent zero.
fn status_from_pairs(pairs: &[(String, String)]) -> StatsResult<StatusCounters> {
    fn required<T: std::str::FromStr>(pairs: &[(String, String)], name: &str) -> StatsResult<T> {
        pairs
            .iter()
            .find(|(variable, _)| variable == name)
            .and_then(|(_, value)| value.parse().ok())
            .ok_or_else(|| {
                StatsError::Permission(format!("required counter '{}' unavailable", name))
            })
    }

    Ok(StatusCounters {
        uptime_seconds: required(pairs, "Uptime")?,
        cumulative_queries: required(pairs, "Questions")?,
        cumulative_connections: required(pairs, "Connections")?,
        cumulative_slow_queries: required(pairs, "Slow_queries")?,
        current_connections: required(pairs, "Threads_connected")?,
    })
}

#[async_trait]
impl StatsSource for MySqlStatsSource {
    async fn fetch(&self) -> StatsResult<RawStatsSnapshot> {
        let timestamp = Utc::now();

        let rows = self
            .fetch_all(
                "SHOW GLOBAL STATUS WHERE Variable_name IN \
                 ('Uptime', 'Questions', 'Connections', 'Slow_queries', 'Threads_connected')",
            )
            .await?;

        let pairs: Vec<(String, String)> = rows
            .iter()
            .map(|row| {
                (
                    row.try_get("Variable_name").unwrap_or_default(),
                    row.try_get("Value").unwrap_or_default(),
                )
            })
            .collect();
        let counters = status_from_pairs(&pairs)?;

        let mut snapshot = RawStatsSnapshot {
            timestamp,
            cumulative_queries: counters.cumulative_queries,
            cumulative_connections: counters.cumulative_connections,
            cumulative_slow_queries: counters.cumulative_slow_queries,
            current_connections: counters.current_connections,
            uptime_seconds: counters.uptime_seconds,
            data_size_bytes: 0,
            buffer_pool_bytes: None,
        };

        // Buffer pool size feeds the memory estimate; readable on stock
        // installs but optional on forks without InnoDB.
        let vars = self
            .fetch_all("SHOW GLOBAL VARIABLES LIKE 'innodb_buffer_pool_size'")
            .await?;
        if let Some(row) = vars.first() {
            let value: String = row.try_get("Value").unwrap_or_default();
            snapshot.buffer_pool_bytes = value.parse().ok();
        }

        let size_rows = self
            .fetch_all(
                "SELECT CAST(COALESCE(SUM(DATA_LENGTH + INDEX_LENGTH), 0) AS DOUBLE) AS total_bytes \
                 FROM information_schema.TABLES",
            )
            .await?;
        if let Some(row) = size_rows.first() {
            // CAST to DOUBLE: SUM over BIGINT UNSIGNED would come back as DECIMAL
            snapshot.data_size_bytes = row
                .try_get::<f64, _>("total_bytes")
                .map(|v| v.max(0.0) as u64)
                .unwrap_or(0);
        }

        Ok(snapshot)
    }
}
