//! Rate calculation over cumulative counters.

use common::models::RawStatsSnapshot;

/// A computed per-second rate for one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSample {
    /// Queries per second since the previous snapshot. Always >= 0.
    pub queries_per_second: f64,
    /// True on the first poll, when no previous snapshot exists and the
    /// rate defaults to zero.
    pub warm_up: bool,
}

/// Computes the query rate between two successive snapshots.
///
/// `last_rate` is the rate from the previous cycle; it is reused verbatim
/// when elapsed time is non-positive (duplicate poll or clock skew), so a
/// bad clock never divides by zero or surfaces as an error.
///
/// A counter lower than the previous reading means the server restarted and
/// the counter reset to zero; the current value is then taken as the whole
/// delta.
pub fn query_rate(
    previous: Option<&RawStatsSnapshot>,
    current: &RawStatsSnapshot,
    last_rate: f64,
) -> RateSample {
    let Some(previous) = previous else {
        return RateSample {
            queries_per_second: 0.0,
            warm_up: true,
        };
    };

    let elapsed_seconds =
        (current.timestamp - previous.timestamp).num_milliseconds() as f64 / 1000.0;
    if elapsed_seconds <= 0.0 {
        return RateSample {
            queries_per_second: last_rate.max(0.0),
            warm_up: false,
        };
    }

    let delta = if current.cumulative_queries >= previous.cumulative_queries {
        current.cumulative_queries - previous.cumulative_queries
    } else {
        // Counter reset: assume reset-to-zero semantics
        current.cumulative_queries
    };

    RateSample {
        queries_per_second: (delta as f64 / elapsed_seconds).max(0.0),
        warm_up: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn snapshot(queries: u64, timestamp: DateTime<Utc>) -> RawStatsSnapshot {
        RawStatsSnapshot {
            timestamp,
            cumulative_queries: queries,
            cumulative_connections: 0,
            cumulative_slow_queries: 0,
            current_connections: 0,
            uptime_seconds: 0,
            data_size_bytes: 0,
            buffer_pool_bytes: None,
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_first_poll_is_warm_up() {
        let current = snapshot(1000, at(0));
        let sample = query_rate(None, &current, 0.0);
        assert_eq!(sample.queries_per_second, 0.0);
        assert!(sample.warm_up);
    }

    #[test]
    fn test_exact_quotient() {
        let previous = snapshot(1000, at(0));
        let current = snapshot(1450, at(10));
        let sample = query_rate(Some(&previous), &current, 0.0);
        assert_eq!(sample.queries_per_second, 45.0);
        assert!(!sample.warm_up);
    }

    #[test]
    fn test_zero_elapsed_reuses_last_rate() {
        let previous = snapshot(1000, at(10));
        let current = snapshot(1450, at(10));
        let sample = query_rate(Some(&previous), &current, 33.5);
        assert_eq!(sample.queries_per_second, 33.5);
    }

    #[test]
    fn test_negative_elapsed_reuses_last_rate() {
        let previous = snapshot(1000, at(20));
        let current = snapshot(1450, at(10));
        let sample = query_rate(Some(&previous), &current, 12.0);
        assert_eq!(sample.queries_per_second, 12.0);
    }

    #[test]
    fn test_counter_reset_uses_current_value_as_delta() {
        let previous = snapshot(1000, at(0));
        let current = snapshot(50, at(10));
        let sample = query_rate(Some(&previous), &current, 100.0);
        assert_eq!(sample.queries_per_second, 5.0);
    }

    #[test]
    fn test_rate_never_negative() {
        let previous = snapshot(1000, at(0));
        for queries in [0u64, 50, 999, 1000, 5000] {
            let current = snapshot(queries, at(7));
            let sample = query_rate(Some(&previous), &current, 0.0);
            assert!(sample.queries_per_second >= 0.0, "queries={}", queries);
        }
    }

    #[test]
    fn test_unchanged_counter_is_zero_rate() {
        let previous = snapshot(1000, at(0));
        let current = snapshot(1000, at(5));
        let sample = query_rate(Some(&previous), &current, 88.0);
        assert_eq!(sample.queries_per_second, 0.0);
    }
}
