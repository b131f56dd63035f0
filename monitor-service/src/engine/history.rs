//! Bounded rolling history of derived metrics.

use std::collections::VecDeque;

use common::models::DerivedMetrics;

/// Fixed-capacity FIFO ring of the most recent samples.
///
/// Not thread-safe on its own; the collector serializes all access behind
/// its poll lock.
#[derive(Debug)]
pub struct HistoryBuffer {
    capacity: usize,
    samples: VecDeque<DerivedMetrics>,
}

impl HistoryBuffer {
    /// Creates an empty buffer holding at most `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            samples: VecDeque::with_capacity(capacity.max(1)),
        }
    }

    /// Appends a sample, evicting from the front once capacity is exceeded.
    pub fn append(&mut self, sample: DerivedMetrics) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Returns a copy of the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<DerivedMetrics> {
        self.samples.iter().cloned().collect()
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer holds no samples yet.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::models::HealthState;

    fn sample(queries_per_second: f64) -> DerivedMetrics {
        DerivedMetrics {
            timestamp: Utc::now(),
            active_connections: 1,
            queries_per_second,
            slow_queries_total: 0,
            uptime_seconds: 60,
            uptime_formatted: "1m 0s".to_string(),
            database_size_mb: 1.0,
            cpu_usage_percent: 10.0,
            memory_usage_percent: 10.0,
            health_status: HealthState::Up,
        }
    }

    #[test]
    fn test_append_preserves_insertion_order() {
        let mut buffer = HistoryBuffer::new(5);
        for i in 0..3 {
            buffer.append(sample(i as f64));
        }
        let rates: Vec<f64> = buffer
            .snapshot()
            .iter()
            .map(|m| m.queries_per_second)
            .collect();
        assert_eq!(rates, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_capacity_never_exceeded() {
        let mut buffer = HistoryBuffer::new(20);
        for i in 0..50 {
            buffer.append(sample(i as f64));
            assert!(buffer.len() <= 20);
        }
        assert_eq!(buffer.len(), 20);
    }

    #[test]
    fn test_fifo_eviction() {
        let mut buffer = HistoryBuffer::new(3);
        for i in 0..4 {
            buffer.append(sample(i as f64));
        }
        let rates: Vec<f64> = buffer
            .snapshot()
            .iter()
            .map(|m| m.queries_per_second)
            .collect();
        // The oldest sample (0.0) is gone, order preserved
        assert_eq!(rates, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut buffer = HistoryBuffer::new(3);
        buffer.append(sample(1.0));
        let copy = buffer.snapshot();
        buffer.append(sample(2.0));
        assert_eq!(copy.len(), 1);
        assert_eq!(buffer.len(), 2);
    }
}
