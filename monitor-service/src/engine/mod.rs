//! Metrics derivation engine.
//!
//! Converts raw counter snapshots into rate-based metrics, keeps a bounded
//! rolling history for charting, and classifies overall health.

pub mod collector;
pub mod health;
pub mod history;
pub mod rate;

pub use collector::MetricsMonitor;
pub use health::HealthThresholds;
pub use history::HistoryBuffer;
