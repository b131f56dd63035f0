//! Shared library for the MySQL monitoring service.
//!
//! Contains configuration loading, the stats error taxonomy, metric data
//! models, formatting helpers, and HTTP middleware.

pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod utils;
