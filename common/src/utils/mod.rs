//! Utility functions shared across the workspace.

pub mod format;

pub use format::format_uptime;
