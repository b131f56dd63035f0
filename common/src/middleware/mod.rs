//! HTTP middleware shared across services.

pub mod request_id;
