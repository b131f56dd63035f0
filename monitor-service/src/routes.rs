//! 监控服务路由模块

use axum::{http::StatusCode, routing::get, Json, Router};
use serde_json::json;

use crate::handlers;
use crate::state::AppState;

/// 创建监控 API 路由
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/metrics", get(handlers::get_metrics))
        .route("/api/history", get(handlers::get_history))
        .route("/api/health", get(handlers::health_check))
        .route("/api/config", get(handlers::get_config))
        .fallback(not_found)
}

/// 未匹配路由返回 404 JSON
async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not Found",
            "message": "The requested resource was not found",
            "status_code": 404
        })),
    )
}
