//! Handler模块

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use common::models::{DerivedMetrics, HealthState, MonitorConfigInfo};

use crate::state::AppState;

/// 获取最新性能指标
///
/// 永远返回 200 与完整的指标结构；数据库不可达时 `health_status` 为 DOWN。
#[utoipa::path(
    get,
    path = "/api/metrics",
    tag = "metrics",
    responses(
        (status = 200, description = "最新一轮采集的指标", body = DerivedMetrics)
    )
)]
pub async fn get_metrics(State(state): State<AppState>) -> Json<DerivedMetrics> {
    match state.monitor.latest().await {
        Some(metrics) => Json(metrics),
        // No poll cycle has completed yet
        None => Json(unavailable_metrics()),
    }
}

/// 获取趋势图历史数据（最旧在前）
#[utoipa::path(
    get,
    path = "/api/history",
    tag = "metrics",
    responses(
        (status = 200, description = "滚动历史采样", body = Vec<DerivedMetrics>)
    )
)]
pub async fn get_history(State(state): State<AppState>) -> Json<Vec<DerivedMetrics>> {
    Json(state.monitor.history().await)
}

/// 健康检查端点
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "当前健康状态", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (health_status, timestamp) = match state.monitor.latest().await {
        Some(metrics) => (metrics.health_status, metrics.timestamp),
        None => (HealthState::Down(None), Utc::now()),
    };
    Json(HealthResponse {
        health_status,
        timestamp,
    })
}

/// 获取非敏感配置信息
#[utoipa::path(
    get,
    path = "/api/config",
    tag = "config",
    responses(
        (status = 200, description = "监控配置回显", body = MonitorConfigInfo)
    )
)]
pub async fn get_config(State(state): State<AppState>) -> Json<MonitorConfigInfo> {
    let config = &state.config;
    Json(MonitorConfigInfo {
        database_host: config.db_host.clone(),
        database_port: config.db_port,
        database_name: config.db_name.clone(),
        refresh_interval_seconds: config.monitor.refresh_interval_seconds,
        max_history_points: config.monitor.max_history_points,
        slow_query_threshold_seconds: config.monitor.slow_query_threshold_seconds,
        connection_alert_threshold: config.monitor.connection_alert_threshold,
        slow_query_alert_threshold: config.monitor.slow_query_alert_threshold,
    })
}

/// 健康检查响应
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// 当前健康状态
    #[schema(value_type = String, example = "UP")]
    pub health_status: HealthState,
    /// 采样时间戳
    pub timestamp: DateTime<Utc>,
}

fn unavailable_metrics() -> DerivedMetrics {
    DerivedMetrics {
        timestamp: Utc::now(),
        active_connections: 0,
        queries_per_second: 0.0,
        slow_queries_total: 0,
        uptime_seconds: 0,
        uptime_formatted: "0s".to_string(),
        database_size_mb: 0.0,
        cpu_usage_percent: 0.0,
        memory_usage_percent: 0.0,
        health_status: HealthState::Down(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_metrics_is_down() {
        let metrics = unavailable_metrics();
        assert_eq!(metrics.health_status, HealthState::Down(None));
        assert_eq!(metrics.queries_per_second, 0.0);
        assert_eq!(metrics.uptime_formatted, "0s");
    }
}
