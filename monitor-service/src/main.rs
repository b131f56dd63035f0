//! MySQL 性能监控服务
//!
//! 以固定周期轮询 MySQL 运行时状态计数器，派生吞吐率、连接数与健康状态，
//! 并通过 JSON API 提供：
//! - 最新指标与滚动历史（趋势图数据）
//! - 健康状态
//! - 配置回显

mod engine;
mod handlers;
mod routes;
mod state;
mod stats_source;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{middleware, routing::get, Json, Router};
use common::config::AppConfig;
use common::middleware::request_id::request_id_middleware;
use engine::{HealthThresholds, MetricsMonitor};
use sqlx::mysql::MySqlPoolOptions;
use state::AppState;
use stats_source::MySqlStatsSource;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

const SERVICE_NAME: &str = "monitor-service";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MySQL 监控服务 API",
        version = "0.1.0",
        description = "MySQL 性能监控微服务"
    ),
    paths(
        handlers::get_metrics,
        handlers::get_history,
        handlers::health_check,
        handlers::get_config,
    ),
    components(schemas(
        common::models::DerivedMetrics,
        common::models::MonitorConfigInfo,
        handlers::HealthResponse,
    )),
    tags(
        (name = "metrics", description = "性能指标端点"),
        (name = "health", description = "健康检查端点"),
        (name = "config", description = "配置端点")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (if present) before anything else
    load_dotenv();

    // 初始化日志追踪
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // 加载配置
    let config = AppConfig::load_with_service(SERVICE_NAME);

    // 被监控库的连接池；lazy 连接保证数据库不可达时服务照常启动，
    // 轮询会将其报告为 DOWN
    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect_lazy(&config.database_url())
        .context("invalid database URL")?;

    let source = Arc::new(MySqlStatsSource::new(
        pool,
        Duration::from_secs(config.query_timeout_secs),
    ));
    let monitor = Arc::new(MetricsMonitor::new(
        source,
        HealthThresholds::from(&config.monitor),
        config.monitor.max_history_points,
    ));

    // 固定周期的轮询任务，与请求到达解耦
    spawn_poll_timer(monitor.clone(), config.monitor.refresh_interval_seconds);

    // 创建应用状态与路由
    let state = AppState::new(config.clone(), monitor);
    let app = create_router(state);

    // 启动服务
    let addr = format!("{}:{}", config.host, config.port);
    info!(
        service = SERVICE_NAME,
        address = %addr,
        db_host = %config.db_host,
        refresh_secs = config.monitor.refresh_interval_seconds,
        "启动监控服务"
    );

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

/// Spawns the fixed-interval poll loop driving the metrics engine.
fn spawn_poll_timer(monitor: Arc<MetricsMonitor>, refresh_interval_seconds: u64) {
    tokio::spawn(async move {
        let period = Duration::from_secs(refresh_interval_seconds.max(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            monitor.poll().await;
        }
    });
}

fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::router())
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Load .env file from the working directory (best-effort, no error if missing).
fn load_dotenv() {
    let env_path = std::path::Path::new(".env");
    if env_path.exists() {
        if let Ok(content) = std::fs::read_to_string(env_path) {
            for line in content.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    let key = key.trim();
                    let value = value.trim();
                    // Only set if not already set by the environment
                    if std::env::var(key).is_err() {
                        std::env::set_var(key, value);
                    }
                }
            }
        }
    }
}
