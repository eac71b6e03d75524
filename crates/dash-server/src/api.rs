use crate::{handlers, state::AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// 创建 API 路由
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // 健康检查
        .route("/health", get(health_check))

        // 主机指标
        .route("/api/status", get(handlers::get_status))
        .route("/api/metrics/history", get(handlers::get_history))

        // 容器管理
        .route("/api/docker/list", get(handlers::list_containers))
        .route("/api/docker/restart", post(handlers::restart_container))
        .route("/api/docker/logs", get(handlers::container_logs))

        // 调试
        .route("/api/debug/stress", post(handlers::stress_cpu).get(handlers::stress_cpu))

        // 自身指标
        .route("/metrics", get(handlers::export_metrics))

        // 添加中间件
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 健康检查
async fn health_check() -> &'static str {
    "OK"
}
