use crate::{
    error::{ApiError, Result},
    models::*,
    state::AppState,
};
use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use tracing::debug;

/// 当前 CPU / 内存使用率（按需采样）
pub async fn get_status(State(state): State<AppState>) -> Result<Json<StatusResponse>> {
    let sample = state.sampler.sample().await?;
    Ok(Json(sample.into()))
}

/// 最近的历史采样，按时间正序
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryPoint>>> {
    let limit = query
        .limit
        .unwrap_or(state.history_limit)
        .min(state.history_limit);
    debug!(limit = limit, "Querying metrics history");

    let samples = state.store.recent(limit).await?;

    Ok(Json(samples.into_iter().map(HistoryPoint::from).collect()))
}

/// Prometheus 指标
pub async fn export_metrics(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let body = state
        .metrics
        .export()
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}
