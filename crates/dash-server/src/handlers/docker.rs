use crate::{
    error::{ApiError, Result},
    models::*,
    state::AppState,
};
use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use dash_control::ContainerInfo;
use std::time::Duration;
use tracing::info;

/// 受管容器列表
pub async fn list_containers(State(state): State<AppState>) -> Result<Json<Vec<ContainerInfo>>> {
    let containers = state.controller.list_managed().await?;
    Ok(Json(containers))
}

/// 延迟重启容器，请求立即返回
pub async fn restart_container(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessageResponse>> {
    let req: RestartRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid restart request: {}", e)))?;

    info!(container_id = %req.container_id, "Restart requested");
    state.restart_queue.enqueue(&req.container_id)?;

    Ok(Json(MessageResponse::new(format!(
        "Restart command received. Restarting in {}...",
        describe_delay(state.restart_queue.delay())
    ))))
}

/// 容器最近日志（纯文本）
pub async fn container_logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Result<String> {
    let id = query
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Container ID is required".to_string()))?;

    let logs = state.controller.logs(&id).await?;
    Ok(logs)
}

fn describe_delay(delay: Duration) -> String {
    let millis = delay.as_millis();
    if millis % 1000 != 0 {
        return format!("{} milliseconds", millis);
    }

    match millis / 1000 {
        1 => "1 second".to_string(),
        secs => format!("{} seconds", secs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_delay() {
        assert_eq!(describe_delay(Duration::from_secs(1)), "1 second");
        assert_eq!(describe_delay(Duration::from_secs(3)), "3 seconds");
        assert_eq!(describe_delay(Duration::from_millis(250)), "250 milliseconds");
    }
}
