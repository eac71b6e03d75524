use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 容器信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerInfo {
    pub id: String,
    pub name: String,
    pub state: String,
    pub status: String,
}

/// 容器运行时错误
#[derive(Debug, Error)]
pub enum RuntimeControlError {
    #[error("Container runtime unavailable: {0}")]
    Unavailable(String),

    #[error("Command `{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Command `{0}` timed out")]
    Timeout(String),

    #[error("Failed to parse runtime output: {0}")]
    Parse(String),

    #[error("Invalid container id: {0:?}")]
    InvalidId(String),

    #[error("Restart queue is full")]
    QueueFull,

    #[error("Restart queue is closed")]
    QueueClosed,
}

/// 容器运行时抽象
///
/// 容器以不透明的 ID 标识。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// 列出全部容器（包括已停止的）
    async fn list(&self) -> Result<Vec<ContainerInfo>, RuntimeControlError>;

    async fn start(&self, id: &str) -> Result<(), RuntimeControlError>;

    async fn stop(&self, id: &str) -> Result<(), RuntimeControlError>;

    async fn restart(&self, id: &str) -> Result<(), RuntimeControlError>;

    /// 最近 `tail` 行日志，stdout 与 stderr 合并
    async fn logs(&self, id: &str, tail: usize) -> Result<String, RuntimeControlError>;
}

/// 校验容器 ID
pub(crate) fn validate_id(id: &str) -> Result<&str, RuntimeControlError> {
    let trimmed = id.trim();
    if trimmed.is_empty() || trimmed.starts_with('-') {
        return Err(RuntimeControlError::InvalidId(id.to_string()));
    }
    Ok(trimmed)
}
