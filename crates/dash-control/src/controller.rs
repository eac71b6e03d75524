use crate::runtime::{validate_id, ContainerInfo, ContainerRuntime, RuntimeControlError};
use std::sync::Arc;
use tracing::debug;

/// 容器控制器
///
/// 只暴露名称包含 `name_filter` 的受管容器。
#[derive(Clone)]
pub struct ContainerController {
    runtime: Arc<dyn ContainerRuntime>,
    name_filter: String,
    log_tail: usize,
}

impl ContainerController {
    pub fn new(runtime: Arc<dyn ContainerRuntime>, name_filter: impl Into<String>) -> Self {
        Self {
            runtime,
            name_filter: name_filter.into(),
            log_tail: 100,
        }
    }

    pub fn with_log_tail(mut self, log_tail: usize) -> Self {
        self.log_tail = log_tail;
        self
    }

    pub fn runtime(&self) -> Arc<dyn ContainerRuntime> {
        self.runtime.clone()
    }

    /// 列出受管容器
    pub async fn list_managed(&self) -> Result<Vec<ContainerInfo>, RuntimeControlError> {
        let containers = self.runtime.list().await?;
        let total = containers.len();

        let managed: Vec<ContainerInfo> = containers
            .into_iter()
            .filter(|c| c.name.contains(&self.name_filter))
            .collect();

        debug!(total, managed = managed.len(), filter = %self.name_filter, "Listed containers");
        Ok(managed)
    }

    /// 获取容器最近日志
    pub async fn logs(&self, id: &str) -> Result<String, RuntimeControlError> {
        let id = validate_id(id)?;
        self.runtime.logs(id, self.log_tail).await
    }
}
