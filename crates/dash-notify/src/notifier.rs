use crate::message::AlertMessage;
use async_trait::async_trait;

/// 通知错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    /// 凭据缺失，未发起任何网络请求
    #[error("Notifier is not configured")]
    Unconfigured,

    #[error("Notification delivery failed: {0}")]
    DeliveryFailed(String),
}

impl NotifyError {
    /// 用作指标标签的简短原因
    pub fn reason(&self) -> &'static str {
        match self {
            NotifyError::Unconfigured => "unconfigured",
            NotifyError::DeliveryFailed(_) => "delivery_failed",
        }
    }
}

/// 通知器 trait
#[async_trait]
pub trait Notifier: Send + Sync {
    /// 发送通知
    async fn send(&self, message: &AlertMessage) -> Result<(), NotifyError>;

    /// 通知器名称
    fn name(&self) -> &str;

    /// 凭据是否齐全；为 false 时调用方可以跳过发送
    fn is_configured(&self) -> bool {
        true
    }

    /// 发送负载告警
    async fn notify(&self, cpu: f64, ram: f64) -> Result<(), NotifyError> {
        self.send(&AlertMessage::high_load(cpu, ram)).await
    }
}
