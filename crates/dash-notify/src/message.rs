use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 告警消息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertMessage {
    /// 消息正文（HTML 格式）
    pub text: String,

    pub cpu: f64,
    pub ram: f64,

    pub timestamp: DateTime<Utc>,
}

impl AlertMessage {
    /// 服务器高负载告警，数值保留两位小数
    pub fn high_load(cpu: f64, ram: f64) -> Self {
        let text = format!(
            "🚨 <b>Warning: high server load!</b>\n\n⚠️ <b>CPU:</b> {:.2}%\n⚠️ <b>RAM:</b> {:.2}%\n\nImmediate attention required!",
            cpu, ram
        );

        Self {
            text,
            cpu,
            ram,
            timestamp: Utc::now(),
        }
    }
}
