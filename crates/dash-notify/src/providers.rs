use crate::message::AlertMessage;
use crate::notifier::{Notifier, NotifyError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

// ============================================================================
// Telegram 通知
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// 机器人令牌
    pub bot_token: String,
    /// 目标会话 ID
    pub chat_id: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            ..Self::default()
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.bot_token.is_empty() && !self.chat_id.is_empty()
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            api_base: "https://api.telegram.org".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

pub struct TelegramNotifier {
    config: TelegramConfig,
    client: reqwest::Client,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_base.trim_end_matches('/'),
            self.config.bot_token
        )
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, message: &AlertMessage) -> Result<(), NotifyError> {
        if !self.config.is_configured() {
            debug!("Telegram credentials missing, skipping notification");
            return Err(NotifyError::Unconfigured);
        }

        let body = SendMessageRequest {
            chat_id: &self.config.chat_id,
            text: &message.text,
            parse_mode: "HTML",
        };

        let response = self
            .client
            .post(self.endpoint())
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .json(&body)
            .send()
            .await
            // 请求 URL 中包含机器人令牌，错误文本里不能带上它
            .map_err(|e| NotifyError::DeliveryFailed(e.without_url().to_string()))?;

        if !response.status().is_success() {
            return Err(NotifyError::DeliveryFailed(format!(
                "Telegram responded with status: {}",
                response.status()
            )));
        }

        info!(cpu = message.cpu, ram = message.ram, "Telegram alert delivered");
        Ok(())
    }

    fn name(&self) -> &str {
        "telegram"
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }
}
