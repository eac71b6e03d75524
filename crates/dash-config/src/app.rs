use dash_metrics::CooldownPolicy;
use dash_notify::TelegramConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 应用配置
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub alert: AlertConfig,
    pub telegram: TelegramConfig,
    pub recorder: RecorderConfig,
    pub retention: RetentionConfig,
    pub history: HistoryConfig,
    pub docker: DockerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    /// 启动时连接尝试次数
    pub connect_attempts: u32,
    pub connect_retry_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AlertConfig {
    /// CPU 告警阈值（百分比）
    pub threshold: f64,
    pub cooldown_secs: u64,
    pub cooldown_policy: CooldownPolicy,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RecorderConfig {
    pub interval_secs: u64,
    /// CPU 采样窗口（毫秒）
    pub cpu_window_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetentionConfig {
    pub horizon_hours: u64,
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// 历史查询默认条数，同时也是上限
    pub limit: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DockerConfig {
    pub binary: String,
    /// 只管理名称包含该字符串的容器
    pub name_filter: String,
    pub log_tail: usize,
    pub restart_delay_ms: u64,
    pub restart_queue_capacity: usize,
    pub command_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

// 默认值函数
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_database_url() -> String {
    "sqlite::memory:".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// Default trait 实现
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            connect_attempts: 10,
            connect_retry_secs: 2,
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            threshold: dash_metrics::DEFAULT_THRESHOLD,
            cooldown_secs: dash_metrics::DEFAULT_COOLDOWN_SECS as u64,
            cooldown_policy: CooldownPolicy::default(),
        }
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            cpu_window_ms: 1000,
        }
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            horizon_hours: 24,
            sweep_interval_secs: 3600,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { limit: 20 }
    }
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            binary: "docker".to_string(),
            name_filter: "dash".to_string(),
            log_tail: 100,
            restart_delay_ms: 1000,
            restart_queue_capacity: 16,
            command_timeout_secs: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl RecorderConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn cpu_window(&self) -> Duration {
        Duration::from_millis(self.cpu_window_ms)
    }
}

impl RetentionConfig {
    pub fn horizon(&self) -> chrono::Duration {
        chrono::Duration::hours(self.horizon_hours as i64)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl AlertConfig {
    pub fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cooldown_secs as i64)
    }
}

impl DockerConfig {
    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.alert.threshold, 80.0);
        assert_eq!(config.alert.cooldown_secs, 600);
        assert_eq!(config.alert.cooldown_policy, CooldownPolicy::OnDelivery);
        assert_eq!(config.recorder.interval(), Duration::from_secs(5));
        assert_eq!(config.retention.horizon(), chrono::Duration::hours(24));
        assert_eq!(config.retention.sweep_interval(), Duration::from_secs(3600));
        assert_eq!(config.history.limit, 20);
        assert_eq!(config.docker.restart_delay(), Duration::from_secs(1));
        assert_eq!(config.logging.level, "info");
    }
}
