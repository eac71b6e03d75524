use anyhow::{anyhow, Result};
use config::{Config, Environment, File, FileFormat};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::AppConfig;

/// 环境变量前缀，例如 `DASH_ALERT__THRESHOLD=90`
const ENV_PREFIX: &str = "DASH";

/// 加载过程中发现但不致命的问题
///
/// 加载发生在日志初始化之前，所以由调用方在日志就绪后输出。
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigWarning {
    /// 触发问题的环境变量
    pub variable: &'static str,
    pub value: String,
    pub message: String,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?}: {}", self.variable, self.value, self.message)
    }
}

/// 加载结果
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub warnings: Vec<ConfigWarning>,
}

/// 配置加载器
///
/// 优先级从低到高：内置默认值、TOML 文件、`DASH_*` 环境变量、兼容旧部署的环境变量。
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// 创建配置加载器，文件不存在时使用默认值
    pub fn new<P: AsRef<Path>>(config_path: P) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
        }
    }

    /// 从文件和进程环境变量加载配置
    pub fn load(&self) -> Result<LoadedConfig> {
        let mut config = self.build(None)?;
        let warnings = apply_legacy_env(&mut config, |key| std::env::var(key).ok());
        validate(&config)?;
        Ok(LoadedConfig { config, warnings })
    }

    /// 使用给定的环境变量集合加载配置
    pub fn load_with_env(&self, vars: HashMap<String, String>) -> Result<LoadedConfig> {
        let mut config = self.build(Some(vars.clone()))?;
        let warnings = apply_legacy_env(&mut config, |key| vars.get(key).cloned());
        validate(&config)?;
        Ok(LoadedConfig { config, warnings })
    }

    fn build(&self, env: Option<HashMap<String, String>>) -> Result<AppConfig> {
        let config = Config::builder()
            .add_source(
                File::new(
                    self.config_path.to_str().ok_or_else(|| anyhow!("Invalid config path"))?,
                    FileFormat::Toml,
                )
                .required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

/// 兼容旧部署的环境变量，返回无法解析而被忽略的取值
pub fn apply_legacy_env<F>(config: &mut AppConfig, lookup: F) -> Vec<ConfigWarning>
where
    F: Fn(&str) -> Option<String>,
{
    let mut warnings = Vec::new();

    if let Some(url) = lookup("DB_DSN").filter(|v| !v.is_empty()) {
        config.database.url = url;
    }

    if let Some(token) = lookup("TELEGRAM_BOT_TOKEN") {
        config.telegram.bot_token = token;
    }

    if let Some(chat_id) = lookup("TELEGRAM_CHAT_ID") {
        config.telegram.chat_id = chat_id;
    }

    if let Some(raw) = lookup("ALERT_THRESHOLD_CPU") {
        config.alert.threshold = match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => {
                warnings.push(ConfigWarning {
                    variable: "ALERT_THRESHOLD_CPU",
                    value: raw,
                    message: format!(
                        "not a number, using default threshold {}",
                        dash_metrics::DEFAULT_THRESHOLD
                    ),
                });
                dash_metrics::DEFAULT_THRESHOLD
            }
        };
    }

    warnings
}

/// 验证配置
pub fn validate(config: &AppConfig) -> Result<()> {
    let threshold = config.alert.threshold;
    if !(threshold > 0.0 && threshold <= 100.0) {
        return Err(anyhow!("alert.threshold ({}) must be in (0, 100]", threshold));
    }

    if config.recorder.interval_secs == 0 {
        return Err(anyhow!("recorder.interval_secs must be greater than 0"));
    }

    if config.recorder.cpu_window_ms == 0 {
        return Err(anyhow!("recorder.cpu_window_ms must be greater than 0"));
    }

    if config.retention.horizon_hours == 0 {
        return Err(anyhow!("retention.horizon_hours must be greater than 0"));
    }

    if config.retention.sweep_interval_secs == 0 {
        return Err(anyhow!("retention.sweep_interval_secs must be greater than 0"));
    }

    if config.history.limit == 0 {
        return Err(anyhow!("history.limit must be greater than 0"));
    }

    if config.docker.restart_queue_capacity == 0 {
        return Err(anyhow!("docker.restart_queue_capacity must be greater than 0"));
    }

    if config.telegram.timeout_secs == 0 {
        return Err(anyhow!("telegram.timeout_secs must be greater than 0"));
    }

    Ok(())
}
