pub mod app;
pub mod loader;

pub use app::{
    AlertConfig, AppConfig, DatabaseConfig, DockerConfig, HistoryConfig, LoggingConfig,
    RecorderConfig, RetentionConfig, ServerConfig,
};
pub use dash_notify::TelegramConfig;
pub use loader::{apply_legacy_env, validate, ConfigLoader, ConfigWarning, LoadedConfig};
