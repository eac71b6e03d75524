use dash_config::{ConfigWarning, LoggingConfig};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 初始化日志
///
/// `RUST_LOG` 优先，未设置时使用配置中的级别。
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()?;
    }

    Ok(())
}

/// 输出配置加载阶段积累的告警，须在 `init_logging` 之后调用
pub fn report_config_warnings(warnings: &[ConfigWarning]) {
    for warning in warnings {
        warn!(
            variable = warning.variable,
            value = %warning.value,
            "Ignoring invalid configuration value: {}",
            warning.message
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_config_warnings_are_logged() {
        let mut config = dash_config::AppConfig::default();
        let warnings = dash_config::apply_legacy_env(&mut config, |key| {
            (key == "ALERT_THRESHOLD_CPU").then(|| "eighty".to_string())
        });

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || report_config_warnings(&warnings));

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"));
        assert!(output.contains("ALERT_THRESHOLD_CPU"));
        assert!(output.contains("eighty"));
    }

    #[test]
    fn test_no_warnings_logs_nothing() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || report_config_warnings(&[]));

        assert!(captured.0.lock().unwrap().is_empty());
    }
}
