//! 服务装配与启动

use crate::{api::create_router, recorder::Recorder, shutdown::shutdown_signal, state::AppState};
use anyhow::Context;
use dash_config::AppConfig;
use dash_control::{ContainerController, DockerCli, RestartQueue};
use dash_metrics::{AlertGate, HostSampler, MetricsCollector};
use dash_notify::{Notifier, TelegramNotifier};
use dash_timeseries::{RetentionSweeper, SqlMetricsStore, SweepScheduler};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// 按顺序启动各组件并提供 HTTP 服务，直到收到退出信号
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let metrics = Arc::new(MetricsCollector::new().context("Failed to create metrics registry")?);

    // 存储：启动时不可达不影响运行，之后每次操作都会重试连接
    let store = Arc::new(SqlMetricsStore::new(config.database.url.clone()));
    if let Err(e) = store
        .connect_with_retry(
            config.database.connect_attempts,
            Duration::from_secs(config.database.connect_retry_secs),
        )
        .await
    {
        warn!(error = %e, "Metrics database unavailable, continuing without it");
    }

    let sampler = Arc::new(HostSampler::new(config.recorder.cpu_window()));

    let notifier = Arc::new(TelegramNotifier::new(config.telegram.clone()));
    if !config.telegram.is_configured() {
        warn!("Telegram credentials missing, alerts will not be delivered");
    }

    let runtime = Arc::new(
        DockerCli::new(config.docker.binary.clone()).with_timeout(config.docker.command_timeout()),
    );
    let controller = ContainerController::new(runtime.clone(), config.docker.name_filter.clone())
        .with_log_tail(config.docker.log_tail);

    let (restart_queue, restart_worker) = RestartQueue::spawn(
        runtime,
        config.docker.restart_queue_capacity,
        config.docker.restart_delay(),
    );

    let gate = AlertGate::new(config.alert.threshold, config.alert.cooldown());
    let recorder = Recorder::new(sampler.clone(), store.clone(), notifier.clone(), gate)
        .with_policy(config.alert.cooldown_policy)
        .with_metrics(metrics.clone());
    info!(
        threshold = config.alert.threshold,
        cooldown_secs = config.alert.cooldown_secs,
        notifier = notifier.name(),
        "Alerting configured"
    );
    let recorder_handle = recorder.spawn(config.recorder.interval());

    let sweeper = Arc::new(
        RetentionSweeper::new(store.clone(), config.retention.horizon()).with_metrics(metrics.clone()),
    );
    let mut scheduler = non_fatal(
        "retention sweeps",
        start_retention(sweeper, config.retention.sweep_interval()).await,
    );

    let state = AppState::new(sampler, store, controller, restart_queue, metrics)
        .with_history_limit(config.history.limit);
    let app = create_router(state);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down background tasks");
    recorder_handle.abort();
    restart_worker.shutdown().await;
    if let Some(scheduler) = scheduler.as_mut() {
        if let Err(e) = scheduler.shutdown().await {
            warn!(error = %e, "Failed to stop sweep scheduler");
        }
    }

    Ok(())
}

/// 创建并启动保留期清理调度
async fn start_retention(
    sweeper: Arc<RetentionSweeper>,
    every: Duration,
) -> anyhow::Result<SweepScheduler> {
    let mut scheduler = SweepScheduler::new()
        .await
        .context("Failed to create sweep scheduler")?;
    scheduler
        .add_sweeper(sweeper, every)
        .await
        .context("Failed to schedule retention sweeper")?;
    scheduler
        .start()
        .await
        .context("Failed to start sweep scheduler")?;
    Ok(scheduler)
}

/// 后台组件启动失败只记录日志，服务继续运行
fn non_fatal<T>(component: &str, result: anyhow::Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            let cause = format!("{:#}", e);
            error!(error = %cause, "Failed to start {}, continuing without it", component);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dash_timeseries::MetricsStore;

    #[test]
    fn test_non_fatal_keeps_running_on_error() {
        let failed: anyhow::Result<u32> = Err(anyhow::anyhow!("scheduler unavailable"));
        assert_eq!(non_fatal("retention sweeps", failed), None);
        assert_eq!(non_fatal("retention sweeps", Ok(7)), Some(7));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_start_retention_schedules_sweeper() {
        let store: Arc<dyn MetricsStore> = Arc::new(SqlMetricsStore::new("sqlite::memory:"));
        let sweeper = Arc::new(RetentionSweeper::new(store, chrono::Duration::hours(24)));

        let mut scheduler = non_fatal(
            "retention sweeps",
            start_retention(sweeper, Duration::from_secs(3600)).await,
        )
        .expect("scheduler should start");

        scheduler.shutdown().await.unwrap();
    }
}
