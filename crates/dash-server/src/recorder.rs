//! 周期采集：采样、告警判定、写入存储

use chrono::{DateTime, Utc};
use dash_metrics::{
    AlertDecision, AlertGate, AlertState, Clock, CooldownPolicy, MetricsCollector, Sample, Sampler,
    SystemClock,
};
use dash_notify::{Notifier, NotifyError};
use dash_timeseries::MetricsStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// 单次 tick 的结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// 本次采样，采样失败时为 `None`
    pub sample: Option<Sample>,
    pub decision: AlertDecision,
    pub persisted: bool,
}

impl TickReport {
    fn skipped() -> Self {
        Self {
            sample: None,
            decision: AlertDecision::Suppress,
            persisted: false,
        }
    }
}

/// 正在发送中的告警
struct PendingDispatch {
    dispatched_at: DateTime<Utc>,
    handle: JoinHandle<Result<(), NotifyError>>,
}

/// 采集器
///
/// 每个 tick 依次执行：收集上一次告警的发送结果、采样、告警判定、写入存储。
/// 告警在独立任务中发送，不阻塞 tick；发送未完成期间新的越限被抑制。
pub struct Recorder {
    sampler: Arc<dyn Sampler>,
    store: Arc<dyn MetricsStore>,
    notifier: Arc<dyn Notifier>,
    gate: AlertGate,
    policy: CooldownPolicy,
    clock: Arc<dyn Clock>,
    metrics: Option<Arc<MetricsCollector>>,
    state: AlertState,
    pending: Option<PendingDispatch>,
}

impl Recorder {
    pub fn new(
        sampler: Arc<dyn Sampler>,
        store: Arc<dyn MetricsStore>,
        notifier: Arc<dyn Notifier>,
        gate: AlertGate,
    ) -> Self {
        Self {
            sampler,
            store,
            notifier,
            gate,
            policy: CooldownPolicy::default(),
            clock: Arc::new(SystemClock),
            metrics: None,
            state: AlertState::new(),
            pending: None,
        }
    }

    pub fn with_policy(mut self, policy: CooldownPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// 当前告警状态
    pub fn alert_state(&self) -> AlertState {
        self.state
    }

    /// 是否有告警正在发送
    pub fn has_pending_dispatch(&self) -> bool {
        self.pending.is_some()
    }

    /// 执行一次采集
    pub async fn tick(&mut self) -> TickReport {
        self.reap_finished().await;

        let sample = match self.sampler.sample().await {
            Ok(sample) => sample,
            Err(e) => {
                warn!(error = %e, "Failed to collect host metrics, skipping tick");
                if let Some(metrics) = &self.metrics {
                    metrics.record_tick_failure("sample");
                }
                return TickReport::skipped();
            }
        };

        debug!(cpu = sample.cpu_percent, ram = sample.ram_percent, "Host sample collected");
        if let Some(metrics) = &self.metrics {
            metrics.set_host_usage(sample.cpu_percent, sample.ram_percent);
        }

        let decision = self.evaluate(&sample);
        if decision == AlertDecision::Trigger {
            self.dispatch(&sample);
        }

        let persisted = match self.store.insert(&sample).await {
            Ok(()) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_sample_persisted();
                }
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to persist sample, dropping it");
                if let Some(metrics) = &self.metrics {
                    metrics.record_tick_failure("store");
                }
                false
            }
        };

        TickReport {
            sample: Some(sample),
            decision,
            persisted,
        }
    }

    /// 等待正在发送的告警完成并应用结果
    pub async fn settle(&mut self) {
        if let Some(pending) = self.pending.take() {
            let outcome = pending.handle.await;
            self.apply_outcome(pending.dispatched_at, outcome);
        }
    }

    fn evaluate(&self, sample: &Sample) -> AlertDecision {
        if self.pending.is_some() {
            if sample.cpu_percent >= self.gate.threshold() {
                debug!(cpu = sample.cpu_percent, "Alert dispatch in flight, suppressing breach");
            }
            return AlertDecision::Suppress;
        }

        self.gate.evaluate(sample, &self.state, self.clock.now())
    }

    fn dispatch(&mut self, sample: &Sample) {
        let dispatched_at = self.clock.now();
        let notifier = self.notifier.clone();
        let (cpu, ram) = (sample.cpu_percent, sample.ram_percent);

        // 未配置凭据时不发起发送，也不计入已发送告警
        if !notifier.is_configured() {
            debug!(
                cpu = cpu,
                notifier = notifier.name(),
                "CPU threshold breached but notifier is not configured, skipping alert"
            );
            if self.policy == CooldownPolicy::OnDispatch {
                self.state.record_alert(dispatched_at);
            }
            return;
        }

        info!(
            cpu = cpu,
            ram = ram,
            threshold = self.gate.threshold(),
            notifier = notifier.name(),
            "CPU threshold breached, dispatching alert"
        );

        let handle = tokio::spawn(async move { notifier.notify(cpu, ram).await });

        if self.policy == CooldownPolicy::OnDispatch {
            self.state.record_alert(dispatched_at);
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_alert_dispatched();
        }

        self.pending = Some(PendingDispatch { dispatched_at, handle });
    }

    async fn reap_finished(&mut self) {
        let finished = self
            .pending
            .as_ref()
            .map_or(false, |pending| pending.handle.is_finished());

        if finished {
            self.settle().await;
        }
    }

    fn apply_outcome(
        &mut self,
        dispatched_at: DateTime<Utc>,
        outcome: Result<Result<(), NotifyError>, tokio::task::JoinError>,
    ) {
        let reason = match outcome {
            Ok(Ok(())) => {
                info!(dispatched_at = %dispatched_at, "Alert delivered");
                if self.policy == CooldownPolicy::OnDelivery {
                    self.state.record_alert(dispatched_at);
                }
                return;
            }
            Ok(Err(NotifyError::Unconfigured)) => {
                debug!("Notifier is not configured, alert not sent");
                NotifyError::Unconfigured.reason()
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Alert delivery failed");
                e.reason()
            }
            Err(e) => {
                error!(error = %e, "Alert dispatch task failed");
                "task_failed"
            }
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_alert_failed(reason);
        }
    }

    /// 按固定间隔在后台运行，首次执行在一个间隔之后
    pub fn spawn(mut self, period: Duration) -> RecorderHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let join_handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            info!(interval_secs = period.as_secs(), "Recorder started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.tick().await;
                    }
                    _ = shutdown_rx.changed() => {
                        info!("Recorder stopped");
                        break;
                    }
                }
            }
        });

        RecorderHandle {
            shutdown_tx,
            join_handle,
        }
    }
}

/// 后台采集任务句柄
pub struct RecorderHandle {
    shutdown_tx: watch::Sender<bool>,
    join_handle: JoinHandle<()>,
}

impl RecorderHandle {
    /// 通知停止并等待当前 tick 结束
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.join_handle.await;
    }

    /// 立即终止，不等待进行中的 tick
    pub fn abort(self) {
        let _ = self.shutdown_tx.send(true);
        self.join_handle.abort();
    }
}
