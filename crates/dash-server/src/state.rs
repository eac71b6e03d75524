use dash_control::{ContainerController, RestartQueue};
use dash_metrics::{MetricsCollector, Sampler};
use dash_timeseries::MetricsStore;
use std::sync::Arc;
use std::time::Duration;

/// CPU 压测默认时长
pub const DEFAULT_STRESS_DURATION: Duration = Duration::from_secs(5);

/// API 应用状态
#[derive(Clone)]
pub struct AppState {
    /// 按需采样（`/api/status`）
    pub sampler: Arc<dyn Sampler>,
    pub store: Arc<dyn MetricsStore>,
    pub controller: ContainerController,
    pub restart_queue: RestartQueue,
    pub metrics: Arc<MetricsCollector>,
    /// 历史查询默认条数与上限
    pub history_limit: u64,
    pub stress_duration: Duration,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(
        sampler: Arc<dyn Sampler>,
        store: Arc<dyn MetricsStore>,
        controller: ContainerController,
        restart_queue: RestartQueue,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            sampler,
            store,
            controller,
            restart_queue,
            metrics,
            history_limit: 20,
            stress_duration: DEFAULT_STRESS_DURATION,
        }
    }

    pub fn with_history_limit(mut self, limit: u64) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_stress_duration(mut self, duration: Duration) -> Self {
        self.stress_duration = duration;
        self
    }
}
