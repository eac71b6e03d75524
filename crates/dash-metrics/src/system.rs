use crate::clock::{Clock, SystemClock};
use crate::sample::Sample;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use sysinfo::System;
use tracing::debug;

/// 主机指标采集错误
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    #[error("Host metrics unavailable: {0}")]
    Unavailable(String),

    #[error("Sampling task failed: {0}")]
    Join(String),
}

/// 采样器接口
#[async_trait]
pub trait Sampler: Send + Sync {
    /// 读取一次 CPU / 内存使用率
    async fn sample(&self) -> Result<Sample, CollectionError>;
}

/// 基于 sysinfo 的本机采样器
///
/// CPU 使用率是 `cpu_window` 观察窗口内的平均值，因此每次采样至少耗时一个窗口；
/// 内存使用率是瞬时值。
pub struct HostSampler {
    cpu_window: Duration,
    clock: Arc<dyn Clock>,
}

impl HostSampler {
    pub fn new(cpu_window: Duration) -> Self {
        Self {
            cpu_window: cpu_window.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn cpu_window(&self) -> Duration {
        self.cpu_window
    }

    fn read_blocking(window: Duration) -> Result<(f64, f64), CollectionError> {
        let mut system = System::new();

        system.refresh_cpu();
        if system.cpus().is_empty() {
            return Err(CollectionError::Unavailable("no CPU information".to_string()));
        }
        std::thread::sleep(window);
        system.refresh_cpu();
        let cpu = system.global_cpu_info().cpu_usage() as f64;

        system.refresh_memory();
        let total = system.total_memory();
        if total == 0 {
            return Err(CollectionError::Unavailable("total memory reported as zero".to_string()));
        }
        let ram = system.used_memory() as f64 / total as f64 * 100.0;

        Ok((cpu.clamp(0.0, 100.0), ram.clamp(0.0, 100.0)))
    }
}

impl Default for HostSampler {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[async_trait]
impl Sampler for HostSampler {
    async fn sample(&self) -> Result<Sample, CollectionError> {
        let window = self.cpu_window;
        let (cpu, ram) = tokio::task::spawn_blocking(move || Self::read_blocking(window))
            .await
            .map_err(|e| CollectionError::Join(e.to_string()))??;

        let sample = Sample::new(self.clock.now(), cpu, ram);
        debug!(
            cpu = sample.cpu_percent,
            ram = sample.ram_percent,
            "Host sample collected"
        );
        Ok(sample)
    }
}
