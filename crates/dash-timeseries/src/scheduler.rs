use crate::cleanup::RetentionSweeper;
use std::sync::Arc;
use std::time::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

/// 保留期清理调度器
///
/// 固定间隔重复执行，首次执行在一个间隔之后。单次失败只记录日志，不影响后续调度。
pub struct SweepScheduler {
    scheduler: JobScheduler,
}

impl SweepScheduler {
    /// 创建新的调度器
    pub async fn new() -> anyhow::Result<Self> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self { scheduler })
    }

    /// 添加清理任务
    pub async fn add_sweeper(&self, sweeper: Arc<RetentionSweeper>, every: Duration) -> anyhow::Result<uuid::Uuid> {
        let job = Job::new_repeated_async(every, move |_uuid, _l| {
            let sweeper = sweeper.clone();

            Box::pin(async move {
                if let Err(e) = sweeper.sweep().await {
                    error!(error = %e, "Retention sweep failed");
                }
            })
        })?;

        let job_id = self.scheduler.add(job).await?;

        info!(
            interval_secs = every.as_secs(),
            job_id = %job_id,
            "Retention sweep scheduled"
        );

        Ok(job_id)
    }

    /// 启动调度器
    pub async fn start(&mut self) -> anyhow::Result<()> {
        self.scheduler.start().await?;
        info!("Sweep scheduler started");
        Ok(())
    }

    /// 停止调度器
    pub async fn shutdown(&mut self) -> anyhow::Result<()> {
        self.scheduler.shutdown().await?;
        info!("Sweep scheduler stopped");
        Ok(())
    }
}
