use crate::error::StoreError;
use crate::store::MetricsStore;
use chrono::{DateTime, Duration, Utc};
use dash_metrics::{Clock, MetricsCollector, SystemClock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// 默认保留 24 小时
pub const DEFAULT_RETENTION_HOURS: i64 = 24;

/// 清理统计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupStats {
    pub deleted_rows: u64,
    pub cutoff: DateTime<Utc>,
    pub execution_time_ms: i64,
    pub executed_at: DateTime<Utc>,
}

/// 保留期清理器
///
/// 每次执行删除早于 `now - horizon` 的采样；恰好位于边界上的采样保留。
pub struct RetentionSweeper {
    store: Arc<dyn MetricsStore>,
    horizon: Duration,
    clock: Arc<dyn Clock>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl RetentionSweeper {
    pub fn new(store: Arc<dyn MetricsStore>, horizon: Duration) -> Self {
        Self {
            store,
            horizon,
            clock: Arc::new(SystemClock),
            metrics: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn horizon(&self) -> Duration {
        self.horizon
    }

    /// 执行一次清理
    pub async fn sweep(&self) -> Result<CleanupStats, StoreError> {
        let start_time = std::time::Instant::now();
        let now = self.clock.now();

        info!(horizon_hours = self.horizon.num_hours(), "Retention sweep started");
        let deleted_rows = self.store.delete_older_than(self.horizon, now).await?;

        if let Some(metrics) = &self.metrics {
            metrics.record_retention_deleted(deleted_rows);
        }

        let stats = CleanupStats {
            deleted_rows,
            cutoff: now - self.horizon,
            execution_time_ms: start_time.elapsed().as_millis() as i64,
            executed_at: now,
        };

        info!(
            deleted_rows = %stats.deleted_rows,
            cutoff = %stats.cutoff,
            "Retention sweep completed"
        );

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use dash_metrics::{ManualClock, Sample};
    use std::sync::Mutex;

    /// 记录调用参数的存储
    #[derive(Default)]
    struct RecordingStore {
        calls: Mutex<Vec<(Duration, DateTime<Utc>)>>,
        fail: bool,
    }

    #[async_trait]
    impl MetricsStore for RecordingStore {
        async fn insert(&self, _sample: &Sample) -> Result<(), StoreError> {
            Ok(())
        }

        async fn recent(&self, _limit: u64) -> Result<Vec<Sample>, StoreError> {
            Ok(Vec::new())
        }

        async fn delete_older_than(&self, horizon: Duration, now: DateTime<Utc>) -> Result<u64, StoreError> {
            if self.fail {
                return Err(StoreError::Unavailable("down".to_string()));
            }
            self.calls.lock().unwrap().push((horizon, now));
            Ok(3)
        }
    }

    #[tokio::test]
    async fn test_sweep_uses_clock_and_horizon() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 1, 0, 0).unwrap();
        let store = Arc::new(RecordingStore::default());
        let metrics = Arc::new(MetricsCollector::new().unwrap());
        let sweeper = RetentionSweeper::new(store.clone(), Duration::hours(DEFAULT_RETENTION_HOURS))
            .with_clock(Arc::new(ManualClock::new(now)))
            .with_metrics(metrics.clone());

        let stats = sweeper.sweep().await.unwrap();

        assert_eq!(stats.deleted_rows, 3);
        assert_eq!(stats.cutoff, now - Duration::hours(24));
        assert_eq!(store.calls.lock().unwrap().as_slice(), &[(Duration::hours(24), now)]);
        assert!(metrics.export().unwrap().contains("dash_retention_deleted_rows_total 3"));
    }

    #[tokio::test]
    async fn test_sweep_propagates_store_error() {
        let store = Arc::new(RecordingStore {
            fail: true,
            ..Default::default()
        });
        let sweeper = RetentionSweeper::new(store, Duration::hours(24));

        assert!(matches!(sweeper.sweep().await, Err(StoreError::Unavailable(_))));
    }
}
