use chrono::{DateTime, Duration, TimeZone, Utc};
use dash_metrics::{ManualClock, Sample};
use dash_timeseries::{
    MetricsStore, RetentionSweeper, SqlMetricsStore, StoreError, SweepScheduler,
};
use sea_orm::Database;
use std::sync::Arc;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// 创建内存 SQLite 存储
async fn create_test_store() -> SqlMetricsStore {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    SqlMetricsStore::from_connection(db)
        .await
        .expect("Failed to create schema")
}

#[tokio::test]
async fn test_recent_returns_latest_in_chronological_order() {
    let store = create_test_store().await;

    for i in 0..30 {
        let sample = Sample::new(t0() + Duration::seconds(i * 5), i as f64, 50.0);
        store.insert(&sample).await.unwrap();
    }

    let recent = store.recent(20).await.unwrap();
    assert_eq!(recent.len(), 20);

    // 最近 20 条：第 10..30 条，时间正序
    assert_eq!(recent.first().unwrap().timestamp, t0() + Duration::seconds(50));
    assert_eq!(recent.last().unwrap().timestamp, t0() + Duration::seconds(145));
    assert!(recent.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    assert_eq!(recent[0].cpu_percent, 10.0);
}

#[tokio::test]
async fn test_recent_with_fewer_rows_than_limit() {
    let store = create_test_store().await;

    store.insert(&Sample::new(t0(), 12.5, 30.0)).await.unwrap();
    store
        .insert(&Sample::new(t0() + Duration::seconds(5), 13.5, 31.0))
        .await
        .unwrap();

    let recent = store.recent(20).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].cpu_percent, 12.5);
    assert_eq!(recent[1].cpu_percent, 13.5);

    assert!(store.recent(0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_insert_keeps_rounded_values() {
    let store = create_test_store().await;

    store.insert(&Sample::new(t0(), 42.345, 42.344)).await.unwrap();

    let recent = store.recent(1).await.unwrap();
    assert_eq!(recent[0].cpu_percent, 42.35);
    assert_eq!(recent[0].ram_percent, 42.34);
}

#[tokio::test]
async fn test_delete_older_than_keeps_boundary_row() {
    let store = create_test_store().await;
    let now = t0() + Duration::hours(30);

    // 早于边界、恰好在边界、晚于边界
    store
        .insert(&Sample::new(now - Duration::hours(24) - Duration::seconds(1), 1.0, 1.0))
        .await
        .unwrap();
    store
        .insert(&Sample::new(now - Duration::hours(24), 2.0, 2.0))
        .await
        .unwrap();
    store
        .insert(&Sample::new(now - Duration::hours(1), 3.0, 3.0))
        .await
        .unwrap();

    let deleted = store.delete_older_than(Duration::hours(24), now).await.unwrap();
    assert_eq!(deleted, 1);

    let remaining = store.recent(10).await.unwrap();
    let cpus: Vec<f64> = remaining.iter().map(|s| s.cpu_percent).collect();
    assert_eq!(cpus, vec![2.0, 3.0]);
}

#[tokio::test]
async fn test_sweeper_scenario() {
    let store = Arc::new(create_test_store().await);

    store.insert(&Sample::new(t0(), 10.0, 10.0)).await.unwrap();
    store
        .insert(&Sample::new(t0() + Duration::hours(25), 20.0, 20.0))
        .await
        .unwrap();

    let clock = Arc::new(ManualClock::new(t0() + Duration::hours(25) + Duration::seconds(1)));
    let sweeper = RetentionSweeper::new(store.clone(), Duration::hours(24)).with_clock(clock);

    let stats = sweeper.sweep().await.unwrap();
    assert_eq!(stats.deleted_rows, 1);

    let remaining = store.recent(10).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].timestamp, t0() + Duration::hours(25));

    // 条件不再满足时重复执行不删除任何数据
    assert_eq!(sweeper.sweep().await.unwrap().deleted_rows, 0);
}

#[tokio::test]
async fn test_unreachable_backend_reports_unavailable() {
    let store = SqlMetricsStore::new("sqlite:/nonexistent-dash-dir/metrics.db");

    let result = store.insert(&Sample::new(t0(), 1.0, 1.0)).await;
    assert!(matches!(result, Err(StoreError::Unavailable(_))));

    let result = store.recent(20).await;
    assert!(matches!(result, Err(StoreError::Unavailable(_))));

    let result = store
        .connect_with_retry(2, std::time::Duration::from_millis(10))
        .await;
    assert!(matches!(result, Err(StoreError::Unavailable(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_scheduled_sweep_runs_repeatedly() {
    let store = Arc::new(create_test_store().await);
    store
        .insert(&Sample::new(Utc::now() - Duration::hours(48), 10.0, 10.0))
        .await
        .unwrap();

    let sweeper = Arc::new(RetentionSweeper::new(store.clone(), Duration::hours(24)));
    let mut scheduler = SweepScheduler::new().await.unwrap();
    scheduler
        .add_sweeper(sweeper, std::time::Duration::from_secs(1))
        .await
        .unwrap();
    scheduler.start().await.unwrap();

    tokio::time::sleep(std::time::Duration::from_secs(3)).await;
    scheduler.shutdown().await.unwrap();

    assert!(store.recent(10).await.unwrap().is_empty());
}
