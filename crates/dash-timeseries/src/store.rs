use crate::error::StoreError;
use crate::model::{self, Column, Entity};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dash_metrics::Sample;
use sea_orm::sea_query::Index;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Schema,
};
use std::time::Duration as StdDuration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// 采样存储 trait
#[async_trait]
pub trait MetricsStore: Send + Sync {
    /// 追加一条采样
    async fn insert(&self, sample: &Sample) -> Result<(), StoreError>;

    /// 最近 `limit` 条采样，按时间从旧到新排列
    async fn recent(&self, limit: u64) -> Result<Vec<Sample>, StoreError>;

    /// 删除 `created_at < now - horizon` 的采样，返回删除行数
    async fn delete_older_than(&self, horizon: Duration, now: DateTime<Utc>) -> Result<u64, StoreError>;
}

/// 基于 sea-orm 的关系型存储（生产环境 PostgreSQL，测试使用 SQLite）
///
/// 连接延迟建立：启动时数据库不可达不影响服务运行，之后每次操作都会重试连接。
pub struct SqlMetricsStore {
    database_url: String,
    conn: OnceCell<DatabaseConnection>,
}

impl SqlMetricsStore {
    /// 创建存储，不立即连接
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            conn: OnceCell::new(),
        }
    }

    /// 使用已建立的连接创建存储，并确保表结构存在
    pub async fn from_connection(db: DatabaseConnection) -> Result<Self, StoreError> {
        ensure_schema(&db).await?;
        Ok(Self {
            database_url: String::new(),
            conn: OnceCell::new_with(Some(db)),
        })
    }

    /// 启动时按固定间隔尝试连接
    pub async fn connect_with_retry(&self, attempts: u32, delay: StdDuration) -> Result<(), StoreError> {
        let attempts = attempts.max(1);
        let mut last_err = None;

        for attempt in 1..=attempts {
            match self.connection().await {
                Ok(_) => return Ok(()),
                Err(e) => {
                    warn!(attempt, attempts, error = %e, "Waiting for metrics database");
                    last_err = Some(e);
                }
            }
            if attempt < attempts {
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_err.unwrap_or_else(|| StoreError::Unavailable("no connection attempt made".to_string())))
    }

    /// 获取数据库连接
    async fn connection(&self) -> Result<&DatabaseConnection, StoreError> {
        self.conn
            .get_or_try_init(|| async {
                let db = Database::connect(self.database_url.as_str())
                    .await
                    .map_err(|e| StoreError::Unavailable(e.to_string()))?;
                ensure_schema(&db).await?;

                info!("Connected to metrics database");
                Ok::<_, StoreError>(db)
            })
            .await
    }
}

/// 建表（幂等），并为按时间排序建立索引
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), StoreError> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut table = schema.create_table_from_entity(Entity);
    table.if_not_exists();
    db.execute(backend.build(&table)).await?;

    let index = Index::create()
        .if_not_exists()
        .name("idx_system_metrics_created_at")
        .table(Entity)
        .col(Column::CreatedAt)
        .to_owned();
    db.execute(backend.build(&index)).await?;

    debug!("Metrics schema ensured");
    Ok(())
}

#[async_trait]
impl MetricsStore for SqlMetricsStore {
    async fn insert(&self, sample: &Sample) -> Result<(), StoreError> {
        let db = self.connection().await?;

        let row = model::ActiveModel {
            cpu: Set(sample.cpu_percent),
            ram: Set(sample.ram_percent),
            created_at: Set(sample.timestamp),
            ..Default::default()
        };
        Entity::insert(row).exec(db).await?;

        debug!(
            cpu = sample.cpu_percent,
            ram = sample.ram_percent,
            "Sample written to metrics store"
        );
        Ok(())
    }

    async fn recent(&self, limit: u64) -> Result<Vec<Sample>, StoreError> {
        let db = self.connection().await?;

        let rows = Entity::find()
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .limit(limit)
            .all(db)
            .await?;

        // 查询结果为倒序，返回前翻转为时间正序
        let mut samples: Vec<Sample> = rows.into_iter().map(Sample::from).collect();
        samples.reverse();

        debug!(count = samples.len(), "Queried recent samples");
        Ok(samples)
    }

    async fn delete_older_than(&self, horizon: Duration, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let db = self.connection().await?;
        let cutoff = now - horizon;

        let result = Entity::delete_many()
            .filter(Column::CreatedAt.lt(cutoff))
            .exec(db)
            .await?;

        Ok(result.rows_affected)
    }
}
