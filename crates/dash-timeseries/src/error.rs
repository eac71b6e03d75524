use sea_orm::DbErr;

/// 存储错误
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 后端连接不可用
    #[error("Metrics store unavailable: {0}")]
    Unavailable(String),

    /// 查询执行失败
    #[error("Metrics query failed: {0}")]
    QueryFailed(String),
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match &err {
            DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => StoreError::Unavailable(err.to_string()),
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}
