use dash_metrics::Sample;
use sea_orm::entity::prelude::*;

/// 系统指标采样表
///
/// 只追加；行只会被保留期清理删除。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "system_metrics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub cpu: f64,
    pub ram: f64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Sample {
    fn from(model: Model) -> Self {
        Sample {
            timestamp: model.created_at,
            cpu_percent: model.cpu,
            ram_percent: model.ram,
        }
    }
}
