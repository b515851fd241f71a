//! 会话操作日志实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "thread_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub thread_id: i64,
    pub action: String,
    /// 受影响用户 ID 的 JSON 数组
    #[sea_orm(column_type = "Text")]
    pub targets: String,
    pub by_user: i64,
    pub at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::threads::Entity",
        from = "Column::ThreadId",
        to = "super::threads::Column::Id"
    )]
    Thread,
}

impl Related<super::threads::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Thread.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_log(self) -> crate::models::threads::entities::ThreadLog {
        use crate::models::threads::entities::{ThreadAction, ThreadLog};
        use chrono::{DateTime, Utc};

        ThreadLog {
            action: self
                .action
                .parse::<ThreadAction>()
                .unwrap_or(ThreadAction::AddedUser),
            targets: serde_json::from_str(&self.targets).unwrap_or_default(),
            by_user: self.by_user,
            at: DateTime::<Utc>::from_timestamp(self.at, 0).unwrap_or_default(),
        }
    }
}
