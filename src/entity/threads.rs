//! 消息会话实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "threads")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub locked: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuthorId",
        to = "super::users::Column::Id"
    )]
    Author,
    #[sea_orm(has_many = "super::thread_members::Entity")]
    ThreadMembers,
    #[sea_orm(has_many = "super::thread_logs::Entity")]
    ThreadLogs,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::thread_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ThreadMembers.def()
    }
}

impl Related<super::thread_logs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ThreadLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_thread(self) -> crate::models::threads::entities::Thread {
        use chrono::{DateTime, Utc};

        crate::models::threads::entities::Thread {
            id: self.id,
            author_id: self.author_id,
            title: self.title,
            body: self.body,
            locked: self.locked,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
