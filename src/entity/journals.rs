//! 日志实体
//!
//! 日志（journal）是某位教师在某个科目下的一组学生及其课时与评分。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "journals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub teacher_id: i64,
    pub subject_id: i64,
    pub year_id: Option<i64>,
    pub archived: bool,
    pub last_updated: i64,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::TeacherId",
        to = "super::users::Column::Id"
    )]
    Teacher,
    #[sea_orm(
        belongs_to = "super::subjects::Entity",
        from = "Column::SubjectId",
        to = "super::subjects::Column::Id"
    )]
    Subject,
    #[sea_orm(
        belongs_to = "super::years::Entity",
        from = "Column::YearId",
        to = "super::years::Column::Id"
    )]
    Year,
    #[sea_orm(has_many = "super::journal_students::Entity")]
    JournalStudents,
    #[sea_orm(has_many = "super::lessons::Entity")]
    Lessons,
    #[sea_orm(has_many = "super::marks::Entity")]
    Marks,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teacher.def()
    }
}

impl Related<super::subjects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subject.def()
    }
}

impl Related<super::years::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Year.def()
    }
}

impl Related<super::journal_students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalStudents.def()
    }
}

impl Related<super::lessons::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lessons.def()
    }
}

impl Related<super::marks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Marks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// `current_course` 由课时推导，需要调用方传入
    pub fn into_journal(self, current_course: i32) -> crate::models::journals::entities::Journal {
        use chrono::{DateTime, Utc};

        crate::models::journals::entities::Journal {
            id: self.id,
            name: self.name,
            teacher_id: self.teacher_id,
            subject_id: self.subject_id,
            year_id: self.year_id,
            archived: self.archived,
            current_course,
            last_updated: DateTime::<Utc>::from_timestamp(self.last_updated, 0)
                .unwrap_or_default(),
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        }
    }
}
