//! 课时存储操作

use super::SeaOrmStorage;
use crate::entity::lessons::{ActiveModel, Column, Entity as Lessons};
use crate::errors::{Result, SchoolSystemError};
use crate::models::lessons::entities::Lesson;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 创建课时
    pub async fn create_lesson_impl(
        &self,
        journal_id: i64,
        date: chrono::NaiveDate,
        course: i32,
        description: Option<String>,
    ) -> Result<Lesson> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            journal_id: Set(journal_id),
            lesson_date: Set(date.format("%Y-%m-%d").to_string()),
            course: Set(course),
            description: Set(description.filter(|d| !d.trim().is_empty())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("创建课时失败: {e}")))?;

        Ok(result.into_lesson())
    }

    /// 通过 ID 获取课时
    pub async fn get_lesson_by_id_impl(&self, id: i64) -> Result<Option<Lesson>> {
        let result = Lessons::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询课时失败: {e}")))?;

        Ok(result.map(|m| m.into_lesson()))
    }

    /// 列出日志的课时，按日期排序
    pub async fn list_lessons_impl(
        &self,
        journal_id: i64,
        course: Option<i32>,
    ) -> Result<Vec<Lesson>> {
        let mut select = Lessons::find().filter(Column::JournalId.eq(journal_id));

        if let Some(course) = course {
            select = select.filter(Column::Course.eq(course));
        }

        let lessons = select
            .order_by_asc(Column::LessonDate)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询课时列表失败: {e}")))?;

        Ok(lessons.into_iter().map(|m| m.into_lesson()).collect())
    }
}
