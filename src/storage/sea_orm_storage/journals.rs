//! 日志与日志学生存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::journal_students::{
    ActiveModel as JournalStudentActiveModel, Column as JournalStudentColumn,
    Entity as JournalStudents,
};
use crate::entity::journals::{ActiveModel, Column, Entity as Journals, Model as JournalModel};
use crate::entity::lessons::{Column as LessonColumn, Entity as Lessons};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::entity::years::{Column as YearColumn, Entity as Years};
use crate::errors::{Result, SchoolSystemError};
use crate::models::{journals::entities::Journal, users::entities::User};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

impl SeaOrmStorage {
    /// 各日志的当前学期（课时中最大的学期序号）
    async fn current_courses(&self, journal_ids: &[i64]) -> Result<HashMap<i64, i32>> {
        if journal_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Lessons::find()
            .select_only()
            .column(LessonColumn::JournalId)
            .column_as(LessonColumn::Course.max(), "max_course")
            .filter(LessonColumn::JournalId.is_in(journal_ids.iter().copied()))
            .group_by(LessonColumn::JournalId)
            .into_tuple::<(i64, Option<i32>)>()
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询当前学期失败: {e}")))?;

        Ok(rows
            .into_iter()
            .filter_map(|(journal_id, course)| course.map(|c| (journal_id, c)))
            .collect())
    }

    async fn into_journals(&self, models: Vec<JournalModel>) -> Result<Vec<Journal>> {
        let ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let courses = self.current_courses(&ids).await?;
        Ok(models
            .into_iter()
            .map(|m| {
                let course = courses.get(&m.id).copied().unwrap_or(1);
                m.into_journal(course)
            })
            .collect())
    }

    /// 创建日志
    pub async fn create_journal_impl(
        &self,
        name: &str,
        subject_id: i64,
        teacher_id: i64,
    ) -> Result<Journal> {
        let now = chrono::Utc::now().timestamp();

        // 新日志归入当前学年
        let year_id = Years::find()
            .select_only()
            .column(YearColumn::Id)
            .filter(YearColumn::Current.eq(true))
            .into_tuple::<i64>()
            .one(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询当前学年失败: {e}")))?;

        let model = ActiveModel {
            name: Set(name.trim().to_string()),
            teacher_id: Set(teacher_id),
            subject_id: Set(subject_id),
            year_id: Set(year_id),
            archived: Set(false),
            last_updated: Set(now),
            created_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("创建日志失败: {e}")))?;

        Ok(result.into_journal(1))
    }

    /// 通过 ID 获取日志
    pub async fn get_journal_by_id_impl(&self, id: i64) -> Result<Option<Journal>> {
        let result = Journals::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询日志失败: {e}")))?;

        match result {
            Some(model) => Ok(self.into_journals(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    /// 列出日志
    pub async fn list_journals_impl(
        &self,
        archived: bool,
        teacher_id: Option<i64>,
    ) -> Result<Vec<Journal>> {
        let mut select = Journals::find().filter(Column::Archived.eq(archived));

        if let Some(teacher_id) = teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }

        let models = select
            .order_by_desc(Column::LastUpdated)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询日志列表失败: {e}")))?;

        self.into_journals(models).await
    }

    /// 学生所在的日志，可按学年过滤
    pub async fn list_journals_for_student_impl(
        &self,
        student_id: i64,
        year_id: Option<i64>,
    ) -> Result<Vec<Journal>> {
        let journal_ids: Vec<i64> = JournalStudents::find()
            .select_only()
            .column(JournalStudentColumn::JournalId)
            .filter(JournalStudentColumn::UserId.eq(student_id))
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询学生日志失败: {e}")))?;
        if journal_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut select = Journals::find().filter(Column::Id.is_in(journal_ids));
        if let Some(year_id) = year_id {
            select = select.filter(Column::YearId.eq(year_id));
        }

        let models = select
            .order_by_asc(Column::Name)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询学生日志失败: {e}")))?;

        self.into_journals(models).await
    }

    /// 更新日志名称或教师，同时刷新最后更新时间
    pub async fn update_journal_impl(
        &self,
        id: i64,
        name: Option<String>,
        teacher_id: Option<i64>,
    ) -> Result<Option<Journal>> {
        let existing = Journals::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询日志失败: {e}")))?;
        if existing.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            last_updated: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(name) = name {
            model.name = Set(name.trim().to_string());
        }

        if let Some(teacher_id) = teacher_id {
            model.teacher_id = Set(teacher_id);
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("更新日志失败: {e}")))?;

        self.get_journal_by_id_impl(id).await
    }

    /// 归档或取消归档
    pub async fn set_journal_archived_impl(&self, id: i64, archived: bool) -> Result<bool> {
        let result = Journals::update_many()
            .col_expr(Column::Archived, sea_orm::sea_query::Expr::value(archived))
            .col_expr(
                Column::LastUpdated,
                sea_orm::sea_query::Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("更新归档状态失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 删除日志（课时、评分、学生关联级联删除）
    pub async fn delete_journal_impl(&self, id: i64) -> Result<bool> {
        let result = Journals::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("删除日志失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn touch_journal_impl(&self, id: i64) -> Result<()> {
        Journals::update_many()
            .col_expr(
                Column::LastUpdated,
                sea_orm::sea_query::Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("更新日志时间失败: {e}")))?;

        Ok(())
    }

    /// 日志中的学生，按显示名和用户名排序
    pub async fn list_journal_students_impl(&self, journal_id: i64) -> Result<Vec<User>> {
        let ids = self.get_student_ids_for_journal_impl(journal_id).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = Users::find()
            .filter(UserColumn::Id.is_in(ids))
            .order_by_asc(UserColumn::DisplayName)
            .order_by_asc(UserColumn::Username)
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询日志学生失败: {e}")))?;

        Ok(users.into_iter().map(|m| m.into_user()).collect())
    }

    pub async fn get_student_ids_for_journal_impl(&self, journal_id: i64) -> Result<Vec<i64>> {
        JournalStudents::find()
            .select_only()
            .column(JournalStudentColumn::UserId)
            .filter(JournalStudentColumn::JournalId.eq(journal_id))
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询日志学生 ID 失败: {e}")))
    }

    pub async fn is_user_in_journal_impl(&self, user_id: i64, journal_id: i64) -> Result<bool> {
        let count = JournalStudents::find()
            .filter(JournalStudentColumn::JournalId.eq(journal_id))
            .filter(JournalStudentColumn::UserId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询日志成员失败: {e}")))?;

        Ok(count > 0)
    }

    /// 添加学生，已在日志中的学生跳过
    pub async fn add_students_to_journal_impl(
        &self,
        journal_id: i64,
        student_ids: &[i64],
    ) -> Result<u64> {
        let existing: std::collections::HashSet<i64> = self
            .get_student_ids_for_journal_impl(journal_id)
            .await?
            .into_iter()
            .collect();

        let mut seen = std::collections::HashSet::new();
        let now = chrono::Utc::now().timestamp();
        let models: Vec<JournalStudentActiveModel> = student_ids
            .iter()
            .copied()
            .filter(|id| !existing.contains(id) && seen.insert(*id))
            .map(|user_id| JournalStudentActiveModel {
                journal_id: Set(journal_id),
                user_id: Set(user_id),
                joined_at: Set(now),
                ..Default::default()
            })
            .collect();

        if models.is_empty() {
            return Ok(0);
        }

        let added = models.len() as u64;
        JournalStudents::insert_many(models)
            .exec(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("添加日志学生失败: {e}")))?;

        Ok(added)
    }

    pub async fn remove_student_from_journal_impl(
        &self,
        journal_id: i64,
        student_id: i64,
    ) -> Result<bool> {
        let result = JournalStudents::delete_many()
            .filter(JournalStudentColumn::JournalId.eq(journal_id))
            .filter(JournalStudentColumn::UserId.eq(student_id))
            .exec(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("移除日志学生失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::memory_storage;
    use crate::models::users::{entities::UserRole, requests::CreateUserRequest};

    async fn seed_user(
        storage: &super::SeaOrmStorage,
        username: &str,
        role: UserRole,
    ) -> i64 {
        storage
            .create_user_impl(CreateUserRequest {
                username: username.into(),
                email: format!("{username}@school.example"),
                password: "hash".into(),
                role,
                display_name: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_journal_current_course_follows_lessons() {
        let storage = memory_storage().await;
        let teacher = seed_user(&storage, "teacher01", UserRole::Teacher).await;
        let subject = storage.create_subject_impl("Algebra").await.unwrap();

        let journal = storage
            .create_journal_impl("7B Algebra", subject.id, teacher)
            .await
            .unwrap();
        assert_eq!(journal.current_course, 1);

        let date = chrono::NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
        storage
            .create_lesson_impl(journal.id, date, 1, None)
            .await
            .unwrap();
        storage
            .create_lesson_impl(journal.id, date, 3, Some("test".into()))
            .await
            .unwrap();

        let journal = storage
            .get_journal_by_id_impl(journal.id)
            .await
            .unwrap()
            .expect("journal exists");
        assert_eq!(journal.current_course, 3);

        let listed = storage.list_journals_impl(false, Some(teacher)).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].current_course, 3);
        assert!(storage.list_journals_impl(true, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_students_membership() {
        let storage = memory_storage().await;
        let teacher = seed_user(&storage, "teacher01", UserRole::Teacher).await;
        let s1 = seed_user(&storage, "student01", UserRole::Student).await;
        let s2 = seed_user(&storage, "student02", UserRole::Student).await;
        let subject = storage.create_subject_impl("History").await.unwrap();
        let journal = storage
            .create_journal_impl("8A History", subject.id, teacher)
            .await
            .unwrap();

        assert_eq!(
            storage
                .add_students_to_journal_impl(journal.id, &[s1, s2, s1])
                .await
                .unwrap(),
            2
        );
        // 重复添加被忽略
        assert_eq!(
            storage
                .add_students_to_journal_impl(journal.id, &[s1])
                .await
                .unwrap(),
            0
        );
        assert!(storage.is_user_in_journal_impl(s2, journal.id).await.unwrap());

        assert!(
            storage
                .remove_student_from_journal_impl(journal.id, s2)
                .await
                .unwrap()
        );
        assert!(
            !storage
                .remove_student_from_journal_impl(journal.id, s2)
                .await
                .unwrap()
        );
        let students = storage.list_journal_students_impl(journal.id).await.unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].id, s1);
    }

    #[tokio::test]
    async fn test_archive_and_delete() {
        let storage = memory_storage().await;
        let teacher = seed_user(&storage, "teacher01", UserRole::Teacher).await;
        let subject = storage.create_subject_impl("Biology").await.unwrap();
        let journal = storage
            .create_journal_impl("9C Biology", subject.id, teacher)
            .await
            .unwrap();

        assert!(storage.set_journal_archived_impl(journal.id, true).await.unwrap());
        let archived = storage.list_journals_impl(true, None).await.unwrap();
        assert_eq!(archived.len(), 1);

        assert!(storage.delete_journal_impl(journal.id).await.unwrap());
        assert!(storage.get_journal_by_id_impl(journal.id).await.unwrap().is_none());
    }
}
