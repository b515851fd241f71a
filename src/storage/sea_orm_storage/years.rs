//! 学年存储操作

use std::collections::HashMap;

use super::{SeaOrmStorage, finish_txn};
use crate::entity::journal_students::{Column as JournalStudentColumn, Entity as JournalStudents};
use crate::entity::journals::{Column as JournalColumn, Entity as Journals};
use crate::entity::years::{ActiveModel, Column, Entity as Years};
use crate::errors::{Result, SchoolSystemError};
use crate::models::years::entities::Year;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    sea_query::Expr,
};

impl SeaOrmStorage {
    /// 全部学年，新的在前
    pub async fn list_years_impl(&self) -> Result<Vec<Year>> {
        let years = Years::find()
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询学年失败: {e}")))?;

        Ok(years.into_iter().map(|m| m.into_year()).collect())
    }

    pub async fn get_year_by_id_impl(&self, id: i64) -> Result<Option<Year>> {
        let result = Years::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询学年失败: {e}")))?;

        Ok(result.map(|m| m.into_year()))
    }

    /// 各学年下的日志数量，没有日志的学年不出现
    pub async fn count_journals_by_year_impl(&self) -> Result<HashMap<i64, u64>> {
        let rows = Journals::find()
            .select_only()
            .column(JournalColumn::YearId)
            .column_as(JournalColumn::Id.count(), "journal_count")
            .filter(JournalColumn::YearId.is_not_null())
            .group_by(JournalColumn::YearId)
            .into_tuple::<(Option<i64>, i64)>()
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("统计学年日志失败: {e}")))?;

        Ok(rows
            .into_iter()
            .filter_map(|(year_id, count)| year_id.map(|id| (id, count.max(0) as u64)))
            .collect())
    }

    /// 创建学年并设为当前学年，原当前学年在同一事务中取消
    pub async fn create_year_impl(&self, display_name: &str, courses: i32) -> Result<Year> {
        let txn = self.begin_txn().await?;

        let result = async {
            Years::update_many()
                .col_expr(Column::Current, Expr::value(false))
                .filter(Column::Current.eq(true))
                .exec(&txn)
                .await
                .map_err(|e| SchoolSystemError::transaction(format!("取消当前学年失败: {e}")))?;

            ActiveModel {
                display_name: Set(display_name.trim().to_string()),
                courses: Set(courses),
                current: Set(true),
                created_at: Set(chrono::Utc::now().timestamp()),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| SchoolSystemError::transaction(format!("创建学年失败: {e}")))
        }
        .await;

        Ok(finish_txn(txn, result, "year creation").await?.into_year())
    }

    /// 学生所在日志涉及的学年
    pub async fn list_years_for_student_impl(&self, student_id: i64) -> Result<Vec<Year>> {
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

        let year_ids: Vec<Option<i64>> = Journals::find()
            .select_only()
            .column(JournalColumn::YearId)
            .filter(JournalColumn::Id.is_in(journal_ids))
            .distinct()
            .into_tuple::<Option<i64>>()
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询日志学年失败: {e}")))?;
        let year_ids: Vec<i64> = year_ids.into_iter().flatten().collect();
        if year_ids.is_empty() {
            return Ok(Vec::new());
        }

        let years = Years::find()
            .filter(Column::Id.is_in(year_ids))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询学年失败: {e}")))?;

        Ok(years.into_iter().map(|m| m.into_year()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::memory_storage;
    use crate::models::users::{entities::UserRole, requests::CreateUserRequest};

    #[tokio::test]
    async fn test_new_year_becomes_the_only_current_one() {
        let storage = memory_storage().await;

        let first = storage.create_year_impl(" 2024/2025 ", 2).await.unwrap();
        assert!(first.current);
        assert_eq!(first.display_name, "2024/2025");

        let second = storage.create_year_impl("2025/2026", 3).await.unwrap();
        let years = storage.list_years_impl().await.unwrap();
        let current: Vec<i64> = years.iter().filter(|y| y.current).map(|y| y.id).collect();
        assert_eq!(current, vec![second.id]);
        assert!(
            !storage
                .get_year_by_id_impl(first.id)
                .await
                .unwrap()
                .expect("year exists")
                .current
        );
    }

    #[tokio::test]
    async fn test_journals_join_current_year() {
        let storage = memory_storage().await;
        let teacher = storage
            .create_user_impl(CreateUserRequest {
                username: "teacher01".into(),
                email: "teacher01@school.example".into(),
                password: "hash".into(),
                role: UserRole::Teacher,
                display_name: None,
            })
            .await
            .unwrap();
        let student = storage
            .create_user_impl(CreateUserRequest {
                username: "student01".into(),
                email: "student01@school.example".into(),
                password: "hash".into(),
                role: UserRole::Student,
                display_name: None,
            })
            .await
            .unwrap();
        let subject = storage.create_subject_impl("Physics").await.unwrap();

        // 没有学年时日志不归属任何学年
        let legacy = storage
            .create_journal_impl("Old physics", subject.id, teacher.id)
            .await
            .unwrap();
        assert_eq!(legacy.year_id, None);

        let year = storage.create_year_impl("2025/2026", 2).await.unwrap();
        let journal = storage
            .create_journal_impl("9A Physics", subject.id, teacher.id)
            .await
            .unwrap();
        assert_eq!(journal.year_id, Some(year.id));

        storage
            .add_students_to_journal_impl(legacy.id, &[student.id])
            .await
            .unwrap();
        storage
            .add_students_to_journal_impl(journal.id, &[student.id])
            .await
            .unwrap();

        let years = storage.list_years_for_student_impl(student.id).await.unwrap();
        assert_eq!(years.len(), 1);
        assert_eq!(years[0].id, year.id);

        let counts = storage.count_journals_by_year_impl().await.unwrap();
        assert_eq!(counts.get(&year.id), Some(&1));

        let in_year = storage
            .list_journals_for_student_impl(student.id, Some(year.id))
            .await
            .unwrap();
        assert_eq!(in_year.len(), 1);
        assert_eq!(in_year[0].id, journal.id);
        let all = storage
            .list_journals_for_student_impl(student.id, None)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }
}
