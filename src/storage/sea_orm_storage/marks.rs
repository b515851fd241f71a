//! 评分存储操作

use super::{SeaOrmStorage, finish_txn};
use crate::entity::journals::{Column as JournalColumn, Entity as Journals};
use crate::entity::marks::{ActiveModel, Column, Entity as Marks};
use crate::errors::{Result, SchoolSystemError};
use crate::models::marks::{
    batch::{FlagMarkRef, LessonMarkRefs, MarkBatch, MarkDraft},
    entities::{Mark, MarkType},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, sea_query::Expr,
};
use tracing::debug;

fn draft_to_active_model(draft: MarkDraft) -> ActiveModel {
    ActiveModel {
        user_id: Set(draft.user_id),
        lesson_id: Set(draft.lesson_id),
        course: Set(draft.course),
        journal_id: Set(draft.journal_id),
        grade_id: Set(draft.grade_id),
        comment: Set(draft.comment),
        mark_type: Set(draft.mark_type.to_string()),
        teacher_id: Set(draft.teacher_id),
        created_at: Set(draft.created_at),
        updated_at: Set(draft.created_at),
        ..Default::default()
    }
}

/// 在事务中刷新所属日志的最后更新时间
async fn touch_journal_in(txn: &DatabaseTransaction, journal_id: i64) -> Result<()> {
    Journals::update_many()
        .col_expr(
            JournalColumn::LastUpdated,
            Expr::value(chrono::Utc::now().timestamp()),
        )
        .filter(JournalColumn::Id.eq(journal_id))
        .exec(txn)
        .await
        .map_err(|e| SchoolSystemError::transaction(format!("更新日志时间失败: {e}")))?;
    Ok(())
}

impl SeaOrmStorage {
    /// 创建单条评分，并在同一事务中刷新日志的最后更新时间
    pub async fn create_mark_impl(&self, draft: MarkDraft) -> Result<Mark> {
        let journal_id = draft.journal_id;
        let txn = self.begin_txn().await?;

        let result = async {
            let model = draft_to_active_model(draft)
                .insert(&txn)
                .await
                .map_err(|e| SchoolSystemError::database_operation(format!("创建评分失败: {e}")))?;
            touch_journal_in(&txn, journal_id).await?;
            Ok::<_, SchoolSystemError>(model)
        }
        .await;

        Ok(finish_txn(txn, result, "mark creation").await?.into_mark())
    }

    /// 通过 ID 获取评分
    pub async fn get_mark_by_id_impl(&self, id: i64) -> Result<Option<Mark>> {
        let result = Marks::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询评分失败: {e}")))?;

        Ok(result.map(|m| m.into_mark()))
    }

    /// 更新评分的成绩或评语，日志时间在同一事务中刷新
    pub async fn update_mark_impl(
        &self,
        id: i64,
        grade_id: Option<i64>,
        comment: Option<String>,
        teacher_id: i64,
    ) -> Result<Option<Mark>> {
        let txn = self.begin_txn().await?;

        let result = async {
            let Some(existing) = Marks::find_by_id(id)
                .one(&txn)
                .await
                .map_err(|e| SchoolSystemError::database_operation(format!("查询评分失败: {e}")))?
            else {
                return Ok::<_, SchoolSystemError>(None);
            };

            let mut model = ActiveModel {
                id: Set(id),
                teacher_id: Set(teacher_id),
                updated_at: Set(chrono::Utc::now().timestamp()),
                ..Default::default()
            };
            if let Some(grade_id) = grade_id {
                model.grade_id = Set(Some(grade_id));
            }
            if let Some(comment) = comment {
                model.comment = Set(Some(comment));
            }

            let updated = model
                .update(&txn)
                .await
                .map_err(|e| SchoolSystemError::database_operation(format!("更新评分失败: {e}")))?;
            touch_journal_in(&txn, existing.journal_id).await?;
            Ok::<_, SchoolSystemError>(Some(updated))
        }
        .await;

        Ok(finish_txn(txn, result, "mark update")
            .await?
            .map(|m| m.into_mark()))
    }

    /// 删除评分，日志时间在同一事务中刷新
    pub async fn delete_mark_impl(&self, id: i64) -> Result<bool> {
        let txn = self.begin_txn().await?;

        let result = async {
            let Some(existing) = Marks::find_by_id(id)
                .one(&txn)
                .await
                .map_err(|e| SchoolSystemError::database_operation(format!("查询评分失败: {e}")))?
            else {
                return Ok::<_, SchoolSystemError>(false);
            };

            Marks::delete_by_id(id)
                .exec(&txn)
                .await
                .map_err(|e| SchoolSystemError::database_operation(format!("删除评分失败: {e}")))?;
            touch_journal_in(&txn, existing.journal_id).await?;
            Ok::<_, SchoolSystemError>(true)
        }
        .await;

        finish_txn(txn, result, "mark deletion").await
    }

    /// 课时下的全部评分
    pub async fn list_marks_for_lesson_impl(&self, lesson_id: i64) -> Result<Vec<Mark>> {
        let marks = Marks::find()
            .filter(Column::LessonId.eq(lesson_id))
            .order_by_asc(Column::UserId)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询课时评分失败: {e}")))?;

        Ok(marks.into_iter().map(|m| m.into_mark()).collect())
    }

    /// 日志下某一类型的评分
    pub async fn list_marks_for_journal_impl(
        &self,
        journal_id: i64,
        mark_type: MarkType,
        course: Option<i32>,
    ) -> Result<Vec<Mark>> {
        let mut select = Marks::find()
            .filter(Column::JournalId.eq(journal_id))
            .filter(Column::MarkType.eq(mark_type.as_str()));

        if let Some(course) = course {
            select = select.filter(Column::Course.eq(course));
        }

        let marks = select
            .order_by_asc(Column::UserId)
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询日志评分失败: {e}")))?;

        Ok(marks.into_iter().map(|m| m.into_mark()).collect())
    }

    /// 某个学生在给定日志中的全部评分
    pub async fn list_marks_for_student_impl(
        &self,
        student_id: i64,
        journal_ids: &[i64],
    ) -> Result<Vec<Mark>> {
        if journal_ids.is_empty() {
            return Ok(Vec::new());
        }

        let marks = Marks::find()
            .filter(Column::UserId.eq(student_id))
            .filter(Column::JournalId.is_in(journal_ids.iter().copied()))
            .order_by_asc(Column::JournalId)
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询学生评分失败: {e}")))?;

        Ok(marks.into_iter().map(|m| m.into_mark()).collect())
    }

    /// 课时下已有评分的 ID 与考勤标记
    pub async fn get_mark_refs_for_lesson_impl(&self, lesson_id: i64) -> Result<LessonMarkRefs> {
        let rows = Marks::find()
            .select_only()
            .column(Column::Id)
            .column(Column::UserId)
            .column(Column::MarkType)
            .filter(Column::LessonId.eq(lesson_id))
            .into_tuple::<(i64, i64, String)>()
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询课时评分 ID 失败: {e}")))?;

        let mut refs = LessonMarkRefs::default();
        for (id, user_id, mark_type) in rows {
            refs.mark_ids.push(id);
            if let Ok(mark_type) = mark_type.parse::<MarkType>()
                && mark_type.is_flag()
            {
                refs.flag_marks.push(FlagMarkRef {
                    id,
                    student_id: user_id,
                    mark_type,
                });
            }
        }
        Ok(refs)
    }

    /// 在一个事务中执行批量评分
    ///
    /// 顺序：插入、更新、按 ID 删除、按 (学生, 类型) 删除。
    /// 任一步失败都会回滚，调用方只会看到一个事务错误。
    pub async fn apply_mark_batch_impl(&self, lesson_id: i64, batch: MarkBatch) -> Result<()> {
        if batch.is_empty() {
            debug!("Empty mark batch for lesson {}, nothing to apply", lesson_id);
            return Ok(());
        }

        let txn = self.begin_txn().await?;
        let result = Self::write_mark_batch(&txn, lesson_id, batch).await;
        finish_txn(txn, result, "mark batch").await
    }

    async fn write_mark_batch(
        txn: &DatabaseTransaction,
        lesson_id: i64,
        batch: MarkBatch,
    ) -> Result<()> {
        let MarkBatch {
            inserts,
            updates,
            delete_ids,
            delete_by_student_type,
        } = batch;

        if !inserts.is_empty() {
            let models: Vec<ActiveModel> = inserts.into_iter().map(draft_to_active_model).collect();
            Marks::insert_many(models)
                .exec(txn)
                .await
                .map_err(|e| SchoolSystemError::transaction(format!("批量插入评分失败: {e}")))?;
        }

        for update in updates {
            ActiveModel {
                id: Set(update.id),
                grade_id: Set(update.grade_id),
                comment: Set(update.comment),
                mark_type: Set(update.mark_type.to_string()),
                teacher_id: Set(update.teacher_id),
                updated_at: Set(update.updated_at),
                ..Default::default()
            }
            .update(txn)
            .await
            .map_err(|e| {
                SchoolSystemError::transaction(format!("更新评分 {} 失败: {e}", update.id))
            })?;
        }

        if !delete_ids.is_empty() {
            Marks::delete_many()
                .filter(Column::LessonId.eq(lesson_id))
                .filter(Column::Id.is_in(delete_ids))
                .exec(txn)
                .await
                .map_err(|e| SchoolSystemError::transaction(format!("批量删除评分失败: {e}")))?;
        }

        if !delete_by_student_type.is_empty() {
            let pairs = delete_by_student_type
                .into_iter()
                .fold(Condition::any(), |cond, (student_id, mark_type)| {
                    cond.add(
                        Condition::all()
                            .add(Column::UserId.eq(student_id))
                            .add(Column::MarkType.eq(mark_type.as_str())),
                    )
                });
            Marks::delete_many()
                .filter(Column::LessonId.eq(lesson_id))
                .filter(pairs)
                .exec(txn)
                .await
                .map_err(|e| SchoolSystemError::transaction(format!("按类型删除评分失败: {e}")))?;
        }

        Ok(())
    }
}
