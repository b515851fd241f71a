//! 批量评分的落库计划
//!
//! 由 `services::marks::reconcile` 生成，交给存储层在一个事务里执行。

use super::entities::MarkType;

/// 待插入的评分
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkDraft {
    pub user_id: i64,
    pub lesson_id: Option<i64>,
    pub course: Option<i32>,
    pub journal_id: i64,
    pub grade_id: Option<i64>,
    pub comment: Option<String>,
    pub mark_type: MarkType,
    pub teacher_id: i64,
    pub created_at: i64,
}

/// 按 ID 覆盖的评分字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkUpdate {
    pub id: i64,
    pub grade_id: Option<i64>,
    pub comment: Option<String>,
    pub mark_type: MarkType,
    pub teacher_id: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkBatch {
    pub inserts: Vec<MarkDraft>,
    pub updates: Vec<MarkUpdate>,
    pub delete_ids: Vec<i64>,
    /// (student_id, type)，限定在当前课时
    pub delete_by_student_type: Vec<(i64, MarkType)>,
}

impl MarkBatch {
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty()
            && self.updates.is_empty()
            && self.delete_ids.is_empty()
            && self.delete_by_student_type.is_empty()
    }
}

/// 已存在的考勤/完成度标记
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagMarkRef {
    pub id: i64,
    pub student_id: i64,
    pub mark_type: MarkType,
}

/// 课时下已有评分的摘要，用于批量校验
#[derive(Debug, Clone, Default)]
pub struct LessonMarkRefs {
    pub mark_ids: Vec<i64>,
    pub flag_marks: Vec<FlagMarkRef>,
}
