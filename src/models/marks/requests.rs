use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entities::MarkType;

/// 批量评分中单个学生的条目
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/mark.ts")]
pub struct LessonMarksEntry {
    pub student_id: i64,
    pub absent: Option<bool>,
    pub late: Option<bool>,
    pub not_done: Option<bool>,
    #[serde(default)]
    pub marks: Vec<LessonMarkEdit>,
}

/// 批量评分中单条成绩或备注的编辑
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/mark.ts")]
pub struct LessonMarkEdit {
    pub id: Option<i64>,
    pub grade: Option<i64>,
    #[serde(rename = "type", default)]
    pub mark_type: String,
    pub comment: Option<String>,
    #[serde(default)]
    pub remove: bool,
}

/// 备注的语气
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeTone {
    Good,
    Neutral,
    Bad,
}

impl From<NoticeTone> for MarkType {
    fn from(tone: NoticeTone) -> Self {
        match tone {
            NoticeTone::Good => MarkType::NoticeGood,
            NoticeTone::Neutral => MarkType::NoticeNeutral,
            NoticeTone::Bad => MarkType::NoticeBad,
        }
    }
}

/// 校验通过后的编辑内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LessonMarkPayload {
    Grade {
        grade_id: i64,
        comment: Option<String>,
    },
    Notice { tone: NoticeTone, comment: String },
}

impl LessonMarkPayload {
    pub fn mark_type(&self) -> MarkType {
        match self {
            LessonMarkPayload::Grade { .. } => MarkType::LessonGrade,
            LessonMarkPayload::Notice { tone, .. } => (*tone).into(),
        }
    }

    pub fn grade_id(&self) -> Option<i64> {
        match self {
            LessonMarkPayload::Grade { grade_id, .. } => Some(*grade_id),
            LessonMarkPayload::Notice { .. } => None,
        }
    }

    pub fn comment(&self) -> Option<&str> {
        match self {
            LessonMarkPayload::Grade { comment, .. } => comment.as_deref(),
            LessonMarkPayload::Notice { comment, .. } => Some(comment),
        }
    }
}

/// 按字段定位的校验错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/mark.ts")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

// 单条评分创建请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/mark.ts")]
pub struct CreateMarkRequest {
    pub user_id: i64,
    #[serde(rename = "type")]
    pub mark_type: String,
    pub lesson_id: Option<i64>,
    pub journal_id: Option<i64>,
    pub course: Option<i32>,
    pub grade_id: Option<i64>,
    pub comment: Option<String>,
}

// 单条评分更新请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/mark.ts")]
pub struct UpdateMarkRequest {
    pub grade_id: Option<i64>,
    pub comment: Option<String>,
}

// 日志评分查询参数
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/mark.ts")]
pub struct JournalMarksParams {
    pub mark_type: String,
    pub course: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_defaults() {
        let entry: LessonMarksEntry = serde_json::from_str(r#"{"student_id": 5}"#).unwrap();
        assert_eq!(entry.student_id, 5);
        assert!(entry.absent.is_none());
        assert!(entry.marks.is_empty());
    }

    #[test]
    fn test_edit_field_names() {
        let edit: LessonMarkEdit =
            serde_json::from_str(r#"{"id": 42, "remove": true}"#).unwrap();
        assert_eq!(edit.id, Some(42));
        assert!(edit.remove);
        assert_eq!(edit.mark_type, "");

        let edit: LessonMarkEdit =
            serde_json::from_str(r#"{"type": "common_grade", "grade": 3}"#).unwrap();
        assert_eq!(edit.mark_type, "common_grade");
        assert_eq!(edit.grade, Some(3));
    }

    #[test]
    fn test_payload_accessors() {
        let grade = LessonMarkPayload::Grade {
            grade_id: 3,
            comment: None,
        };
        assert_eq!(grade.mark_type(), MarkType::LessonGrade);
        assert_eq!(grade.grade_id(), Some(3));
        assert_eq!(grade.comment(), None);

        let notice = LessonMarkPayload::Notice {
            tone: NoticeTone::Bad,
            comment: "talking".into(),
        };
        assert_eq!(notice.mark_type(), MarkType::NoticeBad);
        assert_eq!(notice.comment(), Some("talking"));
    }
}
