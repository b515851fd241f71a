use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 评分类型
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/mark.ts")]
pub enum MarkType {
    LessonGrade,   // 课堂成绩
    CourseGrade,   // 学期成绩
    SubjectGrade,  // 科目总评
    NotDone,       // 未完成作业
    NoticeGood,    // 表扬
    NoticeNeutral, // 备注
    NoticeBad,     // 批评
    Absent,        // 缺勤
    Late,          // 迟到
}

impl MarkType {
    pub const LESSON_GRADE: &'static str = "lesson_grade";
    pub const COURSE_GRADE: &'static str = "course_grade";
    pub const SUBJECT_GRADE: &'static str = "subject_grade";
    pub const NOT_DONE: &'static str = "not_done";
    pub const NOTICE_GOOD: &'static str = "notice_good";
    pub const NOTICE_NEUTRAL: &'static str = "notice_neutral";
    pub const NOTICE_BAD: &'static str = "notice_bad";
    pub const ABSENT: &'static str = "absent";
    pub const LATE: &'static str = "late";
    /// 仅作为输入使用，落库时转换为 `lesson_grade`
    pub const COMMON_GRADE: &'static str = "common_grade";

    pub fn as_str(&self) -> &'static str {
        match self {
            MarkType::LessonGrade => Self::LESSON_GRADE,
            MarkType::CourseGrade => Self::COURSE_GRADE,
            MarkType::SubjectGrade => Self::SUBJECT_GRADE,
            MarkType::NotDone => Self::NOT_DONE,
            MarkType::NoticeGood => Self::NOTICE_GOOD,
            MarkType::NoticeNeutral => Self::NOTICE_NEUTRAL,
            MarkType::NoticeBad => Self::NOTICE_BAD,
            MarkType::Absent => Self::ABSENT,
            MarkType::Late => Self::LATE,
        }
    }

    /// 必须挂在课时上的类型
    pub fn is_lesson_bound(&self) -> bool {
        !matches!(self, MarkType::CourseGrade | MarkType::SubjectGrade)
    }

    /// 必须引用成绩等级的类型
    pub fn is_grade_bearing(&self) -> bool {
        matches!(
            self,
            MarkType::LessonGrade | MarkType::CourseGrade | MarkType::SubjectGrade
        )
    }

    pub fn is_notice(&self) -> bool {
        matches!(
            self,
            MarkType::NoticeGood | MarkType::NoticeNeutral | MarkType::NoticeBad
        )
    }

    /// 每个学生每节课最多一条的考勤/完成度标记
    pub fn is_flag(&self) -> bool {
        matches!(self, MarkType::Absent | MarkType::Late | MarkType::NotDone)
    }
}

impl<'de> Deserialize<'de> for MarkType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<MarkType>().map_err(|_| {
            serde::de::Error::custom(format!("无效的评分类型: '{s}'"))
        })
    }
}

impl std::fmt::Display for MarkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MarkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            MarkType::LESSON_GRADE | MarkType::COMMON_GRADE => Ok(MarkType::LessonGrade),
            MarkType::COURSE_GRADE => Ok(MarkType::CourseGrade),
            MarkType::SUBJECT_GRADE => Ok(MarkType::SubjectGrade),
            MarkType::NOT_DONE => Ok(MarkType::NotDone),
            MarkType::NOTICE_GOOD => Ok(MarkType::NoticeGood),
            MarkType::NOTICE_NEUTRAL => Ok(MarkType::NoticeNeutral),
            MarkType::NOTICE_BAD => Ok(MarkType::NoticeBad),
            MarkType::ABSENT => Ok(MarkType::Absent),
            MarkType::LATE => Ok(MarkType::Late),
            _ => Err(format!("Invalid mark type: {s}")),
        }
    }
}

// 评分记录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/mark.ts")]
pub struct Mark {
    pub id: i64,
    pub user_id: i64,
    pub lesson_id: Option<i64>,
    pub course: Option<i32>,
    pub journal_id: i64,
    pub grade_id: Option<i64>,
    pub comment: Option<String>,
    #[serde(rename = "type")]
    pub mark_type: MarkType,
    pub teacher_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_grade_is_lesson_grade() {
        assert_eq!("common_grade".parse::<MarkType>(), Ok(MarkType::LessonGrade));
        assert_eq!(MarkType::LessonGrade.to_string(), "lesson_grade");
    }

    #[test]
    fn test_roundtrip_names() {
        for name in [
            "lesson_grade",
            "course_grade",
            "subject_grade",
            "not_done",
            "notice_good",
            "notice_neutral",
            "notice_bad",
            "absent",
            "late",
        ] {
            let parsed = name.parse::<MarkType>().expect("known type");
            assert_eq!(parsed.as_str(), name);
        }
        assert!("excellent".parse::<MarkType>().is_err());
    }

    #[test]
    fn test_categories() {
        assert!(MarkType::Absent.is_flag());
        assert!(MarkType::Absent.is_lesson_bound());
        assert!(!MarkType::CourseGrade.is_lesson_bound());
        assert!(MarkType::SubjectGrade.is_grade_bearing());
        assert!(MarkType::NoticeBad.is_notice());
        assert!(!MarkType::NoticeBad.is_grade_bearing());
    }

    #[test]
    fn test_mark_serializes_type_field() {
        let mark = Mark {
            id: 1,
            user_id: 5,
            lesson_id: Some(3),
            course: Some(1),
            journal_id: 2,
            grade_id: None,
            comment: None,
            mark_type: MarkType::Late,
            teacher_id: 9,
            created_at: chrono::DateTime::<chrono::Utc>::from_timestamp(0, 0).unwrap(),
            updated_at: chrono::DateTime::<chrono::Utc>::from_timestamp(0, 0).unwrap(),
        };
        let json = serde_json::to_value(&mark).unwrap();
        assert_eq!(json["type"], "late");
    }
}
