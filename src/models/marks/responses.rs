use super::entities::Mark;
use crate::models::users::entities::User;
use serde::Serialize;
use ts_rs::TS;

/// 学生及其评分
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/mark.ts")]
pub struct StudentMarks {
    pub student: User,
    pub marks: Vec<Mark>,
}

impl StudentMarks {
    /// 按学生分组，保持学生列表的顺序
    pub fn group(students: Vec<User>, marks: Vec<Mark>) -> Vec<StudentMarks> {
        let mut grouped: Vec<StudentMarks> = students
            .into_iter()
            .map(|student| StudentMarks {
                student,
                marks: Vec::new(),
            })
            .collect();
        let index: std::collections::HashMap<i64, usize> = grouped
            .iter()
            .enumerate()
            .map(|(i, s)| (s.student.id, i))
            .collect();
        for mark in marks {
            if let Some(&i) = index.get(&mark.user_id) {
                grouped[i].marks.push(mark);
            }
        }
        grouped
    }
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/mark.ts")]
pub struct StudentMarksResponse {
    pub students: Vec<StudentMarks>,
}
