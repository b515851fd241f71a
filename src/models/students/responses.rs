use std::collections::BTreeMap;

use serde::Serialize;
use ts_rs::TS;

use crate::models::journals::entities::Journal;
use crate::models::lessons::entities::Lesson;
use crate::models::marks::entities::Mark;
use crate::models::years::entities::Year;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct StudentJournalsResponse {
    pub student_id: i64,
    pub items: Vec<Journal>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct StudentYearsResponse {
    pub student_id: i64,
    pub items: Vec<Year>,
}

/// 同一学期的评分；科目总评等不属于任何学期的评分 `course` 为空
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct CourseMarks {
    pub course: Option<i32>,
    pub marks: Vec<Mark>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct JournalWithMarks {
    #[serde(flatten)]
    #[ts(flatten)]
    pub journal: Journal,
    pub courses: Vec<CourseMarks>,
}

impl JournalWithMarks {
    /// 按日志和学期分组，学期升序，无学期的一组排在最后
    pub fn group(journals: Vec<Journal>, marks: Vec<Mark>) -> Vec<JournalWithMarks> {
        let mut by_journal: BTreeMap<i64, BTreeMap<(bool, i32), Vec<Mark>>> = BTreeMap::new();
        for mark in marks {
            let key = (mark.course.is_none(), mark.course.unwrap_or(0));
            by_journal
                .entry(mark.journal_id)
                .or_default()
                .entry(key)
                .or_default()
                .push(mark);
        }

        journals
            .into_iter()
            .map(|journal| {
                let courses = by_journal
                    .remove(&journal.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|((no_course, course), marks)| CourseMarks {
                        course: (!no_course).then_some(course),
                        marks,
                    })
                    .collect();
                JournalWithMarks { journal, courses }
            })
            .collect()
    }
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct StudentMarksOverview {
    pub student_id: i64,
    pub year_id: i64,
    pub journals: Vec<JournalWithMarks>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct LessonWithMarks {
    #[serde(flatten)]
    #[ts(flatten)]
    pub lesson: Lesson,
    pub marks: Vec<Mark>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct StudentLessonsResponse {
    pub student_id: i64,
    pub journal_id: i64,
    pub course: i32,
    pub lessons: Vec<LessonWithMarks>,
}
