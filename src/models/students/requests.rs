use serde::Deserialize;
use ts_rs::TS;

// 学生评分查询参数，学年必填
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct StudentMarksParams {
    pub year: i64,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct StudentLessonsParams {
    pub course: i32,
}
