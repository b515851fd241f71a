use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/journal.ts")]
pub struct CreateJournalRequest {
    pub name: String,
    pub subject_id: i64,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/journal.ts")]
pub struct UpdateJournalRequest {
    pub name: Option<String>,
    pub teacher_id: Option<i64>,
}

// 日志列表查询参数
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/journal.ts")]
pub struct JournalListParams {
    #[serde(default)]
    pub archived: bool,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/journal.ts")]
pub struct AddStudentsRequest {
    pub student_ids: Vec<i64>,
}
