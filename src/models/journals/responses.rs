use super::entities::Journal;
use crate::models::users::entities::User;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/journal.ts")]
pub struct JournalListResponse {
    pub items: Vec<Journal>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/journal.ts")]
pub struct JournalStudentsResponse {
    pub journal_id: i64,
    pub students: Vec<User>,
}
