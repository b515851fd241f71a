use super::entities::{Thread, ThreadLog};
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/thread.ts")]
pub struct ThreadDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub thread: Thread,
    pub member_ids: Vec<i64>,
    pub logs: Vec<ThreadLog>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/thread.ts")]
pub struct ThreadListResponse {
    pub items: Vec<Thread>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/thread.ts")]
pub struct ThreadMembersResponse {
    pub thread_id: i64,
    pub member_ids: Vec<i64>,
}
