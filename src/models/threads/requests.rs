use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/thread.ts")]
pub struct CreateThreadRequest {
    pub title: String,
    pub body: String,
    /// 除作者外的初始成员
    #[serde(default)]
    pub user_ids: Vec<i64>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/thread.ts")]
pub struct AddThreadUsersRequest {
    pub user_ids: Vec<i64>,
}
