use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 学年实体，同一时间只有一个当前学年
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/year.ts")]
pub struct Year {
    pub id: i64,
    pub display_name: String,
    /// 学年内的学期数
    pub courses: i32,
    pub current: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
