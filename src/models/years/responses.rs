use super::entities::Year;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/year.ts")]
pub struct YearSummary {
    #[serde(flatten)]
    #[ts(flatten)]
    pub year: Year,
    /// 仅在管理员请求统计时返回
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal_count: Option<u64>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/year.ts")]
pub struct YearListResponse {
    pub items: Vec<YearSummary>,
}
