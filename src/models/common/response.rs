use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::ErrorCode;

/// 接口统一响应信封：`{code, message, data?, timestamp}`
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/api.ts")]
pub struct ApiResponse<T: TS> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T: TS> ApiResponse<T> {
    fn envelope(code: ErrorCode, data: Option<T>, message: String) -> Self {
        Self {
            code: code as i32,
            message,
            data,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self::envelope(ErrorCode::Success, Some(data), message.into())
    }

    // 校验失败时 data 携带字段级错误列表
    pub fn error(code: ErrorCode, data: T, message: impl Into<String>) -> Self {
        Self::envelope(code, Some(data), message.into())
    }

    pub fn is_success(&self) -> bool {
        self.code == ErrorCode::Success as i32
    }
}

impl ApiResponse<()> {
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self::envelope(ErrorCode::Success, None, message.into())
    }

    pub fn error_empty(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::envelope(code, None, message.into())
    }
}
