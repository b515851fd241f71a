use serde::Deserialize;
use ts_rs::TS;

use crate::models::marks::requests::FieldError;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/year.ts")]
pub struct CreateYearRequest {
    pub display_name: String,
    pub courses: i32,
}

impl CreateYearRequest {
    /// 返回全部字段错误，而不是遇到第一个就停止
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.display_name.trim().is_empty() {
            errors.push(FieldError::new("display_name", "must not be empty"));
        }
        if self.courses < 1 {
            errors.push(FieldError::new("courses", "must be at least 1"));
        }
        errors
    }
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/year.ts")]
pub struct YearListParams {
    // 仅管理员可见
    #[serde(default)]
    pub stats: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_year_collects_all_errors() {
        let req = CreateYearRequest {
            display_name: "   ".into(),
            courses: 0,
        };
        let fields: Vec<String> = req.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["display_name", "courses"]);

        let req = CreateYearRequest {
            display_name: "2025/2026".into(),
            courses: 2,
        };
        assert!(req.validate().is_empty());
    }
}
