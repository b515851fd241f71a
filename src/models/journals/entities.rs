use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 日志实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/journal.ts")]
pub struct Journal {
    pub id: i64,
    pub name: String,
    pub teacher_id: i64,
    pub subject_id: i64,
    /// 创建时的当前学年，没有学年时为空
    pub year_id: Option<i64>,
    pub archived: bool,
    /// 课时中最大的学期序号，没有课时时为 1
    pub current_course: i32,
    pub last_updated: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Journal {
    /// 日志教师或管理员可以管理该日志
    pub fn is_managed_by(&self, user: &crate::models::users::entities::User) -> bool {
        user.is_admin() || self.teacher_id == user.id
    }
}
