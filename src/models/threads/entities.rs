use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 消息会话
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/thread.ts")]
pub struct Thread {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub body: String,
    pub locked: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Thread {
    /// 作者或管理员可以管理会话
    pub fn is_managed_by(&self, user: &crate::models::users::entities::User) -> bool {
        user.is_admin() || self.author_id == user.id
    }
}

// 会话操作类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/thread.ts")]
pub enum ThreadAction {
    Locked,
    Unlocked,
    AddedUser,
}

impl ThreadAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadAction::Locked => "locked",
            ThreadAction::Unlocked => "unlocked",
            ThreadAction::AddedUser => "added_user",
        }
    }
}

impl std::str::FromStr for ThreadAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "locked" => Ok(ThreadAction::Locked),
            "unlocked" => Ok(ThreadAction::Unlocked),
            "added_user" => Ok(ThreadAction::AddedUser),
            _ => Err(format!("Invalid thread action: {s}")),
        }
    }
}

// 会话操作记录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/thread.ts")]
pub struct ThreadLog {
    pub action: ThreadAction,
    pub targets: Vec<i64>,
    pub by_user: i64,
    pub at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_action_names() {
        for action in [
            ThreadAction::Locked,
            ThreadAction::Unlocked,
            ThreadAction::AddedUser,
        ] {
            assert_eq!(action.as_str().parse::<ThreadAction>(), Ok(action));
            assert_eq!(
                serde_json::to_value(action).unwrap(),
                serde_json::json!(action.as_str())
            );
        }
        assert!("closed".parse::<ThreadAction>().is_err());
    }
}
