//! API 与业务数据模型

pub mod common;
pub mod grades;
pub mod journals;
pub mod lessons;
pub mod marks;
pub mod students;
pub mod subjects;
pub mod threads;
pub mod users;
pub mod years;

pub use common::*;

/// 程序启动时间
#[derive(Debug, Clone, Copy)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 响应信封中的业务状态码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    ValidationFailed = 1010,
    InternalServerError = 5000,

    // 用户
    UserNotFound = 2004,
    UserNameInvalid = 2010,
    UserEmailInvalid = 2011,
    UserPasswordInvalid = 2012,
    UserNameAlreadyExists = 2013,
    UserEmailAlreadyExists = 2014,
    UserCreationFailed = 2020,

    // 科目与等级
    SubjectNotFound = 3004,
    GradeNotFound = 3104,

    // 日志
    JournalNotFound = 4004,
    JournalPermissionDenied = 4003,
    JournalArchived = 4010,
    JournalNotArchived = 4011,
    StudentNotInJournal = 4020,

    // 课时与评分
    LessonNotFound = 5104,
    MarkNotFound = 5204,

    // 学年
    YearNotFound = 5304,

    // 消息会话
    ThreadPermissionDenied = 6003,
    ThreadNotFound = 6004,
    ThreadAlreadyLocked = 6010,
    ThreadAlreadyUnlocked = 6011,
}
