use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{
    grades::{
        entities::Grade,
        requests::{CreateGradeRequest, UpdateGradeRequest},
    },
    journals::entities::Journal,
    lessons::entities::Lesson,
    marks::{
        batch::{LessonMarkRefs, MarkBatch, MarkDraft},
        entities::{Mark, MarkType},
    },
    subjects::entities::Subject,
    threads::entities::{Thread, ThreadLog},
    users::{
        entities::User,
        requests::{CreateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
    years::entities::Year,
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户（password 字段为已哈希的密码）
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名获取用户信息
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 批量获取用户
    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>>;
    // 列出用户
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;

    /// 成绩等级
    async fn list_grades(&self) -> Result<Vec<Grade>>;
    async fn get_grade_by_id(&self, id: i64) -> Result<Option<Grade>>;
    async fn get_all_grade_ids(&self) -> Result<Vec<i64>>;
    async fn create_grade(&self, req: CreateGradeRequest) -> Result<Grade>;
    async fn update_grade(&self, id: i64, update: UpdateGradeRequest) -> Result<Option<Grade>>;

    /// 科目
    async fn list_subjects(&self) -> Result<Vec<Subject>>;
    async fn get_subject_by_id(&self, id: i64) -> Result<Option<Subject>>;
    async fn create_subject(&self, name: &str) -> Result<Subject>;

    /// 日志管理方法
    async fn create_journal(&self, name: &str, subject_id: i64, teacher_id: i64)
    -> Result<Journal>;
    async fn get_journal_by_id(&self, id: i64) -> Result<Option<Journal>>;
    // teacher_id 为空时列出全部日志
    async fn list_journals(&self, archived: bool, teacher_id: Option<i64>) -> Result<Vec<Journal>>;
    // 学生所在的日志，year_id 为空时不按学年过滤
    async fn list_journals_for_student(
        &self,
        student_id: i64,
        year_id: Option<i64>,
    ) -> Result<Vec<Journal>>;
    async fn update_journal(
        &self,
        id: i64,
        name: Option<String>,
        teacher_id: Option<i64>,
    ) -> Result<Option<Journal>>;
    async fn set_journal_archived(&self, id: i64, archived: bool) -> Result<bool>;
    async fn delete_journal(&self, id: i64) -> Result<bool>;
    // 刷新日志的最后更新时间
    async fn touch_journal(&self, id: i64) -> Result<()>;

    /// 日志学生
    async fn list_journal_students(&self, journal_id: i64) -> Result<Vec<User>>;
    async fn get_student_ids_for_journal(&self, journal_id: i64) -> Result<Vec<i64>>;
    async fn is_user_in_journal(&self, user_id: i64, journal_id: i64) -> Result<bool>;
    // 返回实际新增的人数，已在日志中的学生会被跳过
    async fn add_students_to_journal(&self, journal_id: i64, student_ids: &[i64]) -> Result<u64>;
    async fn remove_student_from_journal(&self, journal_id: i64, student_id: i64) -> Result<bool>;

    /// 课时
    async fn create_lesson(
        &self,
        journal_id: i64,
        date: chrono::NaiveDate,
        course: i32,
        description: Option<String>,
    ) -> Result<Lesson>;
    async fn get_lesson_by_id(&self, id: i64) -> Result<Option<Lesson>>;
    async fn list_lessons(&self, journal_id: i64, course: Option<i32>) -> Result<Vec<Lesson>>;

    /// 评分
    // 单条评分的增改删与日志最后更新时间的刷新在同一事务中完成
    async fn create_mark(&self, draft: MarkDraft) -> Result<Mark>;
    async fn get_mark_by_id(&self, id: i64) -> Result<Option<Mark>>;
    async fn update_mark(
        &self,
        id: i64,
        grade_id: Option<i64>,
        comment: Option<String>,
        teacher_id: i64,
    ) -> Result<Option<Mark>>;
    async fn delete_mark(&self, id: i64) -> Result<bool>;
    async fn list_marks_for_lesson(&self, lesson_id: i64) -> Result<Vec<Mark>>;
    // course 为空时不按学期过滤
    async fn list_marks_for_journal(
        &self,
        journal_id: i64,
        mark_type: MarkType,
        course: Option<i32>,
    ) -> Result<Vec<Mark>>;
    async fn list_marks_for_student(&self, student_id: i64, journal_ids: &[i64])
    -> Result<Vec<Mark>>;
    async fn get_mark_refs_for_lesson(&self, lesson_id: i64) -> Result<LessonMarkRefs>;
    // 在一个事务中执行批量评分，失败时整体回滚
    async fn apply_mark_batch(&self, lesson_id: i64, batch: MarkBatch) -> Result<()>;

    /// 学年
    async fn list_years(&self) -> Result<Vec<Year>>;
    async fn get_year_by_id(&self, id: i64) -> Result<Option<Year>>;
    // 新学年同时成为当前学年
    async fn create_year(&self, display_name: &str, courses: i32) -> Result<Year>;
    async fn count_journals_by_year(&self) -> Result<HashMap<i64, u64>>;
    async fn list_years_for_student(&self, student_id: i64) -> Result<Vec<Year>>;

    /// 消息会话
    async fn create_thread(
        &self,
        author_id: i64,
        title: &str,
        body: &str,
        member_ids: &[i64],
    ) -> Result<Thread>;
    async fn get_thread_by_id(&self, id: i64) -> Result<Option<Thread>>;
    async fn list_threads_for_user(&self, user_id: i64) -> Result<Vec<Thread>>;
    async fn get_thread_member_ids(&self, thread_id: i64) -> Result<Vec<i64>>;
    async fn list_thread_logs(&self, thread_id: i64) -> Result<Vec<ThreadLog>>;
    async fn delete_thread(&self, id: i64) -> Result<bool>;
    // 状态未变化时返回 false
    async fn set_thread_locked(&self, id: i64, locked: bool, by_user: i64) -> Result<bool>;
    // 返回实际新增的成员
    async fn add_thread_members(
        &self,
        thread_id: i64,
        user_ids: &[i64],
        by_user: i64,
    ) -> Result<Vec<i64>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
