//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod grades;
mod journals;
mod lessons;
mod marks;
mod subjects;
mod threads;
mod users;
mod years;

use crate::config::AppConfig;
use crate::errors::{Result, SchoolSystemError};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DatabaseTransaction, TransactionTrait};
use std::time::Duration;
use tracing::{info, warn};

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// 使用已有连接构建（不运行迁移）
    pub fn with_connection(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub(crate) async fn begin_txn(&self) -> Result<DatabaseTransaction> {
        self.db
            .begin()
            .await
            .map_err(|e| SchoolSystemError::transaction(format!("开启事务失败: {e}")))
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| SchoolSystemError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| SchoolSystemError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false);

        Database::connect(opt)
            .await
            .map_err(|e| SchoolSystemError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(SchoolSystemError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

/// 成功时提交，失败时回滚并原样返回错误
pub(crate) async fn finish_txn<T>(
    txn: DatabaseTransaction,
    result: Result<T>,
    what: &str,
) -> Result<T> {
    match result {
        Ok(value) => {
            txn.commit()
                .await
                .map_err(|e| SchoolSystemError::transaction(format!("提交事务失败: {e}")))?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                warn!("Rollback of {} failed: {}", what, rollback_err);
            }
            Err(e)
        }
    }
}

// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        self.get_users_by_ids_impl(ids).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    // 成绩等级模块
    async fn list_grades(&self) -> Result<Vec<Grade>> {
        self.list_grades_impl().await
    }

    async fn get_grade_by_id(&self, id: i64) -> Result<Option<Grade>> {
        self.get_grade_by_id_impl(id).await
    }

    async fn get_all_grade_ids(&self) -> Result<Vec<i64>> {
        self.get_all_grade_ids_impl().await
    }

    async fn create_grade(&self, req: CreateGradeRequest) -> Result<Grade> {
        self.create_grade_impl(req).await
    }

    async fn update_grade(&self, id: i64, update: UpdateGradeRequest) -> Result<Option<Grade>> {
        self.update_grade_impl(id, update).await
    }

    // 科目模块
    async fn list_subjects(&self) -> Result<Vec<Subject>> {
        self.list_subjects_impl().await
    }

    async fn get_subject_by_id(&self, id: i64) -> Result<Option<Subject>> {
        self.get_subject_by_id_impl(id).await
    }

    async fn create_subject(&self, name: &str) -> Result<Subject> {
        self.create_subject_impl(name).await
    }

    // 日志模块
    async fn create_journal(
        &self,
        name: &str,
        subject_id: i64,
        teacher_id: i64,
    ) -> Result<Journal> {
        self.create_journal_impl(name, subject_id, teacher_id).await
    }

    async fn get_journal_by_id(&self, id: i64) -> Result<Option<Journal>> {
        self.get_journal_by_id_impl(id).await
    }

    async fn list_journals(&self, archived: bool, teacher_id: Option<i64>) -> Result<Vec<Journal>> {
        self.list_journals_impl(archived, teacher_id).await
    }

    async fn list_journals_for_student(
        &self,
        student_id: i64,
        year_id: Option<i64>,
    ) -> Result<Vec<Journal>> {
        self.list_journals_for_student_impl(student_id, year_id)
            .await
    }

    async fn update_journal(
        &self,
        id: i64,
        name: Option<String>,
        teacher_id: Option<i64>,
    ) -> Result<Option<Journal>> {
        self.update_journal_impl(id, name, teacher_id).await
    }

    async fn set_journal_archived(&self, id: i64, archived: bool) -> Result<bool> {
        self.set_journal_archived_impl(id, archived).await
    }

    async fn delete_journal(&self, id: i64) -> Result<bool> {
        self.delete_journal_impl(id).await
    }

    async fn touch_journal(&self, id: i64) -> Result<()> {
        self.touch_journal_impl(id).await
    }

    async fn list_journal_students(&self, journal_id: i64) -> Result<Vec<User>> {
        self.list_journal_students_impl(journal_id).await
    }

    async fn get_student_ids_for_journal(&self, journal_id: i64) -> Result<Vec<i64>> {
        self.get_student_ids_for_journal_impl(journal_id).await
    }

    async fn is_user_in_journal(&self, user_id: i64, journal_id: i64) -> Result<bool> {
        self.is_user_in_journal_impl(user_id, journal_id).await
    }

    async fn add_students_to_journal(&self, journal_id: i64, student_ids: &[i64]) -> Result<u64> {
        self.add_students_to_journal_impl(journal_id, student_ids)
            .await
    }

    async fn remove_student_from_journal(&self, journal_id: i64, student_id: i64) -> Result<bool> {
        self.remove_student_from_journal_impl(journal_id, student_id)
            .await
    }

    // 课时模块
    async fn create_lesson(
        &self,
        journal_id: i64,
        date: chrono::NaiveDate,
        course: i32,
        description: Option<String>,
    ) -> Result<Lesson> {
        self.create_lesson_impl(journal_id, date, course, description)
            .await
    }

    async fn get_lesson_by_id(&self, id: i64) -> Result<Option<Lesson>> {
        self.get_lesson_by_id_impl(id).await
    }

    async fn list_lessons(&self, journal_id: i64, course: Option<i32>) -> Result<Vec<Lesson>> {
        self.list_lessons_impl(journal_id, course).await
    }

    // 评分模块
    async fn create_mark(&self, draft: MarkDraft) -> Result<Mark> {
        self.create_mark_impl(draft).await
    }

    async fn get_mark_by_id(&self, id: i64) -> Result<Option<Mark>> {
        self.get_mark_by_id_impl(id).await
    }

    async fn update_mark(
        &self,
        id: i64,
        grade_id: Option<i64>,
        comment: Option<String>,
        teacher_id: i64,
    ) -> Result<Option<Mark>> {
        self.update_mark_impl(id, grade_id, comment, teacher_id)
            .await
    }

    async fn delete_mark(&self, id: i64) -> Result<bool> {
        self.delete_mark_impl(id).await
    }

    async fn list_marks_for_lesson(&self, lesson_id: i64) -> Result<Vec<Mark>> {
        self.list_marks_for_lesson_impl(lesson_id).await
    }

    async fn list_marks_for_journal(
        &self,
        journal_id: i64,
        mark_type: MarkType,
        course: Option<i32>,
    ) -> Result<Vec<Mark>> {
        self.list_marks_for_journal_impl(journal_id, mark_type, course)
            .await
    }

    async fn list_marks_for_student(
        &self,
        student_id: i64,
        journal_ids: &[i64],
    ) -> Result<Vec<Mark>> {
        self.list_marks_for_student_impl(student_id, journal_ids)
            .await
    }

    async fn get_mark_refs_for_lesson(&self, lesson_id: i64) -> Result<LessonMarkRefs> {
        self.get_mark_refs_for_lesson_impl(lesson_id).await
    }

    async fn apply_mark_batch(&self, lesson_id: i64, batch: MarkBatch) -> Result<()> {
        self.apply_mark_batch_impl(lesson_id, batch).await
    }

    // 学年模块
    async fn list_years(&self) -> Result<Vec<Year>> {
        self.list_years_impl().await
    }

    async fn get_year_by_id(&self, id: i64) -> Result<Option<Year>> {
        self.get_year_by_id_impl(id).await
    }

    async fn create_year(&self, display_name: &str, courses: i32) -> Result<Year> {
        self.create_year_impl(display_name, courses).await
    }

    async fn count_journals_by_year(&self) -> Result<std::collections::HashMap<i64, u64>> {
        self.count_journals_by_year_impl().await
    }

    async fn list_years_for_student(&self, student_id: i64) -> Result<Vec<Year>> {
        self.list_years_for_student_impl(student_id).await
    }

    // 消息会话模块
    async fn create_thread(
        &self,
        author_id: i64,
        title: &str,
        body: &str,
        member_ids: &[i64],
    ) -> Result<Thread> {
        self.create_thread_impl(author_id, title, body, member_ids)
            .await
    }

    async fn get_thread_by_id(&self, id: i64) -> Result<Option<Thread>> {
        self.get_thread_by_id_impl(id).await
    }

    async fn list_threads_for_user(&self, user_id: i64) -> Result<Vec<Thread>> {
        self.list_threads_for_user_impl(user_id).await
    }

    async fn get_thread_member_ids(&self, thread_id: i64) -> Result<Vec<i64>> {
        self.get_thread_member_ids_impl(thread_id).await
    }

    async fn list_thread_logs(&self, thread_id: i64) -> Result<Vec<ThreadLog>> {
        self.list_thread_logs_impl(thread_id).await
    }

    async fn delete_thread(&self, id: i64) -> Result<bool> {
        self.delete_thread_impl(id).await
    }

    async fn set_thread_locked(&self, id: i64, locked: bool, by_user: i64) -> Result<bool> {
        self.set_thread_locked_impl(id, locked, by_user).await
    }

    async fn add_thread_members(
        &self,
        thread_id: i64,
        user_ids: &[i64],
        by_user: i64,
    ) -> Result<Vec<i64>> {
        self.add_thread_members_impl(thread_id, user_ids, by_user)
            .await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use super::SeaOrmStorage;
    use crate::models::grades::requests::CreateGradeRequest;
    use crate::models::users::{
        entities::{User, UserRole},
        requests::CreateUserRequest,
    };
    use crate::storage::Storage;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectOptions, Database};

    /// 内存 SQLite，单连接保证所有查询落在同一个库上
    pub async fn memory_storage() -> SeaOrmStorage {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(opt).await.expect("connect sqlite memory");
        Migrator::up(&db, None).await.expect("run migrations");
        SeaOrmStorage::with_connection(db)
    }

    pub async fn seed_user(storage: &Arc<dyn Storage>, username: &str, role: UserRole) -> User {
        storage
            .create_user(CreateUserRequest {
                username: username.into(),
                email: format!("{username}@school.example"),
                password: "not-a-real-hash".into(),
                role,
                display_name: None,
            })
            .await
            .expect("seed user")
    }

    /// 一个教师、两个学生、一个日志、一节课、两个成绩等级
    pub struct SeededLesson {
        pub storage: Arc<dyn Storage>,
        pub admin: User,
        pub teacher: User,
        pub students: Vec<User>,
        pub outsider: User,
        pub journal_id: i64,
        pub lesson_id: i64,
        pub grade_ids: Vec<i64>,
    }

    pub async fn seeded_lesson() -> SeededLesson {
        let storage: Arc<dyn Storage> = Arc::new(memory_storage().await);
        let admin = seed_user(&storage, "admin", UserRole::Admin).await;
        let teacher = seed_user(&storage, "teacher01", UserRole::Teacher).await;
        let students = vec![
            seed_user(&storage, "student01", UserRole::Student).await,
            seed_user(&storage, "student02", UserRole::Student).await,
        ];
        let outsider = seed_user(&storage, "student99", UserRole::Student).await;

        let subject = storage.create_subject("Algebra").await.expect("seed subject");
        let journal = storage
            .create_journal("8B Algebra", subject.id, teacher.id)
            .await
            .expect("seed journal");
        let ids: Vec<i64> = students.iter().map(|s| s.id).collect();
        storage
            .add_students_to_journal(journal.id, &ids)
            .await
            .expect("enroll students");
        let lesson = storage
            .create_lesson(
                journal.id,
                chrono::NaiveDate::from_ymd_opt(2025, 9, 1).expect("valid date"),
                1,
                Some("Linear equations".into()),
            )
            .await
            .expect("seed lesson");

        let mut grade_ids = Vec::new();
        for value in [3, 5] {
            let grade = storage
                .create_grade(CreateGradeRequest {
                    identifier: value.to_string(),
                    value,
                })
                .await
                .expect("seed grade");
            grade_ids.push(grade.id);
        }

        SeededLesson {
            storage,
            admin,
            teacher,
            students,
            outsider,
            journal_id: journal.id,
            lesson_id: lesson.id,
            grade_ids,
        }
    }
}
