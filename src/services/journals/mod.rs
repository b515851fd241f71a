pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod students;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::journals::entities::Journal;
use crate::models::journals::requests::{
    AddStudentsRequest, CreateJournalRequest, JournalListParams, UpdateJournalRequest,
};
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub struct JournalService {
    storage: Option<Arc<dyn Storage>>,
}

impl JournalService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub fn with_storage(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage: Some(storage),
        }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        super::resolve_storage(&self.storage, request)
    }

    // 所有日志（管理员）
    pub async fn list_journals(
        &self,
        params: JournalListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_journals(self, params, request).await
    }

    // 某位教师的日志
    pub async fn list_journals_for_teacher(
        &self,
        teacher_id: i64,
        params: JournalListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_journals_for_teacher(self, teacher_id, params, request).await
    }

    pub async fn get_journal(
        &self,
        journal_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        get::get_journal(self, journal_id, request).await
    }

    pub async fn create_journal(
        &self,
        journal_data: CreateJournalRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_journal(self, journal_data, request).await
    }

    pub async fn update_journal(
        &self,
        journal_id: i64,
        update_data: UpdateJournalRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_journal(self, journal_id, update_data, request).await
    }

    pub async fn archive_journal(
        &self,
        journal_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::set_archived(self, journal_id, true, request).await
    }

    pub async fn unarchive_journal(
        &self,
        journal_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::set_archived(self, journal_id, false, request).await
    }

    pub async fn delete_journal(
        &self,
        journal_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_journal(self, journal_id, request).await
    }

    pub async fn list_students(
        &self,
        journal_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        students::list_students(self, journal_id, request).await
    }

    pub async fn add_students(
        &self,
        journal_id: i64,
        body: AddStudentsRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        students::add_students(self, journal_id, body, request).await
    }

    pub async fn remove_student(
        &self,
        journal_id: i64,
        student_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        students::remove_student(self, journal_id, student_id, request).await
    }
}

/// 读取日志，不存在时返回 404 响应
pub(crate) async fn load_journal(
    storage: &Arc<dyn Storage>,
    journal_id: i64,
) -> Result<Journal, HttpResponse> {
    match storage.get_journal_by_id(journal_id).await {
        Ok(Some(journal)) => Ok(journal),
        Ok(None) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::JournalNotFound,
            "Journal not found",
        ))),
        Err(e) => Err(super::internal_error("Failed to load journal", e)),
    }
}

/// 读取日志并确认当前用户是该日志的教师或管理员
pub(crate) async fn load_managed_journal(
    storage: &Arc<dyn Storage>,
    journal_id: i64,
    user: &User,
) -> Result<Journal, HttpResponse> {
    let journal = load_journal(storage, journal_id).await?;
    if !journal.is_managed_by(user) {
        return Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::JournalPermissionDenied,
            "Only the journal's teacher or an administrator may do this",
        )));
    }
    Ok(journal)
}

/// 归档日志只读
pub(crate) fn reject_archived(journal: &Journal) -> Result<(), HttpResponse> {
    if journal.archived {
        return Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::JournalArchived,
            "Journal is archived",
        )));
    }
    Ok(())
}
