pub mod create;
pub mod delete;
pub mod get;
pub mod journal;
pub mod lesson;
pub mod reconcile;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::marks::{
    entities::Mark,
    requests::{CreateMarkRequest, JournalMarksParams, LessonMarksEntry, UpdateMarkRequest},
};
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub struct MarkService {
    storage: Option<Arc<dyn Storage>>,
}

impl MarkService {
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

    // 课时批量评分
    pub async fn set_marks_for_lesson(
        &self,
        lesson_id: i64,
        entries: Vec<LessonMarksEntry>,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        lesson::set_marks_for_lesson(self, lesson_id, entries, request).await
    }

    // 课时下各学生的评分
    pub async fn get_marks_for_lesson(
        &self,
        lesson_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        lesson::get_marks_for_lesson(self, lesson_id, request).await
    }

    // 日志下某一类型的评分
    pub async fn get_marks_for_journal(
        &self,
        journal_id: i64,
        params: JournalMarksParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        journal::get_marks_for_journal(self, journal_id, params, request).await
    }

    pub async fn create_mark(
        &self,
        mark_data: CreateMarkRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_mark(self, mark_data, request).await
    }

    pub async fn get_mark(&self, mark_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_mark(self, mark_id, request).await
    }

    pub async fn update_mark(
        &self,
        mark_id: i64,
        update_data: UpdateMarkRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_mark(self, mark_id, update_data, request).await
    }

    pub async fn delete_mark(
        &self,
        mark_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_mark(self, mark_id, request).await
    }
}

/// 读取评分并确认当前用户可以管理其所属日志
pub(crate) async fn load_managed_mark(
    storage: &Arc<dyn Storage>,
    mark_id: i64,
    user: &User,
) -> Result<Mark, HttpResponse> {
    let mark = match storage.get_mark_by_id(mark_id).await {
        Ok(Some(mark)) => mark,
        Ok(None) => {
            return Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::MarkNotFound,
                "Mark not found",
            )));
        }
        Err(e) => return Err(super::internal_error("Failed to load mark", e)),
    };
    super::journals::load_managed_journal(storage, mark.journal_id, user).await?;
    Ok(mark)
}
