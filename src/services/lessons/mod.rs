pub mod create;
pub mod get;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::lessons::entities::Lesson;
use crate::models::lessons::requests::{CreateLessonRequest, LessonListParams};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub struct LessonService {
    storage: Option<Arc<dyn Storage>>,
}

impl LessonService {
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

    pub async fn get_lesson(
        &self,
        lesson_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        get::get_lesson(self, lesson_id, request).await
    }

    pub async fn list_lessons(
        &self,
        journal_id: i64,
        params: LessonListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_lessons(self, journal_id, params, request).await
    }

    pub async fn create_lesson(
        &self,
        journal_id: i64,
        lesson_data: CreateLessonRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_lesson(self, journal_id, lesson_data, request).await
    }
}

/// 读取课时，不存在时返回 404 响应
pub(crate) async fn load_lesson(
    storage: &Arc<dyn Storage>,
    lesson_id: i64,
) -> Result<Lesson, HttpResponse> {
    match storage.get_lesson_by_id(lesson_id).await {
        Ok(Some(lesson)) => Ok(lesson),
        Ok(None) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::LessonNotFound,
            "Lesson not found",
        ))),
        Err(e) => Err(super::internal_error("Failed to load lesson", e)),
    }
}
