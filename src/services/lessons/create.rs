use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::LessonService;
use crate::models::lessons::requests::CreateLessonRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::journals::{load_managed_journal, reject_archived};
use crate::services::{current_user, internal_error};
use crate::utils::validate::{validate_course, validate_lesson_date};

pub async fn create_lesson(
    service: &LessonService,
    journal_id: i64,
    lesson_data: CreateLessonRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let date = match validate_lesson_date(&lesson_data.date) {
        Ok(date) => date,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
        }
    };
    if let Err(msg) = validate_course(lesson_data.course) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
    }

    let storage = service.get_storage(request)?;
    let journal = match load_managed_journal(&storage, journal_id, &user).await {
        Ok(journal) => journal,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = reject_archived(&journal) {
        return Ok(resp);
    }

    let description = lesson_data
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    match storage
        .create_lesson(journal.id, date, lesson_data.course, description)
        .await
    {
        Ok(lesson) => {
            if let Err(e) = storage.touch_journal(journal.id).await {
                return Ok(internal_error("Failed to update journal", e));
            }
            info!("Lesson {} created in journal {}", lesson.id, journal.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                lesson,
                "Lesson created successfully",
            )))
        }
        Err(e) => Ok(internal_error("Failed to create lesson", e)),
    }
}
