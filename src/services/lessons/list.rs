use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::LessonService;
use crate::models::lessons::requests::LessonListParams;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::journals::load_journal;
use crate::services::{current_user, forbidden, internal_error};

pub async fn list_lessons(
    service: &LessonService,
    journal_id: i64,
    params: LessonListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    if let Some(course) = params.course
        && course < 1
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            "course must be at least 1",
        )));
    }

    let storage = service.get_storage(request)?;
    let journal = match load_journal(&storage, journal_id).await {
        Ok(journal) => journal,
        Err(resp) => return Ok(resp),
    };

    let allowed = journal.is_managed_by(&user)
        || (user.role == UserRole::Student
            && matches!(storage.is_user_in_journal(user.id, journal.id).await, Ok(true)));
    if !allowed {
        return Ok(forbidden("No access to this journal"));
    }

    match storage.list_lessons(journal.id, params.course).await {
        Ok(lessons) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            lessons,
            "Lesson list retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to retrieve lesson list", e)),
    }
}
