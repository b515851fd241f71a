use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{LessonService, load_lesson};
use crate::models::ApiResponse;
use crate::models::users::entities::UserRole;
use crate::services::journals::load_journal;
use crate::services::{current_user, forbidden};

pub async fn get_lesson(
    service: &LessonService,
    lesson_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let lesson = match load_lesson(&storage, lesson_id).await {
        Ok(lesson) => lesson,
        Err(resp) => return Ok(resp),
    };
    let journal = match load_journal(&storage, lesson.journal_id).await {
        Ok(journal) => journal,
        Err(resp) => return Ok(resp),
    };

    let allowed = journal.is_managed_by(&user)
        || (user.role == UserRole::Student
            && matches!(storage.is_user_in_journal(user.id, journal.id).await, Ok(true)));
    if !allowed {
        return Ok(forbidden("No access to this lesson"));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        lesson,
        "Lesson retrieved successfully",
    )))
}
