use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{JournalService, load_managed_journal, reject_archived};
use crate::models::journals::requests::UpdateJournalRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, forbidden, internal_error};
use crate::utils::validate::validate_name;

pub async fn update_journal(
    service: &JournalService,
    journal_id: i64,
    update_data: UpdateJournalRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let journal = match load_managed_journal(&storage, journal_id, &user).await {
        Ok(journal) => journal,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = reject_archived(&journal) {
        return Ok(resp);
    }

    if let Some(name) = &update_data.name
        && let Err(msg) = validate_name(name)
    {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
    }

    // 更换教师需要管理员，且新教师必须具备授课角色
    let teacher_id = update_data
        .teacher_id
        .filter(|id| *id != journal.teacher_id);
    if let Some(new_teacher_id) = teacher_id {
        if !user.is_admin() {
            return Ok(forbidden("Only administrators can reassign journals"));
        }
        match storage.get_user_by_id(new_teacher_id).await {
            Ok(Some(teacher)) if teacher.role.can_teach() => {}
            Ok(Some(_)) => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::BadRequest,
                    "New teacher must have the teacher or admin role",
                )));
            }
            Ok(None) => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::UserNotFound,
                    "New teacher not found",
                )));
            }
            Err(e) => return Ok(internal_error("Failed to load teacher", e)),
        }
    }

    match storage
        .update_journal(journal.id, update_data.name, teacher_id)
        .await
    {
        Ok(Some(journal)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            journal,
            "Journal updated successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::JournalNotFound,
            "Journal not found",
        ))),
        Err(e) => Ok(internal_error("Failed to update journal", e)),
    }
}

// 归档：教师或管理员；取消归档：仅管理员
pub async fn set_archived(
    service: &JournalService,
    journal_id: i64,
    archived: bool,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if !archived && !user.is_admin() {
        return Ok(forbidden("Only administrators can unarchive journals"));
    }

    let storage = service.get_storage(request)?;
    let journal = match load_managed_journal(&storage, journal_id, &user).await {
        Ok(journal) => journal,
        Err(resp) => return Ok(resp),
    };

    match storage.set_journal_archived(journal.id, archived).await {
        Ok(_) => {
            info!(
                "Journal {} archived={} by user {}",
                journal.id, archived, user.id
            );
            let message = if archived {
                "Journal archived"
            } else {
                "Journal unarchived"
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(message)))
        }
        Err(e) => Ok(internal_error("Failed to change archive state", e)),
    }
}
