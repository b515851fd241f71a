use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::JournalService;
use crate::models::journals::{requests::JournalListParams, responses::JournalListResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, forbidden, internal_error};

pub async fn list_journals(
    service: &JournalService,
    params: JournalListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.list_journals(params.archived, None).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            JournalListResponse { items },
            "Journal list retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to retrieve journal list", e)),
    }
}

pub async fn list_journals_for_teacher(
    service: &JournalService,
    teacher_id: i64,
    params: JournalListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    // 教师只能查看自己的日志
    if !user.is_admin() && user.id != teacher_id {
        return Ok(forbidden("Cannot view another teacher's journals"));
    }

    let storage = service.get_storage(request)?;

    match storage.get_user_by_id(teacher_id).await {
        Ok(Some(teacher)) if teacher.role.can_teach() => {}
        Ok(Some(_)) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                "User is not a teacher",
            )));
        }
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::UserNotFound,
                "User not found",
            )));
        }
        Err(e) => return Ok(internal_error("Failed to load teacher", e)),
    }

    match storage.list_journals(params.archived, Some(teacher_id)).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            JournalListResponse { items },
            "Journal list retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to retrieve journal list", e)),
    }
}
