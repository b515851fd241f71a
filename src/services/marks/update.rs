use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::debug;

use super::{MarkService, load_managed_mark};
use crate::models::marks::requests::UpdateMarkRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, internal_error};

pub async fn update_mark(
    service: &MarkService,
    mark_id: i64,
    update_data: UpdateMarkRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let mark = match load_managed_mark(&storage, mark_id, &user).await {
        Ok(mark) => mark,
        Err(resp) => return Ok(resp),
    };

    // 只保留真正发生变化的字段
    let grade_id = match update_data.grade_id {
        Some(grade_id) if Some(grade_id) != mark.grade_id => {
            if !mark.mark_type.is_grade_bearing() {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::ValidationFailed,
                    format!("{} marks do not carry a grade", mark.mark_type),
                )));
            }
            match storage.get_grade_by_id(grade_id).await {
                Ok(Some(_)) => Some(grade_id),
                Ok(None) => {
                    return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                        ErrorCode::GradeNotFound,
                        format!("invalid grade ID: {grade_id}"),
                    )));
                }
                Err(e) => return Ok(internal_error("Failed to load grade", e)),
            }
        }
        _ => None,
    };

    let comment = update_data.comment.map(|c| c.trim().to_string());
    if mark.mark_type.is_notice() && comment.as_deref() == Some("") {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            "comment must not be empty",
        )));
    }
    let comment = comment.filter(|c| mark.comment.as_deref() != Some(c.as_str()));

    if grade_id.is_none() && comment.is_none() {
        debug!("Mark {} unchanged", mark.id);
        return Ok(HttpResponse::Ok().json(ApiResponse::success(mark, "Mark unchanged")));
    }

    match storage.update_mark(mark.id, grade_id, comment, user.id).await {
        Ok(Some(updated)) => Ok(HttpResponse::Ok().json(ApiResponse::success(updated, "Mark updated"))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::MarkNotFound,
            "Mark not found",
        ))),
        Err(e) => Ok(internal_error("Failed to update mark", e)),
    }
}
