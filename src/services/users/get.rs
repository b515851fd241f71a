use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, forbidden, internal_error};

// 管理员可查看任意用户，其他用户只能查看自己
pub async fn get_user(
    service: &UserService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let current = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if !current.is_admin() && current.id != user_id {
        return Ok(forbidden("Cannot view other users"));
    }

    let storage = service.get_storage(request)?;

    match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            user,
            "User information retrieved successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Err(e) => Ok(internal_error("Failed to get user information", e)),
    }
}
