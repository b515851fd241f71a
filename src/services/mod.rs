pub mod grades;
pub mod journals;
pub mod lessons;
pub mod marks;
pub mod students;
pub mod subjects;
pub mod threads;
pub mod users;
pub mod years;

pub use grades::GradeService;
pub use journals::JournalService;
pub use lessons::LessonService;
pub use marks::MarkService;
pub use students::StudentService;
pub use subjects::SubjectService;
pub use threads::ThreadService;
pub use users::UserService;
pub use years::YearService;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::error;

use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode, users::entities::User};
use crate::storage::Storage;

// 服务优先使用注入的存储，否则从 app data 中取
pub(crate) fn resolve_storage(
    storage: &Option<Arc<dyn Storage>>,
    request: &HttpRequest,
) -> ActixResult<Arc<dyn Storage>> {
    if let Some(storage) = storage {
        return Ok(storage.clone());
    }
    request
        .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| {
            error!("Storage not found in app data");
            actix_web::error::ErrorInternalServerError("Storage not configured")
        })
}

/// 当前登录用户，未经过 RequireJWT 时返回 401 响应
pub(crate) fn current_user(request: &HttpRequest) -> Result<User, HttpResponse> {
    RequireJWT::extract_user_claims(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Authentication required",
        ))
    })
}

/// 记录详细错误，对调用方只返回通用信息
pub(crate) fn internal_error(context: &str, err: impl std::fmt::Display) -> HttpResponse {
    error!("{}: {}", context, err);
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        context,
    ))
}

pub(crate) fn forbidden(message: &str) -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(ErrorCode::Forbidden, message))
}
