use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradeService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::internal_error;

pub async fn list_grades(
    service: &GradeService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.list_grades().await {
        Ok(grades) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            grades,
            "Grade list retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to retrieve grade list", e)),
    }
}

pub async fn get_grade(
    service: &GradeService,
    grade_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.get_grade_by_id(grade_id).await {
        Ok(Some(grade)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            grade,
            "Grade retrieved successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::GradeNotFound,
            "Grade not found",
        ))),
        Err(e) => Ok(internal_error("Failed to retrieve grade", e)),
    }
}
