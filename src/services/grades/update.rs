use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{GradeService, validate_grade_fields};
use crate::models::grades::requests::UpdateGradeRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::internal_error;

pub async fn update_grade(
    service: &GradeService,
    grade_id: i64,
    mut update_data: UpdateGradeRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_grade_fields(update_data.identifier.as_deref(), update_data.value) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
    }
    update_data.identifier = update_data.identifier.map(|i| i.trim().to_string());

    let storage = service.get_storage(request)?;

    match storage.update_grade(grade_id, update_data).await {
        Ok(Some(grade)) => Ok(HttpResponse::Ok().json(ApiResponse::success(grade, "Grade updated"))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::GradeNotFound,
            "Grade not found",
        ))),
        Err(e) => Ok(internal_error("Failed to update grade", e)),
    }
}
