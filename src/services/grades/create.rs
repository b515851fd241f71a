use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{GradeService, validate_grade_fields};
use crate::models::grades::requests::CreateGradeRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::internal_error;

pub async fn create_grade(
    service: &GradeService,
    mut grade_data: CreateGradeRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) =
        validate_grade_fields(Some(grade_data.identifier.as_str()), Some(grade_data.value))
    {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
    }
    grade_data.identifier = grade_data.identifier.trim().to_string();

    let storage = service.get_storage(request)?;

    match storage.create_grade(grade_data).await {
        Ok(grade) => {
            info!("Grade {} ({}) created", grade.id, grade.identifier);
            Ok(HttpResponse::Created().json(ApiResponse::success(grade, "Grade created")))
        }
        Err(e) => Ok(internal_error("Failed to create grade", e)),
    }
}
