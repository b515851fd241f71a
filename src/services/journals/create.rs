use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::JournalService;
use crate::models::journals::requests::CreateJournalRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, forbidden, internal_error};
use crate::utils::validate::validate_name;

pub async fn create_journal(
    service: &JournalService,
    journal_data: CreateJournalRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    if !user.role.can_teach() {
        return Ok(forbidden("Only teachers can create journals"));
    }

    if let Err(msg) = validate_name(&journal_data.name) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
    }

    let storage = service.get_storage(request)?;

    match storage.get_subject_by_id(journal_data.subject_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::SubjectNotFound,
                "Subject not found",
            )));
        }
        Err(e) => return Ok(internal_error("Failed to load subject", e)),
    }

    // 创建者即为日志教师
    match storage
        .create_journal(journal_data.name.trim(), journal_data.subject_id, user.id)
        .await
    {
        Ok(journal) => {
            info!("Journal {} created by user {}", journal.id, user.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                journal,
                "Journal created successfully",
            )))
        }
        Err(e) => Ok(internal_error("Failed to create journal", e)),
    }
}
