use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{JournalService, load_journal};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, forbidden, internal_error};

// 只允许删除已归档的日志
pub async fn delete_journal(
    service: &JournalService,
    journal_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if !user.is_admin() {
        return Ok(forbidden("Only administrators can delete journals"));
    }

    let storage = service.get_storage(request)?;
    let journal = match load_journal(&storage, journal_id).await {
        Ok(journal) => journal,
        Err(resp) => return Ok(resp),
    };

    if !journal.archived {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::JournalNotArchived,
            "Only archived journals can be deleted",
        )));
    }

    match storage.delete_journal(journal.id).await {
        Ok(_) => {
            info!("Journal {} deleted by user {}", journal.id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Journal deleted")))
        }
        Err(e) => Ok(internal_error("Failed to delete journal", e)),
    }
}
