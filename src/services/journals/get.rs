use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{JournalService, load_journal};
use crate::models::ApiResponse;
use crate::models::users::entities::UserRole;
use crate::services::{current_user, forbidden, internal_error};

pub async fn get_journal(
    service: &JournalService,
    journal_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let journal = match load_journal(&storage, journal_id).await {
        Ok(journal) => journal,
        Err(resp) => return Ok(resp),
    };

    // 教师、管理员或在册学生可查看
    let allowed = if journal.is_managed_by(&user) {
        true
    } else if user.role == UserRole::Student {
        match storage.is_user_in_journal(user.id, journal.id).await {
            Ok(enrolled) => enrolled,
            Err(e) => return Ok(internal_error("Failed to check journal membership", e)),
        }
    } else {
        false
    };

    if !allowed {
        return Ok(forbidden("No access to this journal"));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        journal,
        "Journal retrieved successfully",
    )))
}
