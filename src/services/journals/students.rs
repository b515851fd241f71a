use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashSet;

use super::{JournalService, load_journal, load_managed_journal, reject_archived};
use crate::models::journals::{requests::AddStudentsRequest, responses::JournalStudentsResponse};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, forbidden, internal_error};

pub async fn list_students(
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

    let allowed = journal.is_managed_by(&user)
        || (user.role == UserRole::Student
            && matches!(storage.is_user_in_journal(user.id, journal.id).await, Ok(true)));
    if !allowed {
        return Ok(forbidden("No access to this journal"));
    }

    match storage.list_journal_students(journal.id).await {
        Ok(students) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            JournalStudentsResponse {
                journal_id: journal.id,
                students,
            },
            "Journal students retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to retrieve journal students", e)),
    }
}

pub async fn add_students(
    service: &JournalService,
    journal_id: i64,
    body: AddStudentsRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let journal = match load_managed_journal(&storage, journal_id, &user).await {
        Ok(journal) => journal,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = reject_archived(&journal) {
        return Ok(resp);
    }

    if body.student_ids.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            "student_ids must not be empty",
        )));
    }

    let users = match storage.get_users_by_ids(&body.student_ids).await {
        Ok(users) => users,
        Err(e) => return Ok(internal_error("Failed to load students", e)),
    };
    let valid: HashSet<i64> = users
        .iter()
        .filter(|u| u.role == UserRole::Student)
        .map(|u| u.id)
        .collect();

    // 列出所有不存在或不是学生的 ID
    let mut invalid: Vec<i64> = body
        .student_ids
        .iter()
        .copied()
        .filter(|id| !valid.contains(id))
        .collect();
    if !invalid.is_empty() {
        invalid.sort_unstable();
        invalid.dedup();
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error(
            ErrorCode::ValidationFailed,
            invalid,
            "Some IDs do not belong to existing students",
        )));
    }

    match storage
        .add_students_to_journal(journal.id, &body.student_ids)
        .await
    {
        Ok(added) => {
            if added > 0
                && let Err(e) = storage.touch_journal(journal.id).await
            {
                return Ok(internal_error("Failed to update journal", e));
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                added,
                format!("{added} student(s) added"),
            )))
        }
        Err(e) => Ok(internal_error("Failed to add students", e)),
    }
}

pub async fn remove_student(
    service: &JournalService,
    journal_id: i64,
    student_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let journal = match load_managed_journal(&storage, journal_id, &user).await {
        Ok(journal) => journal,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = reject_archived(&journal) {
        return Ok(resp);
    }

    match storage
        .remove_student_from_journal(journal.id, student_id)
        .await
    {
        Ok(true) => {
            if let Err(e) = storage.touch_journal(journal.id).await {
                return Ok(internal_error("Failed to update journal", e));
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Student removed")))
        }
        Ok(false) => Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::StudentNotInJournal,
            "User not in journal",
        ))),
        Err(e) => Ok(internal_error("Failed to remove student", e)),
    }
}
