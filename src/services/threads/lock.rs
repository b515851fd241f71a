use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{ThreadService, load_managed_thread};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, internal_error};

fn already(locked: bool) -> HttpResponse {
    let (code, message) = if locked {
        (ErrorCode::ThreadAlreadyLocked, "Thread is already locked")
    } else {
        (ErrorCode::ThreadAlreadyUnlocked, "Thread is already unlocked")
    };
    HttpResponse::Conflict().json(ApiResponse::error_empty(code, message))
}

pub async fn set_locked(
    service: &ThreadService,
    thread_id: i64,
    locked: bool,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let thread = match load_managed_thread(&storage, thread_id, &user).await {
        Ok(thread) => thread,
        Err(resp) => return Ok(resp),
    };
    if thread.locked == locked {
        return Ok(already(locked));
    }

    // 并发请求可能已经改变了状态
    match storage.set_thread_locked(thread.id, locked, user.id).await {
        Ok(true) => {
            info!("Thread {} locked={} by user {}", thread.id, locked, user.id);
            let message = if locked { "Thread locked" } else { "Thread unlocked" };
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(message)))
        }
        Ok(false) => Ok(already(locked)),
        Err(e) => Ok(internal_error("Failed to update thread", e)),
    }
}
