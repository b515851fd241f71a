use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{ThreadService, load_managed_thread};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, internal_error};

pub async fn delete_thread(
    service: &ThreadService,
    thread_id: i64,
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

    match storage.delete_thread(thread.id).await {
        Ok(true) => {
            info!("Thread {} deleted by user {}", thread.id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Thread deleted")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ThreadNotFound,
            "Thread not found",
        ))),
        Err(e) => Ok(internal_error("Failed to delete thread", e)),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;

    use super::*;
    use crate::services::test_support::request_as;
    use crate::storage::sea_orm_storage::test_support::seeded_lesson;

    #[tokio::test]
    async fn test_only_author_or_admin_deletes() {
        let seed = seeded_lesson().await;
        let thread = seed
            .storage
            .create_thread(seed.teacher.id, "Trip", "Bring forms", &[seed.students[0].id])
            .await
            .unwrap();
        let service = ThreadService::with_storage(seed.storage.clone());

        let resp = service
            .delete_thread(thread.id, &request_as(&seed.students[0]))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = service
            .delete_thread(thread.id, &request_as(&seed.admin))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(seed.storage.get_thread_by_id(thread.id).await.unwrap().is_none());

        let resp = service
            .delete_thread(thread.id, &request_as(&seed.admin))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
