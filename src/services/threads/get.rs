use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ThreadService, load_thread};
use crate::models::threads::responses::{ThreadDetail, ThreadListResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, internal_error};

pub async fn list_my_threads(
    service: &ThreadService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    match storage.list_threads_for_user(user.id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ThreadListResponse { items },
            "Thread list retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to retrieve thread list", e)),
    }
}

// 会话成员或管理员可以查看
pub async fn get_thread(
    service: &ThreadService,
    thread_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let thread = match load_thread(&storage, thread_id).await {
        Ok(thread) => thread,
        Err(resp) => return Ok(resp),
    };

    let member_ids = match storage.get_thread_member_ids(thread.id).await {
        Ok(ids) => ids,
        Err(e) => return Ok(internal_error("Failed to load thread members", e)),
    };
    if !user.is_admin() && !member_ids.contains(&user.id) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::ThreadPermissionDenied,
            "Not a member of this thread",
        )));
    }

    let logs = match storage.list_thread_logs(thread.id).await {
        Ok(logs) => logs,
        Err(e) => return Ok(internal_error("Failed to load thread logs", e)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ThreadDetail {
            thread,
            member_ids,
            logs,
        },
        "Thread retrieved successfully",
    )))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;

    use super::*;
    use crate::services::test_support::{body_json, request_as};
    use crate::storage::sea_orm_storage::test_support::seeded_lesson;

    #[tokio::test]
    async fn test_thread_visible_to_members_and_admins() {
        let seed = seeded_lesson().await;
        let thread = seed
            .storage
            .create_thread(seed.teacher.id, "Trip", "Bring forms", &[seed.students[0].id])
            .await
            .unwrap();
        let service = ThreadService::with_storage(seed.storage.clone());

        let resp = service
            .get_thread(thread.id, &request_as(&seed.students[0]))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp);
        assert_eq!(body["data"]["title"], "Trip");
        assert_eq!(
            body["data"]["member_ids"],
            serde_json::json!([seed.teacher.id, seed.students[0].id])
        );

        let resp = service
            .get_thread(thread.id, &request_as(&seed.admin))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = service
            .get_thread(thread.id, &request_as(&seed.students[1]))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = service
            .get_thread(thread.id + 100, &request_as(&seed.admin))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = service
            .list_my_threads(&request_as(&seed.students[1]))
            .await
            .unwrap();
        assert_eq!(body_json(resp)["data"]["items"], serde_json::json!([]));
    }
}
