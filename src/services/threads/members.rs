use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{ThreadService, ensure_users_exist, load_managed_thread};
use crate::models::threads::{requests::AddThreadUsersRequest, responses::ThreadMembersResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, internal_error};

/// 添加成员，已在会话中的用户跳过，返回完整的成员列表
pub async fn add_users(
    service: &ThreadService,
    thread_id: i64,
    body: AddThreadUsersRequest,
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

    if body.user_ids.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            "user_ids must not be empty",
        )));
    }
    if let Err(resp) = ensure_users_exist(&storage, &body.user_ids).await {
        return Ok(resp);
    }

    let added = match storage
        .add_thread_members(thread.id, &body.user_ids, user.id)
        .await
    {
        Ok(added) => added,
        Err(e) => return Ok(internal_error("Failed to add thread members", e)),
    };
    if !added.is_empty() {
        info!(
            "{} user(s) added to thread {} by user {}",
            added.len(),
            thread.id,
            user.id
        );
    }

    match storage.get_thread_member_ids(thread.id).await {
        Ok(member_ids) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ThreadMembersResponse {
                thread_id: thread.id,
                member_ids,
            },
            format!("{} user(s) added", added.len()),
        ))),
        Err(e) => Ok(internal_error("Failed to load thread members", e)),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;

    use super::*;
    use crate::services::test_support::{body_json, request_as};
    use crate::storage::sea_orm_storage::test_support::seeded_lesson;

    #[tokio::test]
    async fn test_add_users_skips_existing_members() {
        let seed = seeded_lesson().await;
        let thread = seed
            .storage
            .create_thread(seed.teacher.id, "Trip", "Bring forms", &[seed.students[0].id])
            .await
            .unwrap();
        let service = ThreadService::with_storage(seed.storage.clone());
        let as_teacher = request_as(&seed.teacher);

        let resp = service
            .add_users(
                thread.id,
                AddThreadUsersRequest {
                    user_ids: vec![seed.students[1].id, 777],
                },
                &as_teacher,
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp)["data"], serde_json::json!([777]));

        let resp = service
            .add_users(
                thread.id,
                AddThreadUsersRequest {
                    user_ids: vec![seed.students[0].id, seed.students[1].id],
                },
                &as_teacher,
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp);
        assert_eq!(body["message"], "1 user(s) added");
        assert_eq!(
            body["data"]["member_ids"],
            serde_json::json!([seed.teacher.id, seed.students[0].id, seed.students[1].id])
        );

        let logs = seed.storage.list_thread_logs(thread.id).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].targets, vec![seed.students[1].id]);

        let resp = service
            .add_users(
                thread.id,
                AddThreadUsersRequest {
                    user_ids: vec![seed.outsider.id],
                },
                &request_as(&seed.students[0]),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
