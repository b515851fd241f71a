use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{ThreadService, ensure_users_exist};
use crate::models::marks::requests::FieldError;
use crate::models::threads::requests::CreateThreadRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, internal_error};

pub async fn create_thread(
    service: &ThreadService,
    thread_data: CreateThreadRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let mut errors = Vec::new();
    if thread_data.title.trim().is_empty() {
        errors.push(FieldError::new("title", "must be provided"));
    }
    if thread_data.body.trim().is_empty() {
        errors.push(FieldError::new("body", "must be provided"));
    }
    if !errors.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error(
            ErrorCode::ValidationFailed,
            errors,
            "Invalid thread",
        )));
    }

    let storage = service.get_storage(request)?;

    if let Err(resp) = ensure_users_exist(&storage, &thread_data.user_ids).await {
        return Ok(resp);
    }

    match storage
        .create_thread(
            user.id,
            &thread_data.title,
            &thread_data.body,
            &thread_data.user_ids,
        )
        .await
    {
        Ok(thread) => {
            info!("Thread {} created by user {}", thread.id, user.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                thread,
                "Thread created successfully",
            )))
        }
        Err(e) => Ok(internal_error("Failed to create thread", e)),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;

    use super::*;
    use crate::services::test_support::{body_json, request_as};
    use crate::storage::sea_orm_storage::test_support::seeded_lesson;

    #[tokio::test]
    async fn test_create_thread_checks_fields_and_users() {
        let seed = seeded_lesson().await;
        let service = ThreadService::with_storage(seed.storage.clone());
        let as_teacher = request_as(&seed.teacher);

        let resp = service
            .create_thread(
                CreateThreadRequest {
                    title: " ".into(),
                    body: "".into(),
                    user_ids: Vec::new(),
                },
                &as_teacher,
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let fields: Vec<String> = body_json(resp)["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(fields, vec!["title", "body"]);

        let resp = service
            .create_thread(
                CreateThreadRequest {
                    title: "Exam".into(),
                    body: "Room 12".into(),
                    user_ids: vec![seed.students[0].id, 9999, 4242],
                },
                &as_teacher,
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp)["data"], serde_json::json!([4242, 9999]));

        let resp = service
            .create_thread(
                CreateThreadRequest {
                    title: "Exam".into(),
                    body: "Room 12".into(),
                    user_ids: vec![seed.students[0].id],
                },
                &as_teacher,
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let thread_id = body_json(resp)["data"]["id"].as_i64().unwrap();
        assert_eq!(
            seed.storage.get_thread_member_ids(thread_id).await.unwrap(),
            vec![seed.teacher.id, seed.students[0].id]
        );
    }
}
