use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{StudentService, load_visible_student};
use crate::models::ApiResponse;
use crate::models::students::responses::StudentJournalsResponse;
use crate::services::{current_user, internal_error};

pub async fn list_journals(
    service: &StudentService,
    student_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let student = match load_visible_student(&storage, student_id, &user).await {
        Ok(student) => student,
        Err(resp) => return Ok(resp),
    };

    match storage.list_journals_for_student(student.id, None).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            StudentJournalsResponse {
                student_id: student.id,
                items,
            },
            "Student journals retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to retrieve student journals", e)),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;

    use super::*;
    use crate::services::test_support::{body_json, request_as};
    use crate::storage::sea_orm_storage::test_support::seeded_lesson;

    #[tokio::test]
    async fn test_student_journals_for_self_and_admin_only() {
        let seed = seeded_lesson().await;
        let service = StudentService::with_storage(seed.storage.clone());
        let student = &seed.students[0];

        let resp = service
            .list_journals(student.id, &request_as(student))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp);
        assert_eq!(body["data"]["items"][0]["id"], seed.journal_id);

        let resp = service
            .list_journals(student.id, &request_as(&seed.admin))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        for viewer in [&seed.students[1], &seed.teacher] {
            let resp = service
                .list_journals(student.id, &request_as(viewer))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        }

        let resp = service
            .list_journals(seed.teacher.id, &request_as(&seed.admin))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = service
            .list_journals(9999, &request_as(&seed.admin))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = service
            .list_journals(seed.outsider.id, &request_as(&seed.outsider))
            .await
            .unwrap();
        assert_eq!(body_json(resp)["data"]["items"], serde_json::json!([]));
    }
}
