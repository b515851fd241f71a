use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{StudentService, load_visible_student};
use crate::models::ApiResponse;
use crate::models::students::responses::StudentYearsResponse;
use crate::services::{current_user, internal_error};

pub async fn list_years(
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

    match storage.list_years_for_student(student.id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            StudentYearsResponse {
                student_id: student.id,
                items,
            },
            "Student years retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to retrieve student years", e)),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;

    use super::*;
    use crate::services::test_support::{body_json, request_as};
    use crate::storage::sea_orm_storage::test_support::seeded_lesson;

    #[tokio::test]
    async fn test_years_follow_enrolled_journals() {
        let seed = seeded_lesson().await;
        let year = seed.storage.create_year("2025/2026", 2).await.unwrap();
        let subject = seed.storage.create_subject("Chemistry").await.unwrap();
        let journal = seed
            .storage
            .create_journal("9A Chemistry", subject.id, seed.teacher.id)
            .await
            .unwrap();
        seed.storage
            .add_students_to_journal(journal.id, &[seed.students[1].id])
            .await
            .unwrap();
        let service = StudentService::with_storage(seed.storage.clone());

        let resp = service
            .list_years(seed.students[1].id, &request_as(&seed.students[1]))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp);
        assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"]["items"][0]["id"], year.id);

        // 只在没有学年的日志中
        let resp = service
            .list_years(seed.students[0].id, &request_as(&seed.admin))
            .await
            .unwrap();
        assert_eq!(body_json(resp)["data"]["items"], serde_json::json!([]));
    }
}
