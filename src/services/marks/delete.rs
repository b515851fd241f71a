use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{MarkService, load_managed_mark};
use crate::models::ApiResponse;
use crate::services::{current_user, internal_error};

pub async fn delete_mark(
    service: &MarkService,
    mark_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let mark = match load_managed_mark(&storage, mark_id, &user).await {
        Ok(mark) => mark,
        Err(resp) => return Ok(resp),
    };

    match storage.delete_mark(mark.id).await {
        Ok(_) => {
            info!("Mark {} deleted by user {}", mark.id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Mark deleted")))
        }
        Err(e) => Ok(internal_error("Failed to delete mark", e)),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;

    use crate::models::marks::{batch::MarkDraft, entities::MarkType, requests::UpdateMarkRequest};
    use crate::services::MarkService;
    use crate::services::test_support::{body_json, request_as};
    use crate::storage::sea_orm_storage::test_support::seeded_lesson;

    #[tokio::test]
    async fn test_single_mark_lifecycle() {
        let seed = seeded_lesson().await;
        let service = MarkService::with_storage(seed.storage.clone());
        let mark = seed
            .storage
            .create_mark(MarkDraft {
                user_id: seed.students[0].id,
                lesson_id: Some(seed.lesson_id),
                course: Some(1),
                journal_id: seed.journal_id,
                grade_id: Some(seed.grade_ids[0]),
                comment: None,
                mark_type: MarkType::LessonGrade,
                teacher_id: seed.teacher.id,
                created_at: 0,
            })
            .await
            .unwrap();

        // 其他学生无权查看
        let resp = service
            .get_mark(mark.id, &request_as(&seed.students[1]))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = service
            .update_mark(
                mark.id,
                UpdateMarkRequest {
                    grade_id: Some(seed.grade_ids[1]),
                    comment: Some("Retake".into()),
                },
                &request_as(&seed.admin),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp);
        assert_eq!(body["data"]["grade_id"], seed.grade_ids[1]);
        assert_eq!(body["data"]["comment"], "Retake");
        assert_eq!(body["data"]["teacher_id"], seed.admin.id);

        // 相同内容不会写入
        let resp = service
            .update_mark(
                mark.id,
                UpdateMarkRequest {
                    grade_id: Some(seed.grade_ids[1]),
                    comment: None,
                },
                &request_as(&seed.teacher),
            )
            .await
            .unwrap();
        assert_eq!(body_json(resp)["data"]["teacher_id"], seed.admin.id);

        let resp = service
            .delete_mark(mark.id, &request_as(&seed.teacher))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = service
            .get_mark(mark.id, &request_as(&seed.teacher))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_flag_cannot_take_grade() {
        let seed = seeded_lesson().await;
        let service = MarkService::with_storage(seed.storage.clone());
        let mark = seed
            .storage
            .create_mark(MarkDraft {
                user_id: seed.students[0].id,
                lesson_id: Some(seed.lesson_id),
                course: Some(1),
                journal_id: seed.journal_id,
                grade_id: None,
                comment: None,
                mark_type: MarkType::Absent,
                teacher_id: seed.teacher.id,
                created_at: 0,
            })
            .await
            .unwrap();

        let resp = service
            .update_mark(
                mark.id,
                UpdateMarkRequest {
                    grade_id: Some(seed.grade_ids[0]),
                    comment: None,
                },
                &request_as(&seed.teacher),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
