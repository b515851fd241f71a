use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::MarkService;
use crate::models::marks::{batch::MarkDraft, entities::MarkType, requests::CreateMarkRequest};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::journals::load_managed_journal;
use crate::services::lessons::load_lesson;
use crate::services::{current_user, internal_error};

fn invalid(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(code, message))
}

pub async fn create_mark(
    service: &MarkService,
    mark_data: CreateMarkRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let mark_type = match mark_data.mark_type.parse::<MarkType>() {
        Ok(t) => t,
        Err(msg) => return Ok(invalid(ErrorCode::ValidationFailed, msg)),
    };

    let storage = service.get_storage(request)?;

    // 确定评分所属的日志、课时和学期
    let (journal_id, lesson_id, course) = if mark_type.is_lesson_bound() {
        let Some(lesson_id) = mark_data.lesson_id else {
            return Ok(invalid(
                ErrorCode::ValidationFailed,
                format!("lesson_id is required for {mark_type}"),
            ));
        };
        let lesson = match load_lesson(&storage, lesson_id).await {
            Ok(lesson) => lesson,
            Err(resp) => return Ok(resp),
        };
        (lesson.journal_id, Some(lesson.id), Some(lesson.course))
    } else {
        let Some(journal_id) = mark_data.journal_id else {
            return Ok(invalid(
                ErrorCode::ValidationFailed,
                format!("journal_id is required for {mark_type}"),
            ));
        };
        if mark_type == MarkType::CourseGrade {
            match mark_data.course {
                Some(course) if course >= 1 => (journal_id, None, Some(course)),
                _ => {
                    return Ok(invalid(
                        ErrorCode::ValidationFailed,
                        "course must be at least 1 for course_grade",
                    ));
                }
            }
        } else {
            (journal_id, None, None)
        }
    };

    let journal = match load_managed_journal(&storage, journal_id, &user).await {
        Ok(journal) => journal,
        Err(resp) => return Ok(resp),
    };

    let grade_id = if mark_type.is_grade_bearing() {
        let Some(grade_id) = mark_data.grade_id.filter(|g| *g != 0) else {
            return Ok(invalid(ErrorCode::ValidationFailed, "grade_id must be provided"));
        };
        match storage.get_grade_by_id(grade_id).await {
            Ok(Some(_)) => Some(grade_id),
            Ok(None) => {
                return Ok(invalid(
                    ErrorCode::GradeNotFound,
                    format!("invalid grade ID: {grade_id}"),
                ));
            }
            Err(e) => return Ok(internal_error("Failed to load grade", e)),
        }
    } else {
        None
    };

    let comment = mark_data
        .comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    if mark_type.is_notice() && comment.is_none() {
        return Ok(invalid(
            ErrorCode::ValidationFailed,
            "comment must be provided and not empty",
        ));
    }

    match storage.get_user_by_id(mark_data.user_id).await {
        Ok(Some(target)) if target.role == UserRole::Student => {}
        Ok(Some(_)) => return Ok(invalid(ErrorCode::BadRequest, "user is not a student")),
        Ok(None) => return Ok(invalid(ErrorCode::UserNotFound, "user not found")),
        Err(e) => return Ok(internal_error("Failed to load user", e)),
    }
    match storage.is_user_in_journal(mark_data.user_id, journal.id).await {
        Ok(true) => {}
        Ok(false) => {
            return Ok(invalid(
                ErrorCode::StudentNotInJournal,
                format!("user not in journal: {}", mark_data.user_id),
            ));
        }
        Err(e) => return Ok(internal_error("Failed to check journal membership", e)),
    }

    let draft = MarkDraft {
        user_id: mark_data.user_id,
        lesson_id,
        course,
        journal_id: journal.id,
        grade_id,
        comment,
        mark_type,
        teacher_id: user.id,
        created_at: chrono::Utc::now().timestamp(),
    };

    match storage.create_mark(draft).await {
        Ok(mark) => {
            info!(
                "Mark {} ({}) created for user {} by {}",
                mark.id, mark.mark_type, mark.user_id, user.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(mark, "Mark created")))
        }
        Err(e) => Ok(internal_error("Failed to create mark", e)),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;

    use super::*;
    use crate::services::test_support::{body_json, request_as};
    use crate::storage::sea_orm_storage::test_support::seeded_lesson;

    fn request(user_id: i64, mark_type: &str) -> CreateMarkRequest {
        CreateMarkRequest {
            user_id,
            mark_type: mark_type.into(),
            lesson_id: None,
            journal_id: None,
            course: None,
            grade_id: None,
            comment: None,
        }
    }

    #[tokio::test]
    async fn test_lesson_grade_inherits_lesson() {
        let seed = seeded_lesson().await;
        let service = MarkService::with_storage(seed.storage.clone());
        let before = seed
            .storage
            .get_journal_by_id(seed.journal_id)
            .await
            .unwrap()
            .unwrap();

        let mut req = request(seed.students[0].id, "common_grade");
        req.lesson_id = Some(seed.lesson_id);
        req.grade_id = Some(seed.grade_ids[1]);

        let resp = service
            .create_mark(req, &request_as(&seed.teacher))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body = body_json(resp);
        assert_eq!(body["data"]["type"], "lesson_grade");
        assert_eq!(body["data"]["journal_id"], seed.journal_id);
        assert_eq!(body["data"]["course"], 1);

        let after = seed
            .storage
            .get_journal_by_id(seed.journal_id)
            .await
            .unwrap()
            .unwrap();
        assert!(after.last_updated >= before.last_updated);
    }

    #[tokio::test]
    async fn test_course_grade_requires_course() {
        let seed = seeded_lesson().await;
        let service = MarkService::with_storage(seed.storage.clone());

        let mut req = request(seed.students[0].id, "course_grade");
        req.journal_id = Some(seed.journal_id);
        req.grade_id = Some(seed.grade_ids[0]);
        let resp = service
            .create_mark(req, &request_as(&seed.teacher))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let mut req = request(seed.students[0].id, "course_grade");
        req.journal_id = Some(seed.journal_id);
        req.grade_id = Some(seed.grade_ids[0]);
        req.course = Some(2);
        let resp = service
            .create_mark(req, &request_as(&seed.teacher))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_target_must_be_enrolled_student() {
        let seed = seeded_lesson().await;
        let service = MarkService::with_storage(seed.storage.clone());

        let mut req = request(seed.outsider.id, "absent");
        req.lesson_id = Some(seed.lesson_id);
        let resp = service
            .create_mark(req, &request_as(&seed.teacher))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(resp)["code"],
            ErrorCode::StudentNotInJournal as i32
        );

        let mut req = request(seed.teacher.id, "absent");
        req.lesson_id = Some(seed.lesson_id);
        let resp = service
            .create_mark(req, &request_as(&seed.teacher))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_notice_requires_comment() {
        let seed = seeded_lesson().await;
        let service = MarkService::with_storage(seed.storage.clone());

        let mut req = request(seed.students[0].id, "notice_bad");
        req.lesson_id = Some(seed.lesson_id);
        req.comment = Some("   ".into());
        let resp = service
            .create_mark(req, &request_as(&seed.teacher))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_student_cannot_create() {
        let seed = seeded_lesson().await;
        let service = MarkService::with_storage(seed.storage.clone());

        let mut req = request(seed.students[0].id, "late");
        req.lesson_id = Some(seed.lesson_id);
        let resp = service
            .create_mark(req, &request_as(&seed.students[1]))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
