use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::MarkService;
use crate::models::marks::{
    entities::MarkType,
    requests::JournalMarksParams,
    responses::{StudentMarks, StudentMarksResponse},
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::journals::load_managed_journal;
use crate::services::{current_user, internal_error};

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::ValidationFailed, message))
}

pub async fn get_marks_for_journal(
    service: &MarkService,
    journal_id: i64,
    params: JournalMarksParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    // 先确认权限，再校验查询参数
    let storage = service.get_storage(request)?;
    let journal = match load_managed_journal(&storage, journal_id, &user).await {
        Ok(journal) => journal,
        Err(resp) => return Ok(resp),
    };

    let mark_type = match params.mark_type.parse::<MarkType>() {
        Ok(t) if t.is_grade_bearing() => t,
        _ => {
            return Ok(bad_request(
                "mark_type must be one of lesson_grade, course_grade, subject_grade",
            ));
        }
    };
    if let Some(course) = params.course
        && course < 1
    {
        return Ok(bad_request("course must be at least 1"));
    }

    // 科目总评与学期无关；课堂成绩必须指定学期
    let course = match mark_type {
        MarkType::SubjectGrade => None,
        MarkType::LessonGrade if params.course.is_none() => {
            return Ok(bad_request("course is required for lesson_grade"));
        }
        _ => params.course,
    };

    let students = match storage.list_journal_students(journal.id).await {
        Ok(students) => students,
        Err(e) => return Ok(internal_error("Failed to load journal students", e)),
    };
    let marks = match storage
        .list_marks_for_journal(journal.id, mark_type, course)
        .await
    {
        Ok(marks) => marks,
        Err(e) => return Ok(internal_error("Failed to load journal marks", e)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        StudentMarksResponse {
            students: StudentMarks::group(students, marks),
        },
        "Journal marks retrieved successfully",
    )))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;

    use super::*;
    use crate::models::marks::{batch::MarkDraft, entities::MarkType};
    use crate::models::users::entities::UserRole;
    use crate::services::test_support::{body_json, request_as};
    use crate::storage::sea_orm_storage::test_support::{seed_user, seeded_lesson};

    fn params(mark_type: &str, course: Option<i32>) -> JournalMarksParams {
        JournalMarksParams {
            mark_type: mark_type.into(),
            course,
        }
    }

    #[tokio::test]
    async fn test_foreign_teacher_gets_forbidden_even_with_bad_query() {
        let seed = seeded_lesson().await;
        let other = seed_user(&seed.storage, "teacher02", UserRole::Teacher).await;
        let service = MarkService::with_storage(seed.storage.clone());

        let resp = service
            .get_marks_for_journal(seed.journal_id, params("absent", Some(0)), &request_as(&other))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = service
            .get_marks_for_journal(
                seed.journal_id,
                params("absent", None),
                &request_as(&seed.teacher),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_course_grades_listed_per_student() {
        let seed = seeded_lesson().await;
        seed.storage
            .create_mark(MarkDraft {
                user_id: seed.students[0].id,
                lesson_id: None,
                course: Some(1),
                journal_id: seed.journal_id,
                grade_id: Some(seed.grade_ids[1]),
                comment: None,
                mark_type: MarkType::CourseGrade,
                teacher_id: seed.teacher.id,
                created_at: chrono::Utc::now().timestamp(),
            })
            .await
            .unwrap();
        let service = MarkService::with_storage(seed.storage.clone());

        let resp = service
            .get_marks_for_journal(
                seed.journal_id,
                params("course_grade", None),
                &request_as(&seed.teacher),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp);
        let students = body["data"]["students"].as_array().unwrap();
        let graded = students
            .iter()
            .find(|s| s["student"]["id"] == seed.students[0].id)
            .unwrap();
        assert_eq!(graded["marks"].as_array().unwrap().len(), 1);

        let resp = service
            .get_marks_for_journal(
                seed.journal_id,
                params("lesson_grade", None),
                &request_as(&seed.teacher),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
