use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{StudentService, load_visible_student};
use crate::models::students::{
    requests::StudentMarksParams,
    responses::{JournalWithMarks, StudentMarksOverview},
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, internal_error};

pub async fn list_marks(
    service: &StudentService,
    student_id: i64,
    params: StudentMarksParams,
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

    if params.year < 1 {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            "year must be a valid year id",
        )));
    }
    let year = match storage.get_year_by_id(params.year).await {
        Ok(Some(year)) => year,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::YearNotFound,
                "Year not found",
            )));
        }
        Err(e) => return Ok(internal_error("Failed to load year", e)),
    };

    let journals = match storage
        .list_journals_for_student(student.id, Some(year.id))
        .await
    {
        Ok(journals) => journals,
        Err(e) => return Ok(internal_error("Failed to retrieve student journals", e)),
    };
    let journal_ids: Vec<i64> = journals.iter().map(|j| j.id).collect();
    let marks = match storage.list_marks_for_student(student.id, &journal_ids).await {
        Ok(marks) => marks,
        Err(e) => return Ok(internal_error("Failed to retrieve student marks", e)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        StudentMarksOverview {
            student_id: student.id,
            year_id: year.id,
            journals: JournalWithMarks::group(journals, marks),
        },
        "Student marks retrieved successfully",
    )))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;

    use super::*;
    use crate::models::marks::{batch::MarkDraft, entities::MarkType};
    use crate::services::test_support::{body_json, request_as};
    use crate::storage::sea_orm_storage::test_support::seeded_lesson;

    #[tokio::test]
    async fn test_marks_grouped_by_course_within_year() {
        let seed = seeded_lesson().await;
        let year = seed.storage.create_year("2025/2026", 2).await.unwrap();
        let subject = seed.storage.create_subject("Biology").await.unwrap();
        let journal = seed
            .storage
            .create_journal("8B Biology", subject.id, seed.teacher.id)
            .await
            .unwrap();
        let student = &seed.students[0];
        seed.storage
            .add_students_to_journal(journal.id, &[student.id])
            .await
            .unwrap();
        for (course, mark_type) in [
            (Some(2), MarkType::CourseGrade),
            (Some(1), MarkType::CourseGrade),
            (None, MarkType::SubjectGrade),
        ] {
            seed.storage
                .create_mark(MarkDraft {
                    user_id: student.id,
                    lesson_id: None,
                    course,
                    journal_id: journal.id,
                    grade_id: Some(seed.grade_ids[0]),
                    comment: None,
                    mark_type,
                    teacher_id: seed.teacher.id,
                    created_at: 0,
                })
                .await
                .unwrap();
        }
        let service = StudentService::with_storage(seed.storage.clone());

        let resp = service
            .list_marks(student.id, StudentMarksParams { year: year.id }, &request_as(student))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp);
        // 没有学年的旧日志不出现
        let journals = body["data"]["journals"].as_array().unwrap();
        assert_eq!(journals.len(), 1);
        assert_eq!(journals[0]["id"], journal.id);
        let courses: Vec<serde_json::Value> = journals[0]["courses"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["course"].clone())
            .collect();
        assert_eq!(
            courses,
            vec![serde_json::json!(1), serde_json::json!(2), serde_json::Value::Null]
        );

        let resp = service
            .list_marks(
                student.id,
                StudentMarksParams { year: year.id + 10 },
                &request_as(student),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = service
            .list_marks(student.id, StudentMarksParams { year: 0 }, &request_as(student))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = service
            .list_marks(
                student.id,
                StudentMarksParams { year: year.id },
                &request_as(&seed.students[1]),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
