use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashMap;

use super::{StudentService, load_visible_student};
use crate::models::marks::entities::Mark;
use crate::models::students::{
    requests::StudentLessonsParams,
    responses::{LessonWithMarks, StudentLessonsResponse},
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::journals::load_journal;
use crate::services::{current_user, internal_error};

pub async fn list_lessons(
    service: &StudentService,
    student_id: i64,
    journal_id: i64,
    params: StudentLessonsParams,
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

    if params.course < 1 {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            "course must be at least 1",
        )));
    }

    let journal = match load_journal(&storage, journal_id).await {
        Ok(journal) => journal,
        Err(resp) => return Ok(resp),
    };
    match storage.is_user_in_journal(student.id, journal.id).await {
        Ok(true) => {}
        Ok(false) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::StudentNotInJournal,
                "User not in journal",
            )));
        }
        Err(e) => return Ok(internal_error("Failed to check journal membership", e)),
    }

    let lessons = match storage.list_lessons(journal.id, Some(params.course)).await {
        Ok(lessons) => lessons,
        Err(e) => return Ok(internal_error("Failed to retrieve lessons", e)),
    };
    let marks = match storage.list_marks_for_student(student.id, &[journal.id]).await {
        Ok(marks) => marks,
        Err(e) => return Ok(internal_error("Failed to retrieve student marks", e)),
    };

    let mut by_lesson: HashMap<i64, Vec<Mark>> = HashMap::new();
    for mark in marks {
        if let Some(lesson_id) = mark.lesson_id {
            by_lesson.entry(lesson_id).or_default().push(mark);
        }
    }
    let lessons = lessons
        .into_iter()
        .map(|lesson| LessonWithMarks {
            marks: by_lesson.remove(&lesson.id).unwrap_or_default(),
            lesson,
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        StudentLessonsResponse {
            student_id: student.id,
            journal_id: journal.id,
            course: params.course,
            lessons,
        },
        "Student lessons retrieved successfully",
    )))
}
