use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::students::requests::{StudentLessonsParams, StudentMarksParams};
use crate::services::StudentService;
use crate::utils::{SafeIDI64, SafeJournalIdI64};

static STUDENT_SERVICE: Lazy<StudentService> = Lazy::new(StudentService::new_lazy);

pub async fn list_student_journals(
    req: HttpRequest,
    student_id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.list_journals(student_id.0, &req).await
}

pub async fn list_student_marks(
    req: HttpRequest,
    student_id: SafeIDI64,
    query: web::Query<StudentMarksParams>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE
        .list_marks(student_id.0, query.into_inner(), &req)
        .await
}

pub async fn list_student_lessons(
    req: HttpRequest,
    student_id: SafeIDI64,
    journal_id: SafeJournalIdI64,
    query: web::Query<StudentLessonsParams>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE
        .list_lessons(student_id.0, journal_id.0, query.into_inner(), &req)
        .await
}

pub async fn list_student_years(
    req: HttpRequest,
    student_id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.list_years(student_id.0, &req).await
}

pub fn configure_students_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/students")
            .wrap(middlewares::RequireJWT)
            .route("/{id}/journals", web::get().to(list_student_journals))
            .route(
                "/{id}/journals/{journal_id}/lessons",
                web::get().to(list_student_lessons),
            )
            .route("/{id}/marks", web::get().to(list_student_marks))
            .route("/{id}/years", web::get().to(list_student_years)),
    );
}
