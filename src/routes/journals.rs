use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::journals::requests::{
    AddStudentsRequest, CreateJournalRequest, JournalListParams, UpdateJournalRequest,
};
use crate::models::lessons::requests::{CreateLessonRequest, LessonListParams};
use crate::models::marks::requests::JournalMarksParams;
use crate::models::users::entities::UserRole;
use crate::services::{JournalService, LessonService, MarkService};
use crate::utils::{SafeIDI64, SafeStudentIdI64};

// 懒加载的全局服务实例
static JOURNAL_SERVICE: Lazy<JournalService> = Lazy::new(JournalService::new_lazy);
static LESSON_SERVICE: Lazy<LessonService> = Lazy::new(LessonService::new_lazy);
static MARK_SERVICE: Lazy<MarkService> = Lazy::new(MarkService::new_lazy);

// HTTP处理程序
pub async fn list_journals(
    req: HttpRequest,
    query: web::Query<JournalListParams>,
) -> ActixResult<HttpResponse> {
    JOURNAL_SERVICE.list_journals(query.into_inner(), &req).await
}

pub async fn list_teacher_journals(
    req: HttpRequest,
    teacher_id: SafeIDI64,
    query: web::Query<JournalListParams>,
) -> ActixResult<HttpResponse> {
    JOURNAL_SERVICE
        .list_journals_for_teacher(teacher_id.0, query.into_inner(), &req)
        .await
}

pub async fn create_journal(
    req: HttpRequest,
    journal_data: web::Json<CreateJournalRequest>,
) -> ActixResult<HttpResponse> {
    JOURNAL_SERVICE
        .create_journal(journal_data.into_inner(), &req)
        .await
}

pub async fn get_journal(req: HttpRequest, journal_id: SafeIDI64) -> ActixResult<HttpResponse> {
    JOURNAL_SERVICE.get_journal(journal_id.0, &req).await
}

pub async fn update_journal(
    req: HttpRequest,
    journal_id: SafeIDI64,
    update_data: web::Json<UpdateJournalRequest>,
) -> ActixResult<HttpResponse> {
    JOURNAL_SERVICE
        .update_journal(journal_id.0, update_data.into_inner(), &req)
        .await
}

pub async fn delete_journal(req: HttpRequest, journal_id: SafeIDI64) -> ActixResult<HttpResponse> {
    JOURNAL_SERVICE.delete_journal(journal_id.0, &req).await
}

pub async fn archive_journal(req: HttpRequest, journal_id: SafeIDI64) -> ActixResult<HttpResponse> {
    JOURNAL_SERVICE.archive_journal(journal_id.0, &req).await
}

pub async fn unarchive_journal(
    req: HttpRequest,
    journal_id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    JOURNAL_SERVICE.unarchive_journal(journal_id.0, &req).await
}

pub async fn list_students(req: HttpRequest, journal_id: SafeIDI64) -> ActixResult<HttpResponse> {
    JOURNAL_SERVICE.list_students(journal_id.0, &req).await
}

pub async fn add_students(
    req: HttpRequest,
    journal_id: SafeIDI64,
    body: web::Json<AddStudentsRequest>,
) -> ActixResult<HttpResponse> {
    JOURNAL_SERVICE
        .add_students(journal_id.0, body.into_inner(), &req)
        .await
}

pub async fn remove_student(
    req: HttpRequest,
    journal_id: SafeIDI64,
    student_id: SafeStudentIdI64,
) -> ActixResult<HttpResponse> {
    JOURNAL_SERVICE
        .remove_student(journal_id.0, student_id.0, &req)
        .await
}

pub async fn list_lessons(
    req: HttpRequest,
    journal_id: SafeIDI64,
    query: web::Query<LessonListParams>,
) -> ActixResult<HttpResponse> {
    LESSON_SERVICE
        .list_lessons(journal_id.0, query.into_inner(), &req)
        .await
}

pub async fn create_lesson(
    req: HttpRequest,
    journal_id: SafeIDI64,
    lesson_data: web::Json<CreateLessonRequest>,
) -> ActixResult<HttpResponse> {
    LESSON_SERVICE
        .create_lesson(journal_id.0, lesson_data.into_inner(), &req)
        .await
}

pub async fn list_journal_marks(
    req: HttpRequest,
    journal_id: SafeIDI64,
    query: web::Query<JournalMarksParams>,
) -> ActixResult<HttpResponse> {
    MARK_SERVICE
        .get_marks_for_journal(journal_id.0, query.into_inner(), &req)
        .await
}

// 配置路由
pub fn configure_journals_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/journals")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(
                        web::get()
                            .to(list_journals)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    )
                    .route(
                        web::post()
                            .to(create_journal)
                            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                    ),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_journal))
                    .route(web::put().to(update_journal))
                    .route(
                        web::delete()
                            .to(delete_journal)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            )
            .route("/{id}/archive", web::post().to(archive_journal))
            .route(
                "/{id}/unarchive",
                web::post()
                    .to(unarchive_journal)
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
            )
            .service(
                web::resource("/{id}/students")
                    .route(web::get().to(list_students))
                    .route(web::post().to(add_students)),
            )
            .route(
                "/{id}/students/{student_id}",
                web::delete().to(remove_student),
            )
            .service(
                web::resource("/{id}/lessons")
                    .route(web::get().to(list_lessons))
                    .route(web::post().to(create_lesson)),
            )
            .route("/{id}/marks", web::get().to(list_journal_marks)),
    );
}

pub fn configure_teachers_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/teachers")
            .wrap(middlewares::RequireJWT)
            .route("/{id}/journals", web::get().to(list_teacher_journals)),
    );
}
