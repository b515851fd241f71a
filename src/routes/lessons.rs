use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::marks::requests::LessonMarksEntry;
use crate::services::{LessonService, MarkService};
use crate::utils::SafeIDI64;

static LESSON_SERVICE: Lazy<LessonService> = Lazy::new(LessonService::new_lazy);
static MARK_SERVICE: Lazy<MarkService> = Lazy::new(MarkService::new_lazy);

pub async fn get_lesson(req: HttpRequest, lesson_id: SafeIDI64) -> ActixResult<HttpResponse> {
    LESSON_SERVICE.get_lesson(lesson_id.0, &req).await
}

pub async fn get_lesson_marks(req: HttpRequest, lesson_id: SafeIDI64) -> ActixResult<HttpResponse> {
    MARK_SERVICE.get_marks_for_lesson(lesson_id.0, &req).await
}

// 批量提交课时评分
pub async fn set_lesson_marks(
    req: HttpRequest,
    lesson_id: SafeIDI64,
    entries: web::Json<Vec<LessonMarksEntry>>,
) -> ActixResult<HttpResponse> {
    MARK_SERVICE
        .set_marks_for_lesson(lesson_id.0, entries.into_inner(), &req)
        .await
}

pub fn configure_lessons_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/lessons")
            .wrap(middlewares::RequireJWT)
            .route("/{id}", web::get().to(get_lesson))
            .service(
                web::resource("/{id}/marks")
                    .route(web::get().to(get_lesson_marks))
                    .route(web::put().to(set_lesson_marks)),
            ),
    );
}
