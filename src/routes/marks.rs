use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::marks::requests::{CreateMarkRequest, UpdateMarkRequest};
use crate::models::users::entities::UserRole;
use crate::services::MarkService;
use crate::utils::SafeIDI64;

static MARK_SERVICE: Lazy<MarkService> = Lazy::new(MarkService::new_lazy);

pub async fn create_mark(
    req: HttpRequest,
    mark_data: web::Json<CreateMarkRequest>,
) -> ActixResult<HttpResponse> {
    MARK_SERVICE.create_mark(mark_data.into_inner(), &req).await
}

pub async fn get_mark(req: HttpRequest, mark_id: SafeIDI64) -> ActixResult<HttpResponse> {
    MARK_SERVICE.get_mark(mark_id.0, &req).await
}

pub async fn update_mark(
    req: HttpRequest,
    mark_id: SafeIDI64,
    update_data: web::Json<UpdateMarkRequest>,
) -> ActixResult<HttpResponse> {
    MARK_SERVICE
        .update_mark(mark_id.0, update_data.into_inner(), &req)
        .await
}

pub async fn delete_mark(req: HttpRequest, mark_id: SafeIDI64) -> ActixResult<HttpResponse> {
    MARK_SERVICE.delete_mark(mark_id.0, &req).await
}

// 配置路由，学生不能修改评分
pub fn configure_marks_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/marks")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
                    .route("", web::post().to(create_mark))
                    .route("/{id}", web::get().to(get_mark))
                    .route("/{id}", web::put().to(update_mark))
                    .route("/{id}", web::delete().to(delete_mark)),
            ),
    );
}
