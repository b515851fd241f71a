use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::threads::requests::{AddThreadUsersRequest, CreateThreadRequest};
use crate::services::ThreadService;
use crate::utils::SafeIDI64;

static THREAD_SERVICE: Lazy<ThreadService> = Lazy::new(ThreadService::new_lazy);

pub async fn list_threads(req: HttpRequest) -> ActixResult<HttpResponse> {
    THREAD_SERVICE.list_my_threads(&req).await
}

pub async fn create_thread(
    req: HttpRequest,
    thread_data: web::Json<CreateThreadRequest>,
) -> ActixResult<HttpResponse> {
    THREAD_SERVICE
        .create_thread(thread_data.into_inner(), &req)
        .await
}

pub async fn get_thread(req: HttpRequest, thread_id: SafeIDI64) -> ActixResult<HttpResponse> {
    THREAD_SERVICE.get_thread(thread_id.0, &req).await
}

pub async fn delete_thread(req: HttpRequest, thread_id: SafeIDI64) -> ActixResult<HttpResponse> {
    THREAD_SERVICE.delete_thread(thread_id.0, &req).await
}

pub async fn lock_thread(req: HttpRequest, thread_id: SafeIDI64) -> ActixResult<HttpResponse> {
    THREAD_SERVICE.lock_thread(thread_id.0, &req).await
}

pub async fn unlock_thread(req: HttpRequest, thread_id: SafeIDI64) -> ActixResult<HttpResponse> {
    THREAD_SERVICE.unlock_thread(thread_id.0, &req).await
}

pub async fn add_thread_users(
    req: HttpRequest,
    thread_id: SafeIDI64,
    body: web::Json<AddThreadUsersRequest>,
) -> ActixResult<HttpResponse> {
    THREAD_SERVICE
        .add_users(thread_id.0, body.into_inner(), &req)
        .await
}

pub fn configure_threads_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/threads")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_threads))
                    .route(web::post().to(create_thread)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_thread))
                    .route(web::delete().to(delete_thread)),
            )
            .route("/{id}/lock", web::post().to(lock_thread))
            .route("/{id}/unlock", web::post().to(unlock_thread))
            .route("/{id}/users", web::post().to(add_thread_users)),
    );
}
