use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{MarkService, load_managed_mark};
use crate::models::ApiResponse;
use crate::services::current_user;

pub async fn get_mark(
    service: &MarkService,
    mark_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    match load_managed_mark(&storage, mark_id, &user).await {
        Ok(mark) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            mark,
            "Mark retrieved successfully",
        ))),
        Err(resp) => Ok(resp),
    }
}
