pub mod create;
pub mod delete;
pub mod get;
pub mod lock;
pub mod members;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashSet;
use std::sync::Arc;

use crate::models::threads::entities::Thread;
use crate::models::threads::requests::{AddThreadUsersRequest, CreateThreadRequest};
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub struct ThreadService {
    storage: Option<Arc<dyn Storage>>,
}

impl ThreadService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub fn with_storage(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage: Some(storage),
        }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        super::resolve_storage(&self.storage, request)
    }

    pub async fn create_thread(
        &self,
        thread_data: CreateThreadRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_thread(self, thread_data, request).await
    }

    // 当前用户参与的会话
    pub async fn list_my_threads(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::list_my_threads(self, request).await
    }

    pub async fn get_thread(&self, thread_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_thread(self, thread_id, request).await
    }

    pub async fn delete_thread(
        &self,
        thread_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_thread(self, thread_id, request).await
    }

    pub async fn lock_thread(&self, thread_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        lock::set_locked(self, thread_id, true, request).await
    }

    pub async fn unlock_thread(
        &self,
        thread_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        lock::set_locked(self, thread_id, false, request).await
    }

    pub async fn add_users(
        &self,
        thread_id: i64,
        body: AddThreadUsersRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        members::add_users(self, thread_id, body, request).await
    }
}

/// 读取会话，不存在时返回 404 响应
pub(crate) async fn load_thread(
    storage: &Arc<dyn Storage>,
    thread_id: i64,
) -> Result<Thread, HttpResponse> {
    match storage.get_thread_by_id(thread_id).await {
        Ok(Some(thread)) => Ok(thread),
        Ok(None) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ThreadNotFound,
            "Thread not found",
        ))),
        Err(e) => Err(super::internal_error("Failed to load thread", e)),
    }
}

/// 读取会话并确认当前用户是作者或管理员
pub(crate) async fn load_managed_thread(
    storage: &Arc<dyn Storage>,
    thread_id: i64,
    user: &User,
) -> Result<Thread, HttpResponse> {
    let thread = load_thread(storage, thread_id).await?;
    if !thread.is_managed_by(user) {
        return Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::ThreadPermissionDenied,
            "Only the thread's author or an administrator may do this",
        )));
    }
    Ok(thread)
}

/// 校验用户 ID 全部存在，否则返回列出无效 ID 的 400 响应
pub(crate) async fn ensure_users_exist(
    storage: &Arc<dyn Storage>,
    user_ids: &[i64],
) -> Result<(), HttpResponse> {
    if user_ids.is_empty() {
        return Ok(());
    }

    let users = storage
        .get_users_by_ids(user_ids)
        .await
        .map_err(|e| super::internal_error("Failed to load users", e))?;
    let known: HashSet<i64> = users.iter().map(|u| u.id).collect();

    let mut missing: Vec<i64> = user_ids
        .iter()
        .copied()
        .filter(|id| !known.contains(id))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    missing.sort_unstable();
    missing.dedup();
    Err(HttpResponse::BadRequest().json(ApiResponse::error(
        ErrorCode::ValidationFailed,
        missing,
        "Some users do not exist",
    )))
}
