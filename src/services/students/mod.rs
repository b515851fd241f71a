pub mod journals;
pub mod lessons;
pub mod marks;
pub mod years;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::students::requests::{StudentLessonsParams, StudentMarksParams};
use crate::models::users::entities::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub struct StudentService {
    storage: Option<Arc<dyn Storage>>,
}

impl StudentService {
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

    // 学生所在的全部日志
    pub async fn list_journals(
        &self,
        student_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        journals::list_journals(self, student_id, request).await
    }

    // 某学年内各日志的评分，按学期分组
    pub async fn list_marks(
        &self,
        student_id: i64,
        params: StudentMarksParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        marks::list_marks(self, student_id, params, request).await
    }

    // 某日志某学期的课时及该学生的评分
    pub async fn list_lessons(
        &self,
        student_id: i64,
        journal_id: i64,
        params: StudentLessonsParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        lessons::list_lessons(self, student_id, journal_id, params, request).await
    }

    pub async fn list_years(
        &self,
        student_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        years::list_years(self, student_id, request).await
    }
}

/// 只有学生本人或管理员可以读取；目标不存在返回 404，不是学生返回 400
pub(crate) async fn load_visible_student(
    storage: &Arc<dyn Storage>,
    student_id: i64,
    user: &User,
) -> Result<User, HttpResponse> {
    if !user.is_admin() && user.id != student_id {
        return Err(super::forbidden("Cannot view another student's records"));
    }

    match storage.get_user_by_id(student_id).await {
        Ok(Some(student)) if student.role == UserRole::Student => Ok(student),
        Ok(Some(_)) => Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "User is not a student",
        ))),
        Ok(None) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Err(e) => Err(super::internal_error("Failed to load student", e)),
    }
}
