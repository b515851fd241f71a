pub mod create;
pub mod get;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::grades::requests::{CreateGradeRequest, UpdateGradeRequest};
use crate::storage::Storage;

pub struct GradeService {
    storage: Option<Arc<dyn Storage>>,
}

impl GradeService {
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

    pub async fn list_grades(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::list_grades(self, request).await
    }

    pub async fn get_grade(&self, grade_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_grade(self, grade_id, request).await
    }

    pub async fn create_grade(
        &self,
        grade_data: CreateGradeRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_grade(self, grade_data, request).await
    }

    pub async fn update_grade(
        &self,
        grade_id: i64,
        update_data: UpdateGradeRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_grade(self, grade_id, update_data, request).await
    }
}

pub(crate) fn validate_grade_fields(
    identifier: Option<&str>,
    value: Option<i32>,
) -> Result<(), &'static str> {
    if let Some(identifier) = identifier
        && identifier.trim().is_empty()
    {
        return Err("identifier must not be empty");
    }
    if let Some(value) = value
        && value <= 0
    {
        return Err("value must be positive");
    }
    Ok(())
}
