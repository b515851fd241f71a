use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::info;

use crate::models::subjects::requests::CreateSubjectRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;
use crate::utils::validate::validate_name;

use super::internal_error;

pub struct SubjectService {
    storage: Option<Arc<dyn Storage>>,
}

impl SubjectService {
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

    pub async fn list_subjects(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;

        match storage.list_subjects().await {
            Ok(subjects) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                subjects,
                "Subject list retrieved successfully",
            ))),
            Err(e) => Ok(internal_error("Failed to retrieve subject list", e)),
        }
    }

    pub async fn create_subject(
        &self,
        subject_data: CreateSubjectRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        if let Err(msg) = validate_name(&subject_data.name) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
        }

        let storage = self.get_storage(request)?;

        match storage.create_subject(subject_data.name.trim()).await {
            Ok(subject) => {
                info!("Subject {} created", subject.id);
                Ok(HttpResponse::Created().json(ApiResponse::success(subject, "Subject created")))
            }
            Err(e) => Ok(internal_error("Failed to create subject", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;

    use super::*;
    use crate::services::test_support::{anonymous_request, body_json};
    use crate::storage::sea_orm_storage::test_support::memory_storage;

    #[tokio::test]
    async fn test_create_and_list() {
        let service = SubjectService::with_storage(Arc::new(memory_storage().await));
        let req = anonymous_request();

        let resp = service
            .create_subject(CreateSubjectRequest { name: "  ".into() }, &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = service
            .create_subject(CreateSubjectRequest { name: " Physics ".into() }, &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body = body_json(service.list_subjects(&req).await.unwrap());
        assert_eq!(body["data"][0]["name"], "Physics");
    }
}
