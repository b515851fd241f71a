use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::YearService;
use crate::models::years::requests::CreateYearRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, forbidden, internal_error};

pub async fn create_year(
    service: &YearService,
    year_data: CreateYearRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    if !user.is_admin() {
        return Ok(forbidden("Only administrators can create years"));
    }

    let errors = year_data.validate();
    if !errors.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error(
            ErrorCode::ValidationFailed,
            errors,
            "Invalid year",
        )));
    }

    let storage = service.get_storage(request)?;

    match storage
        .create_year(&year_data.display_name, year_data.courses)
        .await
    {
        Ok(year) => {
            info!("Year {} created and set current by user {}", year.id, user.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                year,
                "Year created successfully",
            )))
        }
        Err(e) => Ok(internal_error("Failed to create year", e)),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;

    use super::*;
    use crate::services::test_support::{body_json, request_as};
    use crate::storage::sea_orm_storage::test_support::seeded_lesson;

    #[tokio::test]
    async fn test_create_year_validates_and_switches_current() {
        let seed = seeded_lesson().await;
        let service = YearService::with_storage(seed.storage.clone());

        let resp = service
            .create_year(
                CreateYearRequest {
                    display_name: "".into(),
                    courses: 0,
                },
                &request_as(&seed.admin),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        let resp = service
            .create_year(
                CreateYearRequest {
                    display_name: "2025/2026".into(),
                    courses: 2,
                },
                &request_as(&seed.teacher),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        for name in ["2024/2025", "2025/2026"] {
            let resp = service
                .create_year(
                    CreateYearRequest {
                        display_name: name.into(),
                        courses: 2,
                    },
                    &request_as(&seed.admin),
                )
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::CREATED);
        }

        let years = seed.storage.list_years().await.unwrap();
        let current: Vec<&str> = years
            .iter()
            .filter(|y| y.current)
            .map(|y| y.display_name.as_str())
            .collect();
        assert_eq!(current, vec!["2025/2026"]);
    }
}
