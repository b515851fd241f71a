use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::YearService;
use crate::models::ApiResponse;
use crate::models::years::{
    requests::YearListParams,
    responses::{YearListResponse, YearSummary},
};
use crate::services::{current_user, internal_error};

pub async fn list_years(
    service: &YearService,
    params: YearListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let years = match storage.list_years().await {
        Ok(years) => years,
        Err(e) => return Ok(internal_error("Failed to retrieve year list", e)),
    };

    // 非管理员请求统计时静默忽略
    let counts = if params.stats && user.is_admin() {
        match storage.count_journals_by_year().await {
            Ok(counts) => Some(counts),
            Err(e) => return Ok(internal_error("Failed to count journals per year", e)),
        }
    } else {
        None
    };

    let items = years
        .into_iter()
        .map(|year| YearSummary {
            journal_count: counts
                .as_ref()
                .map(|c| c.get(&year.id).copied().unwrap_or(0)),
            year,
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        YearListResponse { items },
        "Year list retrieved successfully",
    )))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;

    use super::*;
    use crate::services::test_support::{anonymous_request, body_json, request_as};
    use crate::storage::sea_orm_storage::test_support::seeded_lesson;

    #[tokio::test]
    async fn test_stats_only_for_admins() {
        let seed = seeded_lesson().await;
        let year = seed.storage.create_year("2025/2026", 2).await.unwrap();
        let subject = seed.storage.create_subject("Geometry").await.unwrap();
        seed.storage
            .create_journal("8B Geometry", subject.id, seed.teacher.id)
            .await
            .unwrap();
        let service = YearService::with_storage(seed.storage.clone());

        let resp = service
            .list_years(YearListParams { stats: true }, &request_as(&seed.admin))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp);
        let item = &body["data"]["items"][0];
        assert_eq!(item["id"], year.id);
        assert_eq!(item["current"], true);
        assert_eq!(item["journal_count"], 1);

        let resp = service
            .list_years(YearListParams { stats: true }, &request_as(&seed.students[0]))
            .await
            .unwrap();
        let body = body_json(resp);
        assert!(body["data"]["items"][0].get("journal_count").is_none());

        let resp = service
            .list_years(YearListParams::default(), &anonymous_request())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
