use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::users::entities::UserRole;
use crate::models::years::requests::{CreateYearRequest, YearListParams};
use crate::services::YearService;

static YEAR_SERVICE: Lazy<YearService> = Lazy::new(YearService::new_lazy);

pub async fn list_years(
    req: HttpRequest,
    query: web::Query<YearListParams>,
) -> ActixResult<HttpResponse> {
    YEAR_SERVICE.list_years(query.into_inner(), &req).await
}

pub async fn create_year(
    req: HttpRequest,
    year_data: web::Json<CreateYearRequest>,
) -> ActixResult<HttpResponse> {
    YEAR_SERVICE.create_year(year_data.into_inner(), &req).await
}

pub fn configure_years_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/years")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_years))
                    .route(
                        web::post()
                            .to(create_year)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            ),
    );
}
