/*!
 * 基于角色的访问控制中间件
 *
 * 必须放在 RequireJWT 之后，用户角色命中任一允许角色即放行。
 *
 * ```rust,ignore
 * web::scope("/api/v1/grades")
 *     .wrap(RequireJWT)
 *     .route(
 *         "",
 *         web::post()
 *             .to(create_grade)
 *             .wrap(RequireRole::new_any(UserRole::admin_roles())),
 *     )
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::info;

use crate::models::{
    ErrorCode,
    users::entities::{self, UserRole},
};

use super::create_error_response;

#[derive(Clone)]
pub struct RequireRole {
    allowed_roles: Vec<UserRole>,
}

impl RequireRole {
    /// 允许任一给定角色访问
    pub fn new_any(roles: &[&UserRole]) -> Self {
        Self {
            allowed_roles: roles.iter().map(|r| (*r).clone()).collect(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            allowed_roles: self.allowed_roles.clone(),
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    allowed_roles: Vec<UserRole>,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let allowed_roles = self.allowed_roles.clone();

        Box::pin(async move {
            // RequireJWT 已将用户放入请求扩展
            let user = req.extensions().get::<entities::User>().cloned();

            match user {
                Some(user) => {
                    if allowed_roles.contains(&user.role) {
                        let res = srv.call(req).await?.map_into_left_body();
                        Ok(res)
                    } else {
                        info!(
                            "Access denied for user {} (role: {}). Allowed roles: {:?}",
                            user.id, user.role, allowed_roles
                        );
                        Ok(req.into_response(
                            create_error_response(
                                StatusCode::FORBIDDEN,
                                ErrorCode::Forbidden,
                                "Access denied.",
                            )
                            .map_into_right_body(),
                        ))
                    }
                }
                None => {
                    info!(
                        "Role check failed: No user claims found in request. Make sure RequireJWT middleware is applied first."
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            "Authentication required",
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, dev::Service as _, test, web};

    fn user_with_role(role: UserRole) -> entities::User {
        let epoch = chrono::DateTime::<chrono::Utc>::from_timestamp(0, 0).unwrap();
        entities::User {
            id: 3,
            username: "someone".into(),
            email: "someone@school.example".into(),
            password_hash: String::new(),
            role,
            status: entities::UserStatus::Active,
            display_name: None,
            last_login: None,
            created_at: epoch,
            updated_at: epoch,
        }
    }

    async fn call_as(role: Option<UserRole>) -> StatusCode {
        let app = test::init_service(
            App::new().service(
                web::scope("/admin")
                    .wrap(RequireRole::new_any(UserRole::admin_roles()))
                    .wrap_fn(move |req, srv| {
                        if let Some(role) = role.clone() {
                            req.extensions_mut().insert(user_with_role(role));
                        }
                        srv.call(req)
                    })
                    .route("", web::get().to(|| async { HttpResponse::Ok().finish() })),
            ),
        )
        .await;
        test::call_service(&app, test::TestRequest::get().uri("/admin").to_request())
            .await
            .status()
    }

    #[actix_web::test]
    async fn test_role_gate() {
        assert_eq!(call_as(Some(UserRole::Admin)).await, StatusCode::OK);
        assert_eq!(call_as(Some(UserRole::Teacher)).await, StatusCode::FORBIDDEN);
        assert_eq!(call_as(None).await, StatusCode::UNAUTHORIZED);
    }
}
