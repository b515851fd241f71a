use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::UserService;
use crate::models::{ApiResponse, ErrorCode, users::requests::CreateUserRequest};
use crate::services::internal_error;
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password, validate_username};

pub async fn create_user(
    service: &UserService,
    mut user_data: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    // 验证用户名
    if let Err(msg) = validate_username(&user_data.username) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserNameInvalid, msg)));
    }

    // 验证邮箱
    if let Err(msg) = validate_email(&user_data.email) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
    }

    // 验证密码强度
    if let Err(msg) = validate_password(&user_data.password) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserPasswordInvalid, msg)));
    }

    let storage = service.get_storage(request)?;

    match storage.get_user_by_username(&user_data.username).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::UserNameAlreadyExists,
                "Username already exists",
            )));
        }
        Ok(None) => {}
        Err(e) => return Ok(internal_error("Failed to check username", e)),
    }
    match storage.get_user_by_email(&user_data.email).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::UserEmailAlreadyExists,
                "Email already exists",
            )));
        }
        Ok(None) => {}
        Err(e) => return Ok(internal_error("Failed to check email", e)),
    }

    user_data.password = match hash_password(&user_data.password) {
        Ok(hash) => hash,
        Err(e) => return Ok(internal_error("Password hashing failed", e)),
    };

    match storage.create_user(user_data).await {
        Ok(user) => {
            info!("User {} ({}) created", user.id, user.username);
            Ok(HttpResponse::Created().json(ApiResponse::success(user, "User created")))
        }
        Err(e) => {
            tracing::error!("User creation failed: {}", e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::UserCreationFailed,
                "User creation failed",
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use std::sync::Arc;

    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::services::test_support::{anonymous_request, body_json};
    use crate::storage::sea_orm_storage::test_support::memory_storage;

    fn request(username: &str, email: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            role: UserRole::Teacher,
            display_name: Some("Ms. Frizzle".into()),
        }
    }

    #[tokio::test]
    async fn test_create_user_validation_and_conflicts() {
        let service = UserService::with_storage(Arc::new(memory_storage().await));
        let req = anonymous_request();

        let resp = service
            .create_user(request("ab", "frizzle@school.example", "Magic5chool"), &req)
            .await
            .unwrap();
        assert_eq!(body_json(resp)["code"], ErrorCode::UserNameInvalid as i32);

        let resp = service
            .create_user(request("frizzle", "frizzle@school.example", "weak"), &req)
            .await
            .unwrap();
        assert_eq!(body_json(resp)["code"], ErrorCode::UserPasswordInvalid as i32);

        let resp = service
            .create_user(request("frizzle", "frizzle@school.example", "Magic5chool"), &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp);
        assert_eq!(body["data"]["role"], "teacher");
        assert!(body["data"].get("password_hash").is_none());

        let resp = service
            .create_user(request("frizzle", "other@school.example", "Magic5chool"), &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }
}
