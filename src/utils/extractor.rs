//! 路径参数提取器
//!
//! 非法的 ID 直接以 400 信封返回，不进入业务层。

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError};
use std::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

fn parse_positive_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}

macro_rules! define_safe_id_extractor {
    ($name:ident, $param:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(pub i64);

        impl FromRequest for $name {
            type Error = actix_web::Error;
            type Future = Ready<Result<Self, Self::Error>>;

            fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
                let raw = req.match_info().get($param).unwrap_or_default();
                match parse_positive_id(raw) {
                    Some(id) => ready(Ok($name(id))),
                    None => {
                        let response = HttpResponse::BadRequest().json(ApiResponse::error_empty(
                            ErrorCode::BadRequest,
                            format!("Invalid path parameter '{}': {}", $param, raw),
                        ));
                        ready(Err(InternalError::from_response(
                            format!("invalid {}", $param),
                            response,
                        )
                        .into()))
                    }
                }
            }
        }
    };
}

define_safe_id_extractor!(SafeIDI64, "id");
define_safe_id_extractor!(SafeStudentIdI64, "student_id");
define_safe_id_extractor!(SafeJournalIdI64, "journal_id");

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_parse_positive_id() {
        assert_eq!(parse_positive_id("42"), Some(42));
        assert_eq!(parse_positive_id("0"), None);
        assert_eq!(parse_positive_id("-3"), None);
        assert_eq!(parse_positive_id("abc"), None);
    }

    #[actix_web::test]
    async fn test_extract_from_match_info() {
        let req = TestRequest::default().param("id", "17").to_http_request();
        let id = SafeIDI64::extract(&req).await.expect("valid id");
        assert_eq!(id, SafeIDI64(17));

        let req = TestRequest::default()
            .param("student_id", "x1")
            .to_http_request();
        assert!(SafeStudentIdI64::extract(&req).await.is_err());

        let req = TestRequest::default()
            .param("id", "3")
            .param("journal_id", "8")
            .to_http_request();
        assert_eq!(SafeJournalIdI64::extract(&req).await.ok(), Some(SafeJournalIdI64(8)));
    }
}
