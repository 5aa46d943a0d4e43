use axum::http::{HeaderMap, HeaderValue};
use axum::response::IntoResponse;
use axum::Json;
use reqwest::StatusCode;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::external::price_lookup::ProviderError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Rate limited by external provider")]
    RateLimited,
    #[error("External error: {0}")]
    External(String),
}

fn error_body(message: &str) -> Json<serde_json::Value> {
    Json(json!({ "error": message }))
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, error_body(&msg)).into_response(),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, error_body(&msg)).into_response(),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, error_body(&msg)).into_response(),
            AppError::RateLimited => {
                let mut headers = HeaderMap::new();
                headers.insert("Retry-After", HeaderValue::from_static("60"));
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    headers,
                    error_body("API rate limit exceeded. Please wait and try again."),
                )
                    .into_response()
            },
            AppError::External(msg) => (StatusCode::BAD_GATEWAY, error_body(&msg)).into_response(),
            AppError::Store(e) => {
                error!("Store failure: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, error_body("Internal server error")).into_response()
            },
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(value: ProviderError) -> Self {
        match value {
            ProviderError::RateLimited => AppError::RateLimited,
            ProviderError::NotFound(what) => AppError::NotFound(format!("Not found: {}", what)),
            ProviderError::Rejected(msg) => AppError::Validation(msg),
            other => AppError::External(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::NotFound("Portfolio not found".into()), StatusCode::NOT_FOUND),
            (AppError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::Conflict("taken".into()), StatusCode::CONFLICT),
            (AppError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (AppError::External("down".into()), StatusCode::BAD_GATEWAY),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = AppError::RateLimited.into_response();
        assert_eq!(response.headers().get("Retry-After").unwrap(), "60");
    }

    #[test]
    fn test_provider_error_mapping() {
        assert!(matches!(AppError::from(ProviderError::RateLimited), AppError::RateLimited));
        assert!(matches!(AppError::from(ProviderError::Rejected("x".into())), AppError::Validation(_)));
        assert!(matches!(AppError::from(ProviderError::Status(500)), AppError::External(_)));
    }
}
