use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::error::ErrorReport;
use crate::domain::validate::Violation;

/// Wire envelope for failures. Validation failures additionally carry
/// the violation list; everything else is just `{status, message}`.
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violations: Option<Vec<Violation>>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    violations: Option<Vec<Violation>>,
    // Diagnostic detail for logs; never serialized into the body.
    detail: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            status,
            message: message.into(),
            violations: None,
            detail,
        }
    }

    pub fn bad_request(message: impl Into<String>, detail: Option<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, detail)
    }

    pub fn forbidden() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            "You don't have access to this resource.",
            None,
        )
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message, None)
    }

    pub fn validation(violations: Vec<Violation>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "Validation failed".to_string(),
            violations: Some(violations),
            detail: None,
        }
    }

    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Service temporarily unavailable",
            Some(detail.into()),
        )
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Unexpected error occurred",
            Some(detail.into()),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = self
            .detail
            .unwrap_or_else(|| self.message.clone());
        let body = ApiErrorBody {
            status: self.status.as_u16(),
            message: self.message,
            violations: self.violations,
        };
        let mut response = (self.status, Json(body)).into_response();
        // Attach a structured report so shared logging middleware can
        // emit rich diagnostics.
        ErrorReport::from_message("infra::http::api", self.status, detail).attach(&mut response);
        response
    }
}
