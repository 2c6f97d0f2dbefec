use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::starter_content::StarterContentError;
use crate::store::StoreError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

/// Body of every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub code: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Handler error. Operational errors carry a message safe to show the
/// caller; the rest are logged in full and answered with a generic message.
#[derive(Debug, Clone)]
pub struct AppError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub is_operational: bool,
}

impl AppError {
    fn new(status: StatusCode, code: &str, message: &str, is_operational: bool) -> Self {
        Self {
            status,
            code: code.to_string(),
            message: message.to_string(),
            is_operational,
        }
    }

    pub fn bad_request(code: &str, message: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message, true)
    }

    pub fn unauthorized(message: &str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "AUTH_UNAUTHORIZED", message, true)
    }

    pub fn forbidden(message: &str) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message, true)
    }

    pub fn not_found(message: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message, true)
    }

    pub fn conflict(code: &str, message: &str) -> Self {
        Self::new(StatusCode::CONFLICT, code, message, true)
    }

    pub fn internal(message: &str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message, false)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = if self.is_operational {
            tracing::warn!(status = %self.status, code = %self.code, error = %self.message, "API error");
            ErrorBody::new(self.code, self.message)
        } else {
            tracing::error!(status = %self.status, code = %self.code, error = %self.message, "Internal API error");
            ErrorBody::new(self.code, "Internal server error")
        };

        (self.status, Json(body)).into_response()
    }
}

/// Validation is caller input and safe to echo; everything else is redacted.
impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        match &value {
            StoreError::Validation(msg) => AppError::bad_request("VALIDATION_ERROR", msg),
            StoreError::Conflict { entity, .. } => {
                AppError::conflict("CONFLICT", &format!("{entity} already exists"))
            }
            _ => AppError::internal(&value.to_string()),
        }
    }
}

impl From<StarterContentError> for AppError {
    fn from(value: StarterContentError) -> Self {
        match value {
            StarterContentError::Store(e) => e.into(),
            other => AppError::internal(&other.to_string()),
        }
    }
}

pub fn ok<T: Serialize>(data: T) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            data,
        }),
    )
}

pub fn created<T: Serialize>(data: T) -> impl IntoResponse {
    (
        StatusCode::CREATED,
        Json(ApiResponse {
            success: true,
            data,
        }),
    )
}
