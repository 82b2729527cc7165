//! Maps [`DomainError`] (and token validation failures) onto the HTTP error
//! envelope from §7: `{ success: false, error: { code, message } }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use bbqjudge_auth::TokenValidationError;
use bbqjudge_core::DomainError;

/// Nginx's "Client Closed Request" code; not in [`StatusCode`]'s named
/// constants but the closest HTTP-shaped signal for a canceled request.
const CLIENT_CLOSED_REQUEST: u16 = 499;

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    success: bool,
    error: ErrorBody,
}

/// An error ready to be turned directly into an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into() }
    }

    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", "forbidden")
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "INVALID_TOKEN", message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    pub fn invalid_credentials() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", "invalid username or password")
    }

    pub fn invalid_qr_token() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "INVALID_QR_TOKEN", "invalid QR token")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorEnvelope { success: false, error: ErrorBody { code: self.code, message: self.message } }),
        )
            .into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            DomainError::InvariantViolation(msg) => {
                ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg)
            }
            DomainError::InvalidId(msg) => ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            DomainError::NotFound => ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", "not found"),
            DomainError::Conflict(msg) => ApiError::new(StatusCode::CONFLICT, "CONFLICT", msg),
            DomainError::InvalidStatusTransition(msg) => {
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "INVALID_STATUS_TRANSITION", msg)
            }
            DomainError::Unauthorized => {
                ApiError::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "unauthorized")
            }
            DomainError::Forbidden(msg) => ApiError::new(StatusCode::FORBIDDEN, "FORBIDDEN", msg),
            DomainError::Canceled => {
                let status = StatusCode::from_u16(CLIENT_CLOSED_REQUEST).expect("499 is a valid status code");
                ApiError::new(status, "CANCELED", "request canceled")
            }
            DomainError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "internal error")
            }
        }
    }
}

impl From<TokenValidationError> for ApiError {
    fn from(err: TokenValidationError) -> Self {
        match err {
            TokenValidationError::MissingToken => ApiError::unauthorized("missing token"),
            TokenValidationError::InvalidToken(msg) => ApiError::invalid_token(msg),
            TokenValidationError::Expired | TokenValidationError::NotYetValid | TokenValidationError::InvalidTimeWindow => {
                ApiError::invalid_token(err.to_string())
            }
        }
    }
}
