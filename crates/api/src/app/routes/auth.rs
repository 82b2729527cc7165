//! `/auth/*`: operator login/refresh/me and seat-token issuance from a
//! table's QR code.

use std::sync::Arc;

use axum::extract::Extension;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use bbqjudge_auth::{Principal, Role, SeatClaims, UserClaims, UserRepository, SEAT_TOKEN_TTL, USER_TOKEN_TTL};

use crate::app::cancel::cancelable;
use crate::app::dto::ok;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

/// `/auth/login` and `/auth/seat-token`: no principal required yet.
pub fn public_router() -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/seat-token", post(seat_token))
}

/// `/auth/refresh` and `/auth/me`: require an already-resolved principal.
pub fn protected_router() -> Router {
    Router::new()
        .route("/auth/refresh", post(refresh))
        .route("/auth/me", get(me))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct UserSummary {
    id: String,
    username: String,
    role: Role,
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    user: UserSummary,
}

async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(token): Extension<CancellationToken>,
    Json(body): Json<LoginRequest>,
) -> Result<axum::response::Response, ApiError> {
    let user = cancelable(&token, services.users.find_by_username(&body.username))
        .await?
        .filter(|u| u.verify_password(&body.password))
        .ok_or_else(ApiError::invalid_credentials)?;

    let now = Utc::now();
    let claims = UserClaims::new(user.id, user.role, now);
    let access_token = services
        .user_jwt
        .issue(&claims)
        .map_err(|e| ApiError::new(axum::http::StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", e.to_string()))?;

    Ok(ok(TokenResponse {
        access_token,
        expires_in: USER_TOKEN_TTL.num_seconds(),
        user: UserSummary { id: user.id.to_string(), username: user.username, role: user.role },
    }))
}

async fn refresh(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
) -> Result<axum::response::Response, ApiError> {
    let Principal::User { user_id, role } = principal else {
        return Err(ApiError::forbidden());
    };
    let now = Utc::now();
    let claims = UserClaims::new(user_id, role, now);
    let access_token = services
        .user_jwt
        .issue(&claims)
        .map_err(|e| ApiError::new(axum::http::StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", e.to_string()))?;
    Ok(ok(TokenResponse {
        access_token,
        expires_in: USER_TOKEN_TTL.num_seconds(),
        user: UserSummary { id: user_id.to_string(), username: String::new(), role },
    }))
}

async fn me(Extension(principal): Extension<Principal>) -> Result<axum::response::Response, ApiError> {
    match principal {
        Principal::User { user_id, role } => {
            Ok(ok(serde_json::json!({ "kind": "user", "userId": user_id, "role": role })))
        }
        Principal::Seat { .. } => Err(ApiError::forbidden()),
    }
}

#[derive(Debug, Deserialize)]
struct SeatTokenRequest {
    qr_token: String,
    seat_number: u32,
}

async fn seat_token(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(token): Extension<CancellationToken>,
    Json(body): Json<SeatTokenRequest>,
) -> Result<axum::response::Response, ApiError> {
    let table = cancelable(&token, services.venue.find_table_by_qr_token(&body.qr_token))
        .await?
        .ok_or_else(ApiError::invalid_qr_token)?;

    let seat = cancelable(&token, services.venue.find_seat_by_number(table.id, body.seat_number))
        .await?
        .ok_or_else(ApiError::invalid_qr_token)?;

    let now = Utc::now();
    let claims = SeatClaims::new(table.event_id, table.id, seat.id, seat.seat_number, now);
    let access_token = services
        .seat_jwt
        .issue(&claims)
        .map_err(|e| ApiError::new(axum::http::StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", e.to_string()))?;

    Ok(ok(serde_json::json!({
        "accessToken": access_token,
        "expiresIn": SEAT_TOKEN_TTL.num_seconds(),
        "eventId": table.event_id,
        "tableId": table.id,
        "seatId": seat.id,
        "seatNumber": seat.seat_number,
    })))
}
