//! Response envelope and pagination meta shared by every route.
//!
//! Every successful response body is `{ "success": true, "data": … }`;
//! every error body is `{ "success": false, "error": { code, message } }`
//! (see [`crate::app::errors`]). List endpoints additionally carry
//! `"meta": { "pagination": … }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use bbqjudge_core::PageInfo;

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct PaginatedEnvelope<T: Serialize> {
    pub success: bool,
    pub data: Vec<T>,
    pub meta: PageMeta,
}

#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub pagination: PageInfo,
}

/// Wrap `data` in the success envelope with `200 OK`.
pub fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(Envelope { success: true, data })).into_response()
}

/// Wrap `data` in the success envelope with a given status (e.g. `201`).
pub fn with_status<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(Envelope { success: true, data })).into_response()
}

/// Wrap a page of `items` plus its [`PageInfo`] in the paginated envelope.
pub fn paginated<T: Serialize>(items: Vec<T>, page_info: PageInfo) -> Response {
    (
        StatusCode::OK,
        Json(PaginatedEnvelope {
            success: true,
            data: items,
            meta: PageMeta { pagination: page_info },
        }),
    )
        .into_response()
}

/// `204 No Content`, used for bare deletes.
pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}
