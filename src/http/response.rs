use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Success envelope: `{statusCode, data, message, success}`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    #[serde(skip)]
    status: StatusCode,
    status_code: u16,
    data: T,
    message: String,
    success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, data, message)
    }

    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::CREATED, data, message)
    }

    fn with_status(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            status,
            status_code: status.as_u16(),
            data,
            message: message.into(),
            success: status.as_u16() < 400,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Serializes as `[]`.
#[derive(Debug, Default, Serialize)]
pub struct EmptyList([(); 0]);

/// Serializes as `{}`.
#[derive(Debug, Default, Serialize)]
pub struct EmptyObject {}

/// A listing that is either the found payload or an empty array.
#[derive(Serialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Found(T),
    Empty(EmptyList),
}
