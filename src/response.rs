//! Uniform `{success, data|error, meta}` envelope for every JSON response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::FieldErrors;
use crate::validation::Pagination;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ListMeta>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 with `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            meta: None,
            status: StatusCode::OK,
        }
    }

    /// 201 with the created entity.
    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(data)
        }
    }

    /// 200 with a page of results and its pagination metadata.
    pub fn list(data: T, meta: ListMeta) -> Self {
        Self {
            meta: Some(meta),
            ..Self::ok(data)
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Pagination metadata. `total` counts every row matching the filters,
/// independent of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ListMeta {
    pub total: i64,
    pub limit: i64,
    pub page: i64,
}

impl ListMeta {
    pub fn new(total: i64, pagination: &Pagination) -> Self {
        Self {
            total,
            limit: pagination.limit,
            page: pagination.page(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<FieldErrors>,
}

impl ErrorResponse {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code,
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: &'static str,
        message: impl Into<String>,
        details: FieldErrors,
    ) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code,
                message: message.into(),
                details: Some(details),
            },
        }
    }
}
