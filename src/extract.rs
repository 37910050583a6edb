use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use serde_json::Value;
use tracing::Span;
use uuid::Uuid;

use crate::error::AppError;
use crate::validation::{invalid_uuid, parse_uuid};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const COMPANY_ID_HEADER: &str = "x-company-id";

/// Caller identity, taken on trust from request headers. Both ids are
/// recorded on the request span; only the user lands in audit rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestContext {
    /// Acting user recorded on audit rows.
    pub user_id: Option<Uuid>,
}

impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header_uuid(parts, USER_ID_HEADER)?;
        let company_id = header_uuid(parts, COMPANY_ID_HEADER)?;

        let span = Span::current();
        if let Some(id) = user_id {
            span.record("user_id", tracing::field::display(id));
        }
        if let Some(id) = company_id {
            span.record("company_id", tracing::field::display(id));
        }

        Ok(RequestContext { user_id })
    }
}

fn header_uuid(parts: &Parts, name: &str) -> Result<Option<Uuid>, AppError> {
    let Some(value) = parts.headers.get(name) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| invalid_uuid(name))?.trim();
    if value.is_empty() {
        return Ok(None);
    }
    Ok(Some(parse_uuid(value, name)?))
}

/// Untyped JSON body. Shape checks happen in `validation`, so any
/// well-formed JSON value is accepted here.
#[derive(Debug)]
pub struct ApiJson(pub Value);

impl<S: Send + Sync> FromRequest<S> for ApiJson {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::BadRequest("Request body too large".to_string())
            } else {
                AppError::BadRequest("Invalid JSON body".to_string())
            }
        })?;

        serde_json::from_slice(&bytes)
            .map(ApiJson)
            .map_err(|_| AppError::BadRequest("Invalid JSON body".to_string()))
    }
}
