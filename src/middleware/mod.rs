pub mod method_not_allowed;

use std::time::Duration;

use axum::extract::Request;
use axum::http::{header, HeaderName, Method};
use tower_http::cors::{Any, CorsLayer};
use tracing::Span;
use uuid::Uuid;

use crate::extract::{COMPANY_ID_HEADER, USER_ID_HEADER};

/// Any origin; the methods and headers the admin UI sends.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(COMPANY_ID_HEADER),
        ])
        .max_age(Duration::from_secs(86400))
}

/// Root span for one request, tagged with a fresh request id. The caller
/// ids are recorded once `RequestContext` has parsed them.
pub fn request_span(req: &Request) -> Span {
    tracing::info_span!(
        "request",
        request_id = %Uuid::now_v7(),
        method = %req.method(),
        uri = %req.uri(),
        user_id = tracing::field::Empty,
        company_id = tracing::field::Empty,
    )
}
