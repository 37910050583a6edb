use axum::extract::Request;
use axum::http::{header, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;

/// Rewrites the router's bare 405 into the error envelope, keeping the
/// `Allow` header it computed. `OPTIONS` without a CORS preflight header
/// gets an empty 204 instead.
pub async fn method_not_allowed_envelope(req: Request, next: Next) -> Response {
    let is_options = req.method() == Method::OPTIONS;
    let response = next.run(req).await;
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }
    if is_options {
        return StatusCode::NO_CONTENT.into_response();
    }

    let allowed = response
        .headers()
        .get(header::ALLOW)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|method| !method.is_empty())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();

    AppError::MethodNotAllowed(allowed).into_response()
}
