pub mod assets;
pub mod audit_logs;
pub mod companies;
pub mod company_access;
pub mod service;
pub mod users;

use axum::routing::{delete, get};
use axum::Router;

use crate::error::AppError;
use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Service
        .route("/", get(service::info))
        .route("/health", get(service::health))
        // Companies
        .route("/companies", get(companies::list).post(companies::create))
        .route(
            "/companies/{id}",
            get(companies::get)
                .patch(companies::update)
                .delete(companies::delete),
        )
        // Company access
        .route(
            "/companies/{id}/users",
            get(company_access::list).post(company_access::add),
        )
        .route(
            "/companies/{id}/users/{user_id}",
            delete(company_access::remove),
        )
        // Users
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/{id}",
            get(users::get).patch(users::update).delete(users::delete),
        )
        .route("/users/{id}/companies", get(users::companies))
        .route("/users/{id}/audit-logs", get(users::audit_logs))
        // Assets
        .route("/assets", get(assets::list).post(assets::create))
        .route(
            "/assets/{id}",
            get(assets::get).patch(assets::update).delete(assets::delete),
        )
        // Audit logs
        .route("/audit-logs", get(audit_logs::list))
        .fallback(not_found)
}

async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
