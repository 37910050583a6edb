use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db;
use crate::db::users::UserFilter;
use crate::error::{is_unique_violation, AppError};
use crate::extract::{ApiJson, RequestContext};
use crate::models::{AuditLog, CompanyAccess, EntityType, User, UserStatus};
use crate::response::{ApiResponse, ListMeta};
use crate::state::SharedState;
use crate::validation::{self, Pagination};

const DUPLICATE_EMAIL: &str = "A user with this email already exists";

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub status: Option<String>,
    pub company_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

pub async fn list(
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<ApiResponse<Vec<User>>, AppError> {
    let page = Pagination::from_query(params.limit.as_deref(), params.offset.as_deref())?;
    let filter = UserFilter {
        status: validation::optional_enum_filter::<UserStatus>(params.status.as_deref(), "status")?,
        company_id: validation::optional_uuid_filter(params.company_id.as_deref(), "company_id")?,
    };

    let (users, total) = tokio::try_join!(
        db::users::list(&state.pool, filter, page.limit, page.offset),
        db::users::count(&state.pool, filter),
    )?;

    tracing::debug!(returned = users.len(), total, "Listed users");
    Ok(ApiResponse::list(users, ListMeta::new(total, &page)))
}

pub async fn create(
    ctx: RequestContext,
    State(state): State<SharedState>,
    ApiJson(body): ApiJson,
) -> Result<ApiResponse<User>, AppError> {
    let req = validation::validate_create_user(&body)?;

    if db::users::find_by_email(&state.pool, &req.email).await?.is_some() {
        return Err(AppError::BadRequest(DUPLICATE_EMAIL.to_string()));
    }
    if let Some(company_id) = req.primary_company_id {
        require_primary_company(&state, company_id).await?;
    }

    let user = db::users::create(&state.pool, &req, ctx.user_id)
        .await
        .map_err(duplicate_email)?;
    Ok(ApiResponse::created(user))
}

pub async fn get(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<User>, AppError> {
    let id = validation::parse_uuid(&id, "id")?;
    let user = find_user(&state, id).await?;
    Ok(ApiResponse::ok(user))
}

pub async fn update(
    ctx: RequestContext,
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson,
) -> Result<ApiResponse<User>, AppError> {
    let id = validation::parse_uuid(&id, "id")?;
    let req = validation::validate_update_user(&body)?;

    if let Some(email) = req.email.as_deref() {
        let clash = db::users::find_by_email(&state.pool, email).await?;
        if clash.is_some_and(|other| other.id != id) {
            return Err(AppError::BadRequest(DUPLICATE_EMAIL.to_string()));
        }
    }
    if let Some(Some(company_id)) = req.primary_company_id {
        require_primary_company(&state, company_id).await?;
    }

    let user = db::users::update(&state.pool, id, &req, ctx.user_id)
        .await
        .map_err(duplicate_email)?
        .ok_or_else(|| AppError::not_found("User"))?;
    Ok(ApiResponse::ok(user))
}

pub async fn delete(
    ctx: RequestContext,
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Value>, AppError> {
    let id = validation::parse_uuid(&id, "id")?;
    db::users::delete(&state.pool, id, ctx.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    Ok(ApiResponse::ok(json!({
        "success": true,
        "message": "User deleted successfully",
    })))
}

/// Every company the user holds a grant to, newest first.
pub async fn companies(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Vec<CompanyAccess>>, AppError> {
    let id = validation::parse_uuid(&id, "id")?;
    find_user(&state, id).await?;
    let grants = db::company_access::list_by_user(&state.pool, id).await?;
    Ok(ApiResponse::ok(grants))
}

pub async fn audit_logs(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<ApiResponse<Vec<AuditLog>>, AppError> {
    let id = validation::parse_uuid(&id, "id")?;
    let page = Pagination::from_query(params.limit.as_deref(), params.offset.as_deref())?;
    find_user(&state, id).await?;

    let (logs, total) = tokio::try_join!(
        db::audit_logs::list_by_entity(&state.pool, EntityType::User, id, page.limit, page.offset),
        db::audit_logs::count_by_entity(&state.pool, EntityType::User, id),
    )?;
    Ok(ApiResponse::list(logs, ListMeta::new(total, &page)))
}

async fn find_user(state: &SharedState, id: Uuid) -> Result<User, AppError> {
    db::users::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))
}

async fn require_primary_company(state: &SharedState, company_id: Uuid) -> Result<(), AppError> {
    if db::companies::exists(&state.pool, company_id).await? {
        Ok(())
    } else {
        Err(AppError::BadRequest("Primary company does not exist".to_string()))
    }
}

fn duplicate_email(err: sqlx::Error) -> AppError {
    if is_unique_violation(&err) {
        AppError::BadRequest(DUPLICATE_EMAIL.to_string())
    } else {
        AppError::Database(err)
    }
}
