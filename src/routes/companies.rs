use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db;
use crate::db::companies::DeleteOutcome;
use crate::error::{is_unique_violation, AppError};
use crate::extract::{ApiJson, RequestContext};
use crate::models::{Company, CompanyStatus};
use crate::response::{ApiResponse, ListMeta};
use crate::state::SharedState;
use crate::validation::{self, Pagination};

const DUPLICATE_NAME: &str = "A company with this name already exists";

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub status: Option<String>,
}

pub async fn list(
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<ApiResponse<Vec<Company>>, AppError> {
    let page = Pagination::from_query(params.limit.as_deref(), params.offset.as_deref())?;
    let status =
        validation::optional_enum_filter::<CompanyStatus>(params.status.as_deref(), "status")?;

    let (companies, total) = tokio::try_join!(
        db::companies::list(&state.pool, status, page.limit, page.offset),
        db::companies::count(&state.pool, status),
    )?;

    tracing::debug!(returned = companies.len(), total, "Listed companies");
    Ok(ApiResponse::list(companies, ListMeta::new(total, &page)))
}

pub async fn create(
    ctx: RequestContext,
    State(state): State<SharedState>,
    ApiJson(body): ApiJson,
) -> Result<ApiResponse<Company>, AppError> {
    let req = validation::validate_create_company(&body)?;

    if db::companies::find_by_name(&state.pool, &req.name).await?.is_some() {
        return Err(AppError::BadRequest(DUPLICATE_NAME.to_string()));
    }

    let company = db::companies::create(&state.pool, &req, ctx.user_id)
        .await
        .map_err(duplicate_name)?;
    Ok(ApiResponse::created(company))
}

pub async fn get(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Company>, AppError> {
    let id = validation::parse_uuid(&id, "id")?;
    let company = db::companies::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Company"))?;
    Ok(ApiResponse::ok(company))
}

pub async fn update(
    ctx: RequestContext,
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson,
) -> Result<ApiResponse<Company>, AppError> {
    let id = validation::parse_uuid(&id, "id")?;
    let req = validation::validate_update_company(&body)?;

    if let Some(name) = req.name.as_deref() {
        let clash = db::companies::find_by_name(&state.pool, name).await?;
        if clash.is_some_and(|other| other.id != id) {
            return Err(AppError::BadRequest(DUPLICATE_NAME.to_string()));
        }
    }

    let company = db::companies::update(&state.pool, id, &req, ctx.user_id)
        .await
        .map_err(duplicate_name)?
        .ok_or_else(|| AppError::not_found("Company"))?;
    Ok(ApiResponse::ok(company))
}

pub async fn delete(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Value>, AppError> {
    let id = validation::parse_uuid(&id, "id")?;

    match db::companies::delete(&state.pool, id).await? {
        DeleteOutcome::Deleted => Ok(ApiResponse::ok(json!({
            "success": true,
            "message": "Company deleted successfully",
        }))),
        DeleteOutcome::NotFound => Err(AppError::not_found("Company")),
        DeleteOutcome::HasActivity => Err(AppError::BadRequest(
            "Cannot delete company with activity history".to_string(),
        )),
    }
}

fn duplicate_name(err: sqlx::Error) -> AppError {
    if is_unique_violation(&err) {
        AppError::BadRequest(DUPLICATE_NAME.to_string())
    } else {
        AppError::Database(err)
    }
}
