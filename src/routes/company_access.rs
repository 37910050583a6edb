use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crate::db;
use crate::error::{is_unique_violation, AppError};
use crate::extract::{ApiJson, RequestContext};
use crate::models::{AccessRole, CompanyAccess};
use crate::response::{ApiResponse, ListMeta};
use crate::state::SharedState;
use crate::validation::{self, Pagination};

const ALREADY_GRANTED: &str = "User already has access to this company";

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub role: Option<String>,
}

pub async fn list(
    State(state): State<SharedState>,
    Path(company_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<ApiResponse<Vec<CompanyAccess>>, AppError> {
    let company_id = validation::parse_uuid(&company_id, "company_id")?;
    let page = Pagination::from_query(params.limit.as_deref(), params.offset.as_deref())?;
    let role = validation::optional_enum_filter::<AccessRole>(params.role.as_deref(), "role")?;
    require_company(&state, company_id).await?;

    let (grants, total) = tokio::try_join!(
        db::company_access::list_by_company(&state.pool, company_id, role, page.limit, page.offset),
        db::company_access::count_by_company(&state.pool, company_id, role),
    )?;

    tracing::debug!(company_id = %company_id, returned = grants.len(), total, "Listed company access");
    Ok(ApiResponse::list(grants, ListMeta::new(total, &page)))
}

pub async fn add(
    ctx: RequestContext,
    State(state): State<SharedState>,
    Path(company_id): Path<String>,
    ApiJson(body): ApiJson,
) -> Result<ApiResponse<CompanyAccess>, AppError> {
    let company_id = validation::parse_uuid(&company_id, "company_id")?;
    let req = validation::validate_add_user_to_company(&body)?;

    require_company(&state, company_id).await?;
    if !db::users::exists(&state.pool, req.user_id).await? {
        return Err(AppError::BadRequest("User does not exist".to_string()));
    }
    if db::company_access::exists(&state.pool, company_id, req.user_id).await? {
        return Err(AppError::BadRequest(ALREADY_GRANTED.to_string()));
    }

    let access = db::company_access::add(&state.pool, company_id, &req, ctx.user_id)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                AppError::BadRequest(ALREADY_GRANTED.to_string())
            } else {
                AppError::Database(err)
            }
        })?;
    Ok(ApiResponse::created(access))
}

pub async fn remove(
    ctx: RequestContext,
    State(state): State<SharedState>,
    Path((company_id, user_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let company_id = validation::parse_uuid(&company_id, "company_id")?;
    let user_id = validation::parse_uuid(&user_id, "user_id")?;
    require_company(&state, company_id).await?;

    db::company_access::remove(&state.pool, company_id, user_id, ctx.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Company access"))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn require_company(state: &SharedState, company_id: Uuid) -> Result<(), AppError> {
    if db::companies::exists(&state.pool, company_id).await? {
        Ok(())
    } else {
        Err(AppError::not_found("Company"))
    }
}
