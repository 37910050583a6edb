use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db;
use crate::db::assets::AssetFilter;
use crate::error::AppError;
use crate::extract::{ApiJson, RequestContext};
use crate::models::{Asset, AssetStatus, AssetType};
use crate::response::{ApiResponse, ListMeta};
use crate::state::SharedState;
use crate::validation::{self, Pagination};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub company_id: Option<String>,
    #[serde(rename = "type")]
    pub asset_type: Option<String>,
    pub status: Option<String>,
}

pub async fn list(
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<ApiResponse<Vec<Asset>>, AppError> {
    let page = Pagination::from_query(params.limit.as_deref(), params.offset.as_deref())?;
    let filter = AssetFilter {
        company_id: validation::optional_uuid_filter(params.company_id.as_deref(), "company_id")?,
        asset_type: validation::optional_enum_filter::<AssetType>(
            params.asset_type.as_deref(),
            "type",
        )?,
        status: validation::optional_enum_filter::<AssetStatus>(params.status.as_deref(), "status")?,
    };

    let (assets, total) = tokio::try_join!(
        db::assets::list(&state.pool, filter, page.limit, page.offset),
        db::assets::count(&state.pool, filter),
    )?;

    tracing::debug!(returned = assets.len(), total, "Listed assets");
    Ok(ApiResponse::list(assets, ListMeta::new(total, &page)))
}

pub async fn create(
    ctx: RequestContext,
    State(state): State<SharedState>,
    ApiJson(body): ApiJson,
) -> Result<ApiResponse<Asset>, AppError> {
    let req = validation::validate_create_asset(&body)?;

    if !db::companies::exists(&state.pool, req.company_id).await? {
        return Err(AppError::BadRequest("Company does not exist".to_string()));
    }
    if let Some(user_id) = req.assigned_to {
        require_assignee(&state, user_id).await?;
    }

    let asset = db::assets::create(&state.pool, &req, ctx.user_id).await?;
    Ok(ApiResponse::created(asset))
}

pub async fn get(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Asset>, AppError> {
    let id = validation::parse_uuid(&id, "id")?;
    let asset = db::assets::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Asset"))?;
    Ok(ApiResponse::ok(asset))
}

pub async fn update(
    ctx: RequestContext,
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson,
) -> Result<ApiResponse<Asset>, AppError> {
    let id = validation::parse_uuid(&id, "id")?;
    let req = validation::validate_update_asset(&body)?;

    if let Some(Some(user_id)) = req.assigned_to {
        require_assignee(&state, user_id).await?;
    }

    let asset = db::assets::update(&state.pool, id, &req, ctx.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Asset"))?;
    Ok(ApiResponse::ok(asset))
}

pub async fn delete(
    ctx: RequestContext,
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Value>, AppError> {
    let id = validation::parse_uuid(&id, "id")?;
    db::assets::delete(&state.pool, id, ctx.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Asset"))?;
    Ok(ApiResponse::ok(json!({
        "success": true,
        "message": "Asset deleted successfully",
    })))
}

async fn require_assignee(state: &SharedState, user_id: Uuid) -> Result<(), AppError> {
    if db::users::exists(&state.pool, user_id).await? {
        Ok(())
    } else {
        Err(AppError::BadRequest("Assigned user does not exist".to_string()))
    }
}
