use axum::extract::{Query, State};
use serde::Deserialize;

use crate::db;
use crate::db::audit_logs::CompanyFilter;
use crate::error::AppError;
use crate::models::{AuditAction, AuditLog, EntityType};
use crate::response::{ApiResponse, ListMeta};
use crate::state::SharedState;
use crate::validation::{self, Pagination};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub company_id: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub entity_type: Option<String>,
    pub action: Option<String>,
}

pub async fn list(
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<ApiResponse<Vec<AuditLog>>, AppError> {
    let company_id = params
        .company_id
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest("company_id query parameter is required".to_string()))?;
    let company_id = validation::parse_uuid(company_id, "company_id")?;

    if !db::companies::exists(&state.pool, company_id).await? {
        return Err(AppError::not_found("Company"));
    }

    let page = Pagination::from_query(params.limit.as_deref(), params.offset.as_deref())?;
    let filter = CompanyFilter {
        entity_type: validation::optional_enum_filter::<EntityType>(
            params.entity_type.as_deref(),
            "entity_type",
        )?,
        action: validation::optional_enum_filter::<AuditAction>(params.action.as_deref(), "action")?,
    };

    let (logs, total) = tokio::try_join!(
        db::audit_logs::list_by_company(&state.pool, company_id, filter, page.limit, page.offset),
        db::audit_logs::count_by_company(&state.pool, company_id, filter),
    )?;

    tracing::debug!(company_id = %company_id, returned = logs.len(), total, "Listed audit logs");
    Ok(ApiResponse::list(logs, ListMeta::new(total, &page)))
}
