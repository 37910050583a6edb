use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{AuditAction, AuditLog, EntityType, NewAuditLog};

/// Append one audit record. Callers pass their open transaction so the
/// record commits together with the mutation it describes.
pub async fn insert<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    entry: &NewAuditLog,
) -> Result<AuditLog, sqlx::Error> {
    let record = sqlx::query_as::<_, AuditLog>(
        "INSERT INTO audit_logs (company_id, user_id, entity_type, entity_id, action, changes)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(entry.company_id)
    .bind(entry.user_id)
    .bind(entry.entity_type.as_str())
    .bind(entry.entity_id)
    .bind(entry.action.as_str())
    .bind(&entry.changes)
    .fetch_one(executor)
    .await?;

    tracing::debug!(
        audit_id = %record.id,
        company_id = %record.company_id,
        entity_type = %entry.entity_type,
        action = %entry.action,
        "Audit record written"
    );

    Ok(record)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompanyFilter {
    pub entity_type: Option<EntityType>,
    pub action: Option<AuditAction>,
}

pub async fn list_by_company(
    pool: &PgPool,
    company_id: Uuid,
    filter: CompanyFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<AuditLog>, sqlx::Error> {
    sqlx::query_as::<_, AuditLog>(
        "SELECT * FROM audit_logs
         WHERE company_id = $1
           AND ($2::text IS NULL OR entity_type = $2)
           AND ($3::text IS NULL OR action = $3)
         ORDER BY created_at DESC, id DESC LIMIT $4 OFFSET $5",
    )
    .bind(company_id)
    .bind(filter.entity_type.map(|t| t.as_str()))
    .bind(filter.action.map(|a| a.as_str()))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_by_company(
    pool: &PgPool,
    company_id: Uuid,
    filter: CompanyFilter,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM audit_logs
         WHERE company_id = $1
           AND ($2::text IS NULL OR entity_type = $2)
           AND ($3::text IS NULL OR action = $3)",
    )
    .bind(company_id)
    .bind(filter.entity_type.map(|t| t.as_str()))
    .bind(filter.action.map(|a| a.as_str()))
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

pub async fn list_by_entity(
    pool: &PgPool,
    entity_type: EntityType,
    entity_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<AuditLog>, sqlx::Error> {
    sqlx::query_as::<_, AuditLog>(
        "SELECT * FROM audit_logs WHERE entity_type = $1 AND entity_id = $2
         ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4",
    )
    .bind(entity_type.as_str())
    .bind(entity_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_by_entity(
    pool: &PgPool,
    entity_type: EntityType,
    entity_id: Uuid,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM audit_logs WHERE entity_type = $1 AND entity_id = $2",
    )
    .bind(entity_type.as_str())
    .bind(entity_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

/// Audit rows for the company other than creations.
pub async fn count_activity<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    company_id: Uuid,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM audit_logs WHERE company_id = $1 AND action <> 'create'",
    )
    .bind(company_id)
    .fetch_one(executor)
    .await?;
    Ok(row.0)
}
