use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{self, Changes};
use crate::db::audit_logs;
use crate::models::{AuditAction, Company, CompanyStatus, EntityType, NewAuditLog};
use crate::validation::{CreateCompany, UpdateCompany};

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Case-insensitive lookup on the trimmed name.
pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE lower(name) = lower($1)")
        .bind(name.trim())
        .fetch_optional(pool)
        .await
}

pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let row: (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM companies WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

pub async fn list(
    pool: &PgPool,
    status: Option<CompanyStatus>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>(
        "SELECT * FROM companies WHERE ($1::text IS NULL OR status = $1)
         ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
    )
    .bind(status.map(|s| s.as_str()))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &PgPool, status: Option<CompanyStatus>) -> Result<i64, sqlx::Error> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM companies WHERE ($1::text IS NULL OR status = $1)")
            .bind(status.map(|s| s.as_str()))
            .fetch_one(pool)
            .await?;
    Ok(row.0)
}

pub async fn create(
    pool: &PgPool,
    req: &CreateCompany,
    actor: Option<Uuid>,
) -> Result<Company, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let company = sqlx::query_as::<_, Company>(
        "INSERT INTO companies (name, status) VALUES ($1, $2) RETURNING *",
    )
    .bind(&req.name)
    .bind(req.status.as_str())
    .fetch_one(&mut *tx)
    .await?;

    audit_logs::insert(
        &mut *tx,
        &NewAuditLog {
            company_id: company.id,
            user_id: actor,
            entity_type: EntityType::Company,
            entity_id: company.id,
            action: AuditAction::Create,
            changes: audit::created(&company),
        },
    )
    .await?;

    tx.commit().await?;
    tracing::info!(company_id = %company.id, "Company created");
    Ok(company)
}

/// Returns `None` when the company does not exist.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    req: &UpdateCompany,
    actor: Option<Uuid>,
) -> Result<Option<Company>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let Some(existing) = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
    else {
        return Ok(None);
    };

    let updated = sqlx::query_as::<_, Company>(
        "UPDATE companies SET name = COALESCE($2, name), status = COALESCE($3, status)
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(req.name.as_deref())
    .bind(req.status.map(|s| s.as_str()))
    .fetch_one(&mut *tx)
    .await?;

    let mut changes = Changes::new();
    changes
        .touched(req.name.is_some(), "name", &existing.name, &updated.name)
        .touched(req.status.is_some(), "status", &existing.status, &updated.status);

    audit_logs::insert(
        &mut *tx,
        &NewAuditLog {
            company_id: id,
            user_id: actor,
            entity_type: EntityType::Company,
            entity_id: id,
            action: AuditAction::Update,
            changes: changes.into_value(),
        },
    )
    .await?;

    tx.commit().await?;
    tracing::info!(company_id = %id, "Company updated");
    Ok(Some(updated))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    /// The company has audit history beyond its creation.
    HasActivity,
}

/// Removes the company with its access grants, assets and audit trail.
/// Refused once anything other than a creation has been audited.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<DeleteOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let found: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM companies WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if found.is_none() {
        return Ok(DeleteOutcome::NotFound);
    }

    if audit_logs::count_activity(&mut *tx, id).await? > 0 {
        return Ok(DeleteOutcome::HasActivity);
    }

    let access = sqlx::query("DELETE FROM company_access WHERE company_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let assets = sqlx::query("DELETE FROM assets WHERE company_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let audit = sqlx::query("DELETE FROM audit_logs WHERE company_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM companies WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::info!(
        company_id = %id,
        access_grants = access.rows_affected(),
        assets = assets.rows_affected(),
        audit_rows = audit.rows_affected(),
        "Company deleted"
    );
    Ok(DeleteOutcome::Deleted)
}
