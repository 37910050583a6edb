use sqlx::PgPool;
use uuid::Uuid;

use crate::audit;
use crate::db::audit_logs;
use crate::models::{
    AccessRole, AuditAction, CompanyAccess, CompanyAccessRow, EntityType, NewAuditLog,
};
use crate::validation::AddUserToCompany;

pub async fn exists(pool: &PgPool, company_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let row: (bool,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM company_access WHERE company_id = $1 AND user_id = $2)",
    )
    .bind(company_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

/// Storage tokens matching the role filter, `None` for no filter.
fn role_tokens(role: Option<AccessRole>) -> Option<Vec<&'static str>> {
    role.map(|r| r.db_values())
}

pub async fn list_by_company(
    pool: &PgPool,
    company_id: Uuid,
    role: Option<AccessRole>,
    limit: i64,
    offset: i64,
) -> Result<Vec<CompanyAccess>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CompanyAccessRow>(
        "SELECT * FROM company_access
         WHERE company_id = $1 AND ($2::text[] IS NULL OR role = ANY($2))
         ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4",
    )
    .bind(company_id)
    .bind(role_tokens(role))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(CompanyAccess::from).collect())
}

pub async fn count_by_company(
    pool: &PgPool,
    company_id: Uuid,
    role: Option<AccessRole>,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM company_access
         WHERE company_id = $1 AND ($2::text[] IS NULL OR role = ANY($2))",
    )
    .bind(company_id)
    .bind(role_tokens(role))
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<CompanyAccess>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CompanyAccessRow>(
        "SELECT * FROM company_access WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(CompanyAccess::from).collect())
}

pub async fn add(
    pool: &PgPool,
    company_id: Uuid,
    req: &AddUserToCompany,
    actor: Option<Uuid>,
) -> Result<CompanyAccess, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let access: CompanyAccess = sqlx::query_as::<_, CompanyAccessRow>(
        "INSERT INTO company_access (user_id, company_id, role) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(req.user_id)
    .bind(company_id)
    .bind(req.role.as_db_str())
    .fetch_one(&mut *tx)
    .await?
    .into();

    audit_logs::insert(
        &mut *tx,
        &NewAuditLog {
            company_id,
            user_id: actor,
            entity_type: EntityType::CompanyAccess,
            entity_id: access.id,
            action: AuditAction::Create,
            changes: audit::created(&access),
        },
    )
    .await?;

    tx.commit().await?;
    tracing::info!(
        company_id = %company_id,
        user_id = %req.user_id,
        role = %access.role,
        "Company access granted"
    );
    Ok(access)
}

/// Returns the removed grant, or `None` when there was none.
pub async fn remove(
    pool: &PgPool,
    company_id: Uuid,
    user_id: Uuid,
    actor: Option<Uuid>,
) -> Result<Option<CompanyAccess>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let Some(row) = sqlx::query_as::<_, CompanyAccessRow>(
        "DELETE FROM company_access WHERE company_id = $1 AND user_id = $2 RETURNING *",
    )
    .bind(company_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    else {
        return Ok(None);
    };
    let existing = CompanyAccess::from(row);

    audit_logs::insert(
        &mut *tx,
        &NewAuditLog {
            company_id,
            user_id: actor,
            entity_type: EntityType::CompanyAccess,
            entity_id: existing.id,
            action: AuditAction::Delete,
            changes: audit::deleted(&existing),
        },
    )
    .await?;

    tx.commit().await?;
    tracing::info!(company_id = %company_id, user_id = %user_id, "Company access removed");
    Ok(Some(existing))
}
