use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{self, Changes};
use crate::db::audit_logs;
use crate::models::{AuditAction, EntityType, NewAuditLog, User, UserStatus};
use crate::validation::{CreateUser, UpdateUser};

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let row: (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UserFilter {
    pub status: Option<UserStatus>,
    /// Users whose primary company this is, or who hold a grant to it.
    pub company_id: Option<Uuid>,
}

pub async fn list(
    pool: &PgPool,
    filter: UserFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT u.* FROM users u
         WHERE ($1::text IS NULL OR u.status = $1)
           AND ($2::uuid IS NULL
                OR u.primary_company_id = $2
                OR EXISTS (SELECT 1 FROM company_access ca
                           WHERE ca.user_id = u.id AND ca.company_id = $2))
         ORDER BY u.created_at DESC, u.id DESC LIMIT $3 OFFSET $4",
    )
    .bind(filter.status.map(|s| s.as_str()))
    .bind(filter.company_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &PgPool, filter: UserFilter) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM users u
         WHERE ($1::text IS NULL OR u.status = $1)
           AND ($2::uuid IS NULL
                OR u.primary_company_id = $2
                OR EXISTS (SELECT 1 FROM company_access ca
                           WHERE ca.user_id = u.id AND ca.company_id = $2))",
    )
    .bind(filter.status.map(|s| s.as_str()))
    .bind(filter.company_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

pub async fn create(pool: &PgPool, req: &CreateUser, actor: Option<Uuid>) -> Result<User, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (email, name, primary_company_id, status)
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(&req.email)
    .bind(&req.name)
    .bind(req.primary_company_id)
    .bind(req.status.as_str())
    .fetch_one(&mut *tx)
    .await?;

    audit_logs::insert(
        &mut *tx,
        &NewAuditLog {
            company_id: user.audit_company_id(),
            user_id: actor,
            entity_type: EntityType::User,
            entity_id: user.id,
            action: AuditAction::Create,
            changes: audit::created(&user),
        },
    )
    .await?;

    tx.commit().await?;
    tracing::info!(user_id = %user.id, "User created");
    Ok(user)
}

/// Returns `None` when the user does not exist.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    req: &UpdateUser,
    actor: Option<Uuid>,
) -> Result<Option<User>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let Some(existing) = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
    else {
        return Ok(None);
    };

    let updated = sqlx::query_as::<_, User>(
        "UPDATE users SET
            email = COALESCE($2, email),
            name = COALESCE($3, name),
            primary_company_id = CASE WHEN $4::boolean THEN $5::uuid ELSE primary_company_id END,
            status = COALESCE($6, status)
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(req.email.as_deref())
    .bind(req.name.as_deref())
    .bind(req.primary_company_id.is_some())
    .bind(req.primary_company_id.flatten())
    .bind(req.status.map(|s| s.as_str()))
    .fetch_one(&mut *tx)
    .await?;

    let mut changes = Changes::new();
    changes
        .touched(req.email.is_some(), "email", &existing.email, &updated.email)
        .touched(req.name.is_some(), "name", &existing.name, &updated.name)
        .touched(
            req.primary_company_id.is_some(),
            "primary_company_id",
            &existing.primary_company_id,
            &updated.primary_company_id,
        )
        .touched(req.status.is_some(), "status", &existing.status, &updated.status);

    audit_logs::insert(
        &mut *tx,
        &NewAuditLog {
            company_id: updated.audit_company_id(),
            user_id: actor,
            entity_type: EntityType::User,
            entity_id: id,
            action: AuditAction::Update,
            changes: changes.into_value(),
        },
    )
    .await?;

    tx.commit().await?;
    tracing::info!(user_id = %id, "User updated");
    Ok(Some(updated))
}

/// Drops the user's grants and assignments, then the user.
/// Returns the user as it was, or `None` when it does not exist.
pub async fn delete(pool: &PgPool, id: Uuid, actor: Option<Uuid>) -> Result<Option<User>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let Some(existing) = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
    else {
        return Ok(None);
    };

    let grants = sqlx::query("DELETE FROM company_access WHERE user_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let unassigned = sqlx::query("UPDATE assets SET assigned_to = NULL WHERE assigned_to = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    audit_logs::insert(
        &mut *tx,
        &NewAuditLog {
            company_id: existing.audit_company_id(),
            user_id: actor,
            entity_type: EntityType::User,
            entity_id: id,
            action: AuditAction::Delete,
            changes: audit::deleted(&existing),
        },
    )
    .await?;

    tx.commit().await?;
    tracing::info!(
        user_id = %id,
        access_grants = grants.rows_affected(),
        unassigned_assets = unassigned.rows_affected(),
        "User deleted"
    );
    Ok(Some(existing))
}
