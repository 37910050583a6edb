use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{self, Changes};
use crate::db::audit_logs;
use crate::models::{Asset, AssetStatus, AssetType, AuditAction, EntityType, NewAuditLog};
use crate::validation::{CreateAsset, UpdateAsset};

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Asset>, sqlx::Error> {
    sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AssetFilter {
    pub company_id: Option<Uuid>,
    pub asset_type: Option<AssetType>,
    pub status: Option<AssetStatus>,
}

pub async fn list(
    pool: &PgPool,
    filter: AssetFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Asset>, sqlx::Error> {
    sqlx::query_as::<_, Asset>(
        "SELECT * FROM assets
         WHERE ($1::uuid IS NULL OR company_id = $1)
           AND ($2::text IS NULL OR type = $2)
           AND ($3::text IS NULL OR status = $3)
         ORDER BY created_at DESC, id DESC LIMIT $4 OFFSET $5",
    )
    .bind(filter.company_id)
    .bind(filter.asset_type.map(|t| t.as_str()))
    .bind(filter.status.map(|s| s.as_str()))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &PgPool, filter: AssetFilter) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM assets
         WHERE ($1::uuid IS NULL OR company_id = $1)
           AND ($2::text IS NULL OR type = $2)
           AND ($3::text IS NULL OR status = $3)",
    )
    .bind(filter.company_id)
    .bind(filter.asset_type.map(|t| t.as_str()))
    .bind(filter.status.map(|s| s.as_str()))
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

pub async fn create(pool: &PgPool, req: &CreateAsset, actor: Option<Uuid>) -> Result<Asset, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let asset = sqlx::query_as::<_, Asset>(
        "INSERT INTO assets (company_id, type, name, identifier, status, metadata, assigned_to)
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(req.company_id)
    .bind(req.asset_type.as_str())
    .bind(&req.name)
    .bind(req.identifier.as_deref())
    .bind(req.status.as_str())
    .bind(&req.metadata)
    .bind(req.assigned_to)
    .fetch_one(&mut *tx)
    .await?;

    audit_logs::insert(
        &mut *tx,
        &NewAuditLog {
            company_id: asset.company_id,
            user_id: actor,
            entity_type: EntityType::Asset,
            entity_id: asset.id,
            action: AuditAction::Create,
            changes: audit::created(&asset),
        },
    )
    .await?;

    tx.commit().await?;
    tracing::info!(asset_id = %asset.id, company_id = %asset.company_id, "Asset created");
    Ok(asset)
}

/// Returns `None` when the asset does not exist.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    req: &UpdateAsset,
    actor: Option<Uuid>,
) -> Result<Option<Asset>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let Some(existing) = sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
    else {
        return Ok(None);
    };

    let updated = sqlx::query_as::<_, Asset>(
        "UPDATE assets SET
            type = COALESCE($2, type),
            name = COALESCE($3, name),
            identifier = CASE WHEN $4::boolean THEN $5::text ELSE identifier END,
            status = COALESCE($6, status),
            metadata = COALESCE($7::jsonb, metadata),
            assigned_to = CASE WHEN $8::boolean THEN $9::uuid ELSE assigned_to END
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(req.asset_type.map(|t| t.as_str()))
    .bind(req.name.as_deref())
    .bind(req.identifier.is_some())
    .bind(req.identifier.clone().flatten())
    .bind(req.status.map(|s| s.as_str()))
    .bind(req.metadata.clone())
    .bind(req.assigned_to.is_some())
    .bind(req.assigned_to.flatten())
    .fetch_one(&mut *tx)
    .await?;

    let mut changes = Changes::new();
    changes
        .touched(req.asset_type.is_some(), "type", &existing.asset_type, &updated.asset_type)
        .touched(req.name.is_some(), "name", &existing.name, &updated.name)
        .touched(
            req.identifier.is_some(),
            "identifier",
            &existing.identifier,
            &updated.identifier,
        )
        .touched(req.status.is_some(), "status", &existing.status, &updated.status)
        .touched(req.metadata.is_some(), "metadata", &existing.metadata, &updated.metadata)
        .touched(
            req.assigned_to.is_some(),
            "assigned_to",
            &existing.assigned_to,
            &updated.assigned_to,
        );

    audit_logs::insert(
        &mut *tx,
        &NewAuditLog {
            company_id: updated.company_id,
            user_id: actor,
            entity_type: EntityType::Asset,
            entity_id: id,
            action: AuditAction::Update,
            changes: changes.into_value(),
        },
    )
    .await?;

    tx.commit().await?;
    tracing::info!(asset_id = %id, "Asset updated");
    Ok(Some(updated))
}

/// Returns the asset as it was, or `None` when it does not exist.
pub async fn delete(pool: &PgPool, id: Uuid, actor: Option<Uuid>) -> Result<Option<Asset>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let Some(existing) = sqlx::query_as::<_, Asset>("DELETE FROM assets WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
    else {
        return Ok(None);
    };

    audit_logs::insert(
        &mut *tx,
        &NewAuditLog {
            company_id: existing.company_id,
            user_id: actor,
            entity_type: EntityType::Asset,
            entity_id: id,
            action: AuditAction::Delete,
            changes: audit::deleted(&existing),
        },
    )
    .await?;

    tx.commit().await?;
    tracing::info!(asset_id = %id, "Asset deleted");
    Ok(Some(existing))
}
