use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuditAction, EntityType};

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: Uuid,
    pub company_id: Uuid,
    pub user_id: Option<Uuid>,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub action: String,
    pub changes: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// An audit record about to be appended.
#[derive(Debug, Clone)]
pub struct NewAuditLog {
    pub company_id: Uuid,
    pub user_id: Option<Uuid>,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub action: AuditAction,
    pub changes: serde_json::Value,
}
