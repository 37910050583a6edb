use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AccessRole;

/// Row as stored: `role` is the lowercase storage token.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompanyAccessRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyAccess {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub role: AccessRole,
    pub created_at: DateTime<Utc>,
}

impl From<CompanyAccessRow> for CompanyAccess {
    fn from(row: CompanyAccessRow) -> Self {
        CompanyAccess {
            id: row.id,
            user_id: row.user_id,
            company_id: row.company_id,
            role: AccessRole::from_db(&row.role),
            created_at: row.created_at,
        }
    }
}
