use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub primary_company_id: Option<Uuid>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Tenant an audit record about this user is filed under.
    pub fn audit_company_id(&self) -> Uuid {
        self.primary_company_id.unwrap_or(self.id)
    }
}
