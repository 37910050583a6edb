use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Asset {
    pub id: Uuid,
    pub company_id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub asset_type: String,
    pub name: String,
    pub identifier: Option<String>,
    pub status: String,
    pub metadata: serde_json::Value,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
