use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::response::ApiResponse;

pub async fn health() -> ApiResponse<Value> {
    ApiResponse::ok(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

pub async fn info() -> ApiResponse<Value> {
    ApiResponse::ok(json!({
        "name": "Asset Inventory Management System API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "operational",
        "endpoints": {
            "companies": "/companies",
            "users": "/users",
            "assets": "/assets",
            "audit_logs": "/audit-logs",
        },
    }))
}
