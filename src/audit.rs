//! Shapes the `changes` payload of audit records.
//!
//! create -> `{"created": entity}`, delete -> `{"deleted": entity}`,
//! update -> `{"field": {"from": old, "to": new}, ...}`.

use serde::Serialize;
use serde_json::{json, Map, Value};

pub fn created<T: Serialize>(entity: &T) -> Value {
    json!({ "created": to_value(entity) })
}

pub fn deleted<T: Serialize>(entity: &T) -> Value {
    json!({ "deleted": to_value(entity) })
}

/// Field-level diff for an update.
#[derive(Debug, Default)]
pub struct Changes(Map<String, Value>);

impl Changes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `field` when the request touched it. `to` is read back from
    /// the stored row.
    pub fn touched<T: Serialize + ?Sized>(
        &mut self,
        requested: bool,
        field: &str,
        from: &T,
        to: &T,
    ) -> &mut Self {
        if requested {
            self.0.insert(
                field.to_string(),
                json!({ "from": to_value(from), "to": to_value(to) }),
            );
        }
        self
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
