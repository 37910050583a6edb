//! Shape, type and vocabulary checks for inbound JSON and query strings.
//!
//! Nothing here touches storage. Each `validate_*` function either returns a
//! typed, normalized request or every field-level problem it found.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{AppError, FieldErrors};
use crate::models::{
    AccessRole, AssetStatus, AssetType, CompanyStatus, UserStatus, Vocabulary,
};

pub const MAX_NAME_LEN: usize = 255;
pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 100;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

#[derive(Debug, Default)]
pub struct ValidationErrors(FieldErrors);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(value)` when nothing was recorded.
    pub fn finish<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }

    fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors.0)
    }
}

// ── Typed requests ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct CreateCompany {
    pub name: String,
    pub status: CompanyStatus,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateCompany {
    pub name: Option<String>,
    pub status: Option<CompanyStatus>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateUser {
    pub email: String,
    pub name: String,
    pub primary_company_id: Option<Uuid>,
    pub status: UserStatus,
}

/// `Some(None)` on a nullable field means "set to null".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub name: Option<String>,
    pub primary_company_id: Option<Option<Uuid>>,
    pub status: Option<UserStatus>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddUserToCompany {
    pub user_id: Uuid,
    pub role: AccessRole,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateAsset {
    pub company_id: Uuid,
    pub asset_type: AssetType,
    pub name: String,
    pub identifier: Option<String>,
    pub status: AssetStatus,
    pub metadata: Value,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateAsset {
    pub asset_type: Option<AssetType>,
    pub name: Option<String>,
    pub identifier: Option<Option<String>>,
    pub status: Option<AssetStatus>,
    pub metadata: Option<Value>,
    pub assigned_to: Option<Option<Uuid>>,
}

// ── Companies ───────────────────────────────────────────────────

pub fn validate_create_company(data: &Value) -> Result<CreateCompany, ValidationErrors> {
    let body = body_object(data)?;
    let mut errors = ValidationErrors::new();

    let name = required_name(body, &mut errors);
    let status = optional_enum::<CompanyStatus>(body, "status", &mut errors);

    errors.finish(CreateCompany {
        name: name.unwrap_or_default(),
        status: status.unwrap_or(CompanyStatus::Active),
    })
}

pub fn validate_update_company(data: &Value) -> Result<UpdateCompany, ValidationErrors> {
    let body = body_object(data)?;
    let mut errors = ValidationErrors::new();

    let req = UpdateCompany {
        name: optional_name(body, &mut errors),
        status: optional_enum::<CompanyStatus>(body, "status", &mut errors),
    };

    require_any(body, &["name", "status"], &mut errors);
    errors.finish(req)
}

// ── Users ───────────────────────────────────────────────────────

pub fn validate_create_user(data: &Value) -> Result<CreateUser, ValidationErrors> {
    let body = body_object(data)?;
    let mut errors = ValidationErrors::new();

    let email = match body.get("email") {
        Some(value) => check_email(value, "Email is required", &mut errors),
        None => {
            errors.add("email", "Email is required");
            None
        }
    };
    let name = required_name(body, &mut errors);

    let primary_company_id = match body.get("primary_company_id") {
        None | Some(Value::Null) => None,
        Some(value) => {
            let id = as_uuid(value);
            if id.is_none() {
                errors.add("primary_company_id", "Primary company ID must be a valid UUID");
            }
            id
        }
    };

    let status = optional_enum::<UserStatus>(body, "status", &mut errors);

    errors.finish(CreateUser {
        email: email.unwrap_or_default(),
        name: name.unwrap_or_default(),
        primary_company_id,
        status: status.unwrap_or(UserStatus::Active),
    })
}

pub fn validate_update_user(data: &Value) -> Result<UpdateUser, ValidationErrors> {
    let body = body_object(data)?;
    let mut errors = ValidationErrors::new();

    let email = body
        .get("email")
        .and_then(|value| check_email(value, "Email must be a non-empty string", &mut errors));
    let name = optional_name(body, &mut errors);

    let primary_company_id = match body.get("primary_company_id") {
        None => None,
        Some(Value::Null) => Some(None),
        Some(value) => match as_uuid(value) {
            Some(id) => Some(Some(id)),
            None => {
                errors.add(
                    "primary_company_id",
                    "Primary company ID must be a valid UUID or null",
                );
                None
            }
        },
    };

    let status = optional_enum::<UserStatus>(body, "status", &mut errors);

    require_any(
        body,
        &["email", "name", "primary_company_id", "status"],
        &mut errors,
    );

    errors.finish(UpdateUser {
        email,
        name,
        primary_company_id,
        status,
    })
}

// ── Company access ──────────────────────────────────────────────

pub fn validate_add_user_to_company(data: &Value) -> Result<AddUserToCompany, ValidationErrors> {
    let body = body_object(data)?;
    let mut errors = ValidationErrors::new();

    let user_id = body.get("user_id").and_then(as_uuid);
    if user_id.is_none() {
        errors.add("user_id", "User ID is required and must be a valid UUID");
    }
    let role = optional_enum::<AccessRole>(body, "role", &mut errors);

    errors.finish(AddUserToCompany {
        user_id: user_id.unwrap_or_default(),
        role: role.unwrap_or(AccessRole::Member),
    })
}

// ── Assets ──────────────────────────────────────────────────────

pub fn validate_create_asset(data: &Value) -> Result<CreateAsset, ValidationErrors> {
    let body = body_object(data)?;
    let mut errors = ValidationErrors::new();

    let company_id = body.get("company_id").and_then(as_uuid);
    if company_id.is_none() {
        errors.add("company_id", "Company ID is required and must be a valid UUID");
    }

    let asset_type = body.get("type").and_then(as_enum::<AssetType>);
    if asset_type.is_none() {
        errors.add(
            "type",
            format!("Type is required and must be one of: {}", AssetType::expected()),
        );
    }

    let name = required_name(body, &mut errors);

    let identifier = match body.get("identifier") {
        None | Some(Value::Null) => None,
        Some(value) => check_identifier(value, "Identifier must be a string", &mut errors),
    };

    let status = optional_enum::<AssetStatus>(body, "status", &mut errors);

    let metadata = match body.get("metadata") {
        None => Some(Value::Object(Map::new())),
        Some(value) => check_metadata(value, &mut errors),
    };

    let assigned_to = match body.get("assigned_to") {
        None | Some(Value::Null) => None,
        Some(value) => {
            let id = as_uuid(value);
            if id.is_none() {
                errors.add("assigned_to", "Assigned user ID must be a valid UUID");
            }
            id
        }
    };

    errors.finish(CreateAsset {
        company_id: company_id.unwrap_or_default(),
        asset_type: asset_type.unwrap_or(AssetType::Other),
        name: name.unwrap_or_default(),
        identifier,
        status: status.unwrap_or(AssetStatus::Active),
        metadata: metadata.unwrap_or_default(),
        assigned_to,
    })
}

pub fn validate_update_asset(data: &Value) -> Result<UpdateAsset, ValidationErrors> {
    let body = body_object(data)?;
    let mut errors = ValidationErrors::new();

    let asset_type = match body.get("type") {
        None => None,
        Some(value) => {
            let parsed = as_enum::<AssetType>(value);
            if parsed.is_none() {
                errors.add("type", format!("Type must be one of: {}", AssetType::expected()));
            }
            parsed
        }
    };

    let name = optional_name(body, &mut errors);

    let identifier = match body.get("identifier") {
        None => None,
        Some(Value::Null) => Some(None),
        Some(value) => check_identifier(value, "Identifier must be a string or null", &mut errors)
            .map(Some),
    };

    let status = optional_enum::<AssetStatus>(body, "status", &mut errors);
    let metadata = body
        .get("metadata")
        .and_then(|value| check_metadata(value, &mut errors));

    let assigned_to = match body.get("assigned_to") {
        None => None,
        Some(Value::Null) => Some(None),
        Some(value) => match as_uuid(value) {
            Some(id) => Some(Some(id)),
            None => {
                errors.add("assigned_to", "Assigned user ID must be a valid UUID or null");
                None
            }
        },
    };

    require_any(
        body,
        &["type", "name", "identifier", "status", "metadata", "assigned_to"],
        &mut errors,
    );

    errors.finish(UpdateAsset {
        asset_type,
        name,
        identifier,
        status,
        metadata,
        assigned_to,
    })
}

// ── Query and path parameters ───────────────────────────────────

/// Parses a hyphenated UUID; anything else is reported against `field`.
pub fn parse_uuid(value: &str, field: &str) -> Result<Uuid, ValidationErrors> {
    parse_hyphenated(value).ok_or_else(|| invalid_uuid(field))
}

pub fn invalid_uuid(field: &str) -> ValidationErrors {
    ValidationErrors::single(field, format!("{field} must be a valid UUID"))
}

/// Empty or absent query values mean "no filter".
pub fn optional_uuid_filter(
    value: Option<&str>,
    field: &str,
) -> Result<Option<Uuid>, ValidationErrors> {
    match value.filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => parse_uuid(v, field).map(Some),
    }
}

pub fn optional_enum_filter<T>(
    value: Option<&str>,
    field: &str,
) -> Result<Option<T>, ValidationErrors>
where
    T: FromStr,
{
    match value.filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v.parse::<T>().map(Some).map_err(|_| {
            ValidationErrors::single(field, format!("{field} has an unsupported value '{v}'"))
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Pagination {
    /// `limit` defaults to 50 and is clamped to 1..=100; negative offsets
    /// clamp to 0. Non-numeric values are rejected.
    pub fn from_query(
        limit: Option<&str>,
        offset: Option<&str>,
    ) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let limit = match limit.map(str::trim).filter(|v| !v.is_empty()) {
            None => DEFAULT_LIMIT,
            Some(v) => v.parse::<i64>().unwrap_or_else(|_| {
                errors.add("limit", "limit must be an integer");
                DEFAULT_LIMIT
            }),
        };
        let offset = match offset.map(str::trim).filter(|v| !v.is_empty()) {
            None => 0,
            Some(v) => v.parse::<i64>().unwrap_or_else(|_| {
                errors.add("offset", "offset must be an integer");
                0
            }),
        };

        errors.finish(Pagination {
            limit: limit.clamp(1, MAX_LIMIT),
            offset: offset.max(0),
        })
    }

    /// 1-based page the window starts on.
    pub fn page(&self) -> i64 {
        (self.offset / self.limit).saturating_add(1)
    }
}

// ── Helpers ─────────────────────────────────────────────────────

fn body_object(data: &Value) -> Result<&Map<String, Value>, ValidationErrors> {
    data.as_object()
        .ok_or_else(|| ValidationErrors::single("_root", "Request body must be an object"))
}

fn non_empty_trimmed(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_hyphenated(value: &str) -> Option<Uuid> {
    // Uuid::parse_str also takes simple, braced and URN forms.
    if value.len() != 36 {
        return None;
    }
    Uuid::parse_str(value).ok()
}

fn as_uuid(value: &Value) -> Option<Uuid> {
    value.as_str().and_then(parse_hyphenated)
}

fn as_enum<T: FromStr>(value: &Value) -> Option<T> {
    value.as_str().and_then(|s| s.parse().ok())
}

fn check_name_len(name: &str, errors: &mut ValidationErrors) {
    if name.chars().count() > MAX_NAME_LEN {
        errors.add("name", format!("Name must be {MAX_NAME_LEN} characters or less"));
    }
}

fn required_name(body: &Map<String, Value>, errors: &mut ValidationErrors) -> Option<String> {
    match body.get("name").and_then(non_empty_trimmed) {
        Some(name) => {
            check_name_len(name, errors);
            Some(name.to_string())
        }
        None => {
            errors.add("name", "Name is required and must be a non-empty string");
            None
        }
    }
}

fn optional_name(body: &Map<String, Value>, errors: &mut ValidationErrors) -> Option<String> {
    let value = body.get("name")?;
    match non_empty_trimmed(value) {
        Some(name) => {
            check_name_len(name, errors);
            Some(name.to_string())
        }
        None => {
            errors.add("name", "Name must be a non-empty string");
            None
        }
    }
}

/// Present-but-invalid values (including null) are errors.
fn optional_enum<T: Vocabulary>(
    body: &Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<T> {
    let value = body.get(field)?;
    let parsed = as_enum::<T>(value);
    if parsed.is_none() {
        let label = capitalize(field);
        errors.add(field, format!("{label} must be one of: {}", T::expected()));
    }
    parsed
}

fn check_email(value: &Value, missing: &str, errors: &mut ValidationErrors) -> Option<String> {
    let Some(email) = non_empty_trimmed(value) else {
        errors.add("email", missing);
        return None;
    };
    if !EMAIL_RE.is_match(email) {
        errors.add("email", "Email must be a valid email address");
        return None;
    }
    Some(email.to_lowercase())
}

fn check_identifier(value: &Value, wrong_type: &str, errors: &mut ValidationErrors) -> Option<String> {
    let Some(identifier) = value.as_str() else {
        errors.add("identifier", wrong_type);
        return None;
    };
    if identifier.chars().count() > MAX_NAME_LEN {
        errors.add(
            "identifier",
            format!("Identifier must be {MAX_NAME_LEN} characters or less"),
        );
        return None;
    }
    Some(identifier.to_string())
}

fn check_metadata(value: &Value, errors: &mut ValidationErrors) -> Option<Value> {
    if value.is_object() {
        Some(value.clone())
    } else {
        errors.add("metadata", "Metadata must be a JSON object");
        None
    }
}

fn require_any(body: &Map<String, Value>, fields: &[&str], errors: &mut ValidationErrors) {
    if !fields.iter().any(|f| body.contains_key(*f)) {
        errors.add("_root", "At least one field must be provided for update");
    }
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
