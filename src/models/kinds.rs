use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A closed set of string tokens.
pub trait Vocabulary: FromStr + Copy + 'static {
    const ALL: &'static [Self];

    fn token(&self) -> &'static str;

    /// Accepted tokens, comma separated, for error messages.
    fn expected() -> String {
        Self::ALL
            .iter()
            .map(|v| v.token())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Closed string vocabularies. Each variant maps to exactly one wire/storage token.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $value)] $variant,)+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }

        impl Vocabulary for $name {
            const ALL: &'static [$name] = &[$($name::$variant),+];

            fn token(&self) -> &'static str {
                self.as_str()
            }
        }

        impl FromStr for $name {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    _ => Err(()),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(CompanyStatus {
    Active => "active",
    Inactive => "inactive",
    Suspended => "suspended",
});

string_enum!(UserStatus {
    Active => "active",
    Inactive => "inactive",
    Suspended => "suspended",
});

string_enum!(AssetStatus {
    Active => "active",
    Inactive => "inactive",
    Disposed => "disposed",
    Maintenance => "maintenance",
});

string_enum!(AssetType {
    Hardware => "hardware",
    Software => "software",
    License => "license",
    Other => "other",
});

string_enum!(
    /// Access role as exposed by the API. Stored lowercase.
    AccessRole {
        Owner => "OWNER",
        Admin => "ADMIN",
        Member => "MEMBER",
        ReadOnly => "READ_ONLY",
    }
);

string_enum!(EntityType {
    Company => "company",
    User => "user",
    CompanyAccess => "company_access",
    Asset => "asset",
});

string_enum!(AuditAction {
    Create => "create",
    Update => "update",
    Delete => "delete",
});

impl AccessRole {
    /// Storage token written for this role.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            AccessRole::Owner => "owner",
            AccessRole::Admin => "admin",
            AccessRole::Member => "member",
            AccessRole::ReadOnly => "read_only",
        }
    }

    /// Every storage token that reads back as this role.
    pub fn db_values(&self) -> Vec<&'static str> {
        match self {
            AccessRole::ReadOnly => vec!["read_only", "viewer"],
            other => vec![other.as_db_str()],
        }
    }

    /// Maps a stored role to its API token. Unknown values read as `Member`.
    pub fn from_db(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "owner" => AccessRole::Owner,
            "admin" => AccessRole::Admin,
            "read_only" | "viewer" => AccessRole::ReadOnly,
            _ => AccessRole::Member,
        }
    }
}
