mod asset;
mod audit_log;
mod company;
mod company_access;
mod kinds;
mod user;

pub use asset::Asset;
pub use audit_log::{AuditLog, NewAuditLog};
pub use company::Company;
pub use company_access::{CompanyAccess, CompanyAccessRow};
pub use kinds::{
    AccessRole, AssetStatus, AssetType, AuditAction, CompanyStatus, EntityType, UserStatus,
    Vocabulary,
};
pub use user::User;
