pub mod assets;
pub mod audit_logs;
pub mod companies;
pub mod company_access;
pub mod users;
