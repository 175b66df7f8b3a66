pub mod audit_log;
pub mod super_admin;
pub mod tenant;
pub mod user;

pub use audit_log::AdminAuditLog;
pub use super_admin::SuperAdmin;
pub use tenant::Tenant;
pub use user::{User, UserPublic};
