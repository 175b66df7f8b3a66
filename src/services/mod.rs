pub mod audit_service;
pub mod super_admin_service;
pub mod tenant_service;
pub mod user_service;

pub use audit_service::AuditService;
pub use super_admin_service::SuperAdminService;
pub use tenant_service::TenantService;
pub use user_service::UserService;

use crate::auth::AuthError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already registered: {0}")]
    DuplicateEmail(String),
    #[error("tenant slug or sub-account already in use: {0}")]
    DuplicateSlug(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unknown role: {0}")]
    InvalidRole(String),
    #[error("invalid slug: {0}")]
    InvalidSlug(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// True when the error is a Postgres unique-constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505")
    )
}
