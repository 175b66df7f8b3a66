use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{self, Identity, Role};
use crate::config;
use crate::db;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthContext};
use crate::services::UserService;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/login - Authenticate a tenant user and receive a bearer token.
///
/// The response never reveals whether the email exists; bad email and
/// bad password produce the same 401.
pub async fn login(Json(payload): Json<LoginRequest>) -> ApiResult<Value> {
    let users = UserService::new(db::pool()?);
    let (user, tenant) = users
        .verify_credentials(&payload.email, &payload.password)
        .await?;

    let role = role_from_stored(&user.role)?;
    let token = auth::issue_token(Identity::User {
        user_id: user.id,
        tenant_id: tenant.id,
        role,
    })?;

    Ok(ApiResponse::success(json!({
        "token": token,
        "expires_in": config::config().security.jwt_expiry_hours * 3600,
        "user": {
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "role": user.role,
        },
        "tenant": {
            "id": tenant.id,
            "name": tenant.name,
            "slug": tenant.slug,
        }
    })))
}

/// A stored role that no longer parses means the row is corrupt; no
/// token is issued for it, rather than quietly downgrading the role.
fn role_from_stored(stored: &str) -> Result<Role, ApiError> {
    Role::parse(stored).ok_or_else(|| {
        tracing::error!("Unparseable role '{}' on stored user row", stored);
        ApiError::internal_server_error("Account is misconfigured, contact an administrator")
    })
}

/// GET /api/auth/whoami - Echo of the verified token claims.
pub async fn whoami(Extension(ctx): Extension<AuthContext>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "id": ctx.id,
        "kind": ctx.kind,
        "tenant_id": ctx.tenant_id,
        "role": ctx.role,
        "impersonator_id": ctx.impersonator_id,
        "impersonating": ctx.is_impersonating(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_roles_parse_back() {
        assert_eq!(role_from_stored("admin").unwrap(), Role::Admin);
        assert_eq!(role_from_stored("manager").unwrap(), Role::Manager);
        assert_eq!(role_from_stored("agent").unwrap(), Role::Agent);
    }

    #[test]
    fn corrupt_stored_role_never_mints_a_token() {
        let err = role_from_stored("superuser").unwrap_err();
        assert_eq!(err.status_code(), 500);
    }
}
