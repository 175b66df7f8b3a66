use axum::{Extension, Json};
use serde::Deserialize;

use crate::auth::Role;
use crate::db;
use crate::db::models::UserPublic;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthContext};
use crate::services::{StoreError, UserService};

/// GET /api/tenant/users - Users of the acting tenant only.
///
/// The tenant id comes from the verified token context, so a token
/// scoped to tenant A can never list tenant B's users.
pub async fn list_users(Extension(ctx): Extension<AuthContext>) -> ApiResult<Vec<UserPublic>> {
    let tenant_id = ctx.require_tenant()?;

    let users = UserService::new(db::pool()?);
    Ok(ApiResponse::success(users.list_users(tenant_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// POST /api/tenant/users - Create a user under the acting tenant.
pub async fn create_user(
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<UserPublic> {
    let tenant_id = ctx.require_tenant()?;

    // Only tenant admins manage accounts; impersonation tokens carry
    // the admin role and pass this check.
    if ctx.role != Some(Role::Admin) {
        return Err(ApiError::forbidden("Only tenant admins can create users"));
    }

    let role = Role::parse(&payload.role)
        .ok_or_else(|| StoreError::InvalidRole(payload.role.clone()))
        .map_err(ApiError::from)?;

    let users = UserService::new(db::pool()?);
    let user = users
        .create_user(
            tenant_id,
            &payload.name,
            &payload.email,
            &payload.password,
            role,
        )
        .await?;

    Ok(ApiResponse::created(user))
}
