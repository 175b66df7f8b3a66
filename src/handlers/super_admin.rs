use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::auth::{self, Identity};
use crate::config;
use crate::db;
use crate::db::models::Tenant;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthContext};
use crate::services::audit_service::{
    ACTION_IMPERSONATION_START, ACTION_IMPERSONATION_STOP, ACTION_TENANT_CREATED,
};
use crate::services::{AuditService, SuperAdminService, TenantService};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/super-admin/login
pub async fn login(Json(payload): Json<LoginRequest>) -> ApiResult<Value> {
    let admins = SuperAdminService::new(db::pool()?);
    let admin = admins
        .verify_credentials(&payload.email, &payload.password)
        .await?;

    let token = auth::issue_token(Identity::SuperAdmin { admin_id: admin.id })?;

    Ok(ApiResponse::success(json!({
        "token": token,
        "expires_in": config::config().security.jwt_expiry_hours * 3600,
        "admin": {
            "id": admin.id,
            "name": admin.name,
            "email": admin.email,
        }
    })))
}

#[derive(Debug, Deserialize)]
pub struct CreateTenantRequest {
    pub name: String,
    pub slug: String,
    pub bolna_sub_account_id: Option<String>,
    #[serde(default = "default_plan")]
    pub plan: String,
    #[serde(default)]
    pub settings: serde_json::Value,
}

fn default_plan() -> String {
    "starter".to_string()
}

/// POST /api/super-admin/tenants
pub async fn create_tenant(
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<CreateTenantRequest>,
) -> ApiResult<Tenant> {
    let admin_id = ctx.require_super_admin()?;

    let settings = if payload.settings.is_null() {
        json!({})
    } else {
        payload.settings
    };

    let tenants = TenantService::new(db::pool()?);
    let tenant = tenants
        .create_tenant(
            &payload.name,
            &payload.slug,
            payload.bolna_sub_account_id.as_deref(),
            &payload.plan,
            settings,
        )
        .await?;

    // The tenant exists either way; a failed audit insert is not worth
    // failing the request over.
    let audit = AuditService::new(db::pool()?);
    if let Err(e) = audit
        .record(
            ACTION_TENANT_CREATED,
            Some(admin_id),
            None,
            Some(tenant.id),
            json!({"slug": tenant.slug}),
        )
        .await
    {
        warn!("Failed to audit tenant creation: {}", e);
    }

    Ok(ApiResponse::created(tenant))
}

/// GET /api/super-admin/tenants
pub async fn list_tenants(Extension(ctx): Extension<AuthContext>) -> ApiResult<Vec<Tenant>> {
    ctx.require_super_admin()?;

    let tenants = TenantService::new(db::pool()?);
    Ok(ApiResponse::success(tenants.list_tenants().await?))
}

#[derive(Debug, Deserialize)]
pub struct ImpersonationStartRequest {
    pub tenant_id: i64,
}

/// POST /api/super-admin/impersonation/start
///
/// Issues a token scoped to the target tenant with the role fixed to
/// admin and the super-admin recorded as impersonator. Exactly one
/// `impersonation_start` audit row is written per transition; if that
/// insert fails, the transition does not happen.
pub async fn impersonation_start(
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<ImpersonationStartRequest>,
) -> ApiResult<Value> {
    let admin_id = ctx.require_super_admin()?;

    let tenants = TenantService::new(db::pool()?);
    let tenant = tenants
        .get_tenant(payload.tenant_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Tenant {} not found", payload.tenant_id)))?;
    if !tenant.is_active() {
        return Err(ApiError::forbidden(format!(
            "Tenant '{}' is not active",
            tenant.slug
        )));
    }

    let audit = AuditService::new(db::pool()?);
    audit
        .record(
            ACTION_IMPERSONATION_START,
            Some(admin_id),
            Some(admin_id),
            Some(tenant.id),
            json!({"tenant_slug": tenant.slug}),
        )
        .await?;

    let token = auth::issue_token(Identity::Impersonation {
        admin_id,
        tenant_id: tenant.id,
    })?;

    Ok(ApiResponse::success(json!({
        "token": token,
        "expires_in": config::config().security.jwt_expiry_hours * 3600,
        "tenant": {
            "id": tenant.id,
            "name": tenant.name,
            "slug": tenant.slug,
        }
    })))
}

/// POST /api/super-admin/impersonation/stop
///
/// Best-effort notification: the audit insert may fail without failing
/// the request, because the client restores its saved super-admin
/// session locally either way. The response reports whether the stop
/// was audited.
pub async fn impersonation_stop(Extension(ctx): Extension<AuthContext>) -> ApiResult<Value> {
    let impersonator_id = ctx
        .impersonator_id
        .ok_or_else(|| ApiError::bad_request("No active impersonation on this token"))?;

    let audited = match db::pool() {
        Ok(pool) => {
            let audit = AuditService::new(pool);
            match audit
                .record(
                    ACTION_IMPERSONATION_STOP,
                    Some(impersonator_id),
                    Some(impersonator_id),
                    ctx.tenant_id,
                    json!({}),
                )
                .await
            {
                Ok(_) => true,
                Err(e) => {
                    warn!("Failed to audit impersonation stop: {}", e);
                    false
                }
            }
        }
        Err(e) => {
            warn!("Failed to audit impersonation stop: {}", e);
            false
        }
    };

    Ok(ApiResponse::success(json!({
        "stopped": true,
        "audited": audited,
    })))
}
