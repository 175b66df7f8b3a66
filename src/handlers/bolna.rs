//! Proxy endpoints for the external voice platform. Tenant-scoped:
//! every request resolves the acting tenant from the token context and
//! forwards with that tenant's credential.

use axum::extract::Path;
use axum::{Extension, Json};
use serde_json::Value;

use crate::bolna::BolnaClient;
use crate::config;
use crate::db;
use crate::db::models::Tenant;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthContext};
use crate::services::TenantService;

async fn acting_tenant(ctx: &AuthContext) -> Result<Tenant, ApiError> {
    let tenant_id = ctx.require_tenant()?;

    let tenants = TenantService::new(db::pool()?);
    let tenant = tenants
        .get_tenant(tenant_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tenant no longer exists"))?;
    if !tenant.is_active() {
        return Err(ApiError::forbidden(format!(
            "Tenant '{}' is not active",
            tenant.slug
        )));
    }
    Ok(tenant)
}

fn client_for(tenant: &Tenant) -> Result<BolnaClient, ApiError> {
    BolnaClient::for_tenant(&config::config().bolna, tenant).map_err(ApiError::from)
}

/// POST /api/bolna/calls - Initiate an outbound call.
pub async fn make_call(
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    let tenant = acting_tenant(&ctx).await?;
    let data = client_for(&tenant)?.make_call(payload).await?;
    Ok(ApiResponse::success(data))
}

/// POST /api/bolna/calls/:id/stop - Stop a running call execution.
pub async fn stop_call(
    Extension(ctx): Extension<AuthContext>,
    Path(execution_id): Path<String>,
) -> ApiResult<Value> {
    let tenant = acting_tenant(&ctx).await?;
    let data = client_for(&tenant)?.stop_call(&execution_id).await?;
    Ok(ApiResponse::success(data))
}

/// GET /api/bolna/agents
pub async fn list_agents(Extension(ctx): Extension<AuthContext>) -> ApiResult<Value> {
    let tenant = acting_tenant(&ctx).await?;
    let data = client_for(&tenant)?.list_agents().await?;
    Ok(ApiResponse::success(data))
}

/// GET /api/bolna/batches
pub async fn list_batches(Extension(ctx): Extension<AuthContext>) -> ApiResult<Value> {
    let tenant = acting_tenant(&ctx).await?;
    let data = client_for(&tenant)?.list_batches().await?;
    Ok(ApiResponse::success(data))
}

/// GET /api/bolna/voices
pub async fn list_voices(Extension(ctx): Extension<AuthContext>) -> ApiResult<Value> {
    let tenant = acting_tenant(&ctx).await?;
    let data = client_for(&tenant)?.list_voices().await?;
    Ok(ApiResponse::success(data))
}

/// POST /api/bolna/models/custom - Register a custom LLM for the tenant.
pub async fn add_custom_model(
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    let tenant = acting_tenant(&ctx).await?;
    let data = client_for(&tenant)?.add_custom_model(payload).await?;
    Ok(ApiResponse::success(data))
}
