//! Router assembly. Token acquisition routes are public; everything
//! else sits behind the bearer-auth layer.

use axum::{
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{db, handlers, middleware};

pub fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Public auth routes (token acquisition)
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/super-admin/login", post(handlers::super_admin::login))
        // Everything else requires a bearer token
        .merge(protected_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn protected_routes() -> Router {
    use handlers::{auth, bolna, super_admin, tenant_users};

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami))
        // Super-admin tenant management and impersonation
        .route(
            "/api/super-admin/tenants",
            get(super_admin::list_tenants).post(super_admin::create_tenant),
        )
        .route(
            "/api/super-admin/impersonation/start",
            post(super_admin::impersonation_start),
        )
        .route(
            "/api/super-admin/impersonation/stop",
            post(super_admin::impersonation_stop),
        )
        // Tenant-scoped records
        .route(
            "/api/tenant/users",
            get(tenant_users::list_users).post(tenant_users::create_user),
        )
        // Voice platform proxy
        .route("/api/bolna/calls", post(bolna::make_call))
        .route("/api/bolna/calls/:id/stop", post(bolna::stop_call))
        .route("/api/bolna/agents", get(bolna::list_agents))
        .route("/api/bolna/batches", get(bolna::list_batches))
        .route("/api/bolna/voices", get(bolna::list_voices))
        .route("/api/bolna/models/custom", post(bolna::add_custom_model))
        .route_layer(axum::middleware::from_fn(middleware::bearer_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "VoiceDesk API",
            "version": version,
            "description": "Multi-tenant administration backend for the Bolna voice platform",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "login": "/api/auth/login, /api/super-admin/login (public - token acquisition)",
                "auth": "/api/auth/whoami (protected)",
                "super_admin": "/api/super-admin/tenants, /api/super-admin/impersonation/* (protected, super-admin)",
                "tenant": "/api/tenant/users (protected, tenant-scoped)",
                "bolna": "/api/bolna/* (protected, tenant-scoped proxy)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match db::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
