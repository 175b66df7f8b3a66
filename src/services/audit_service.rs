use sqlx::PgPool;

use super::StoreError;
use crate::db::models::AdminAuditLog;

pub const ACTION_IMPERSONATION_START: &str = "impersonation_start";
pub const ACTION_IMPERSONATION_STOP: &str = "impersonation_stop";
pub const ACTION_TENANT_CREATED: &str = "tenant_created";

/// Append-only audit trail of privileged actions.
pub struct AuditService {
    pool: PgPool,
}

impl AuditService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record(
        &self,
        action: &str,
        admin_id: Option<i64>,
        impersonator_id: Option<i64>,
        tenant_id: Option<i64>,
        details: serde_json::Value,
    ) -> Result<AdminAuditLog, StoreError> {
        let entry = sqlx::query_as::<_, AdminAuditLog>(
            r#"
            INSERT INTO admin_audit_logs (action, admin_id, impersonator_id, tenant_id, details)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, action, admin_id, impersonator_id, tenant_id, details, created_at
            "#,
        )
        .bind(action)
        .bind(admin_id)
        .bind(impersonator_id)
        .bind(tenant_id)
        .bind(details)
        .fetch_one(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Recent entries for an action, newest first.
    pub async fn list_by_action(
        &self,
        action: &str,
        limit: i64,
    ) -> Result<Vec<AdminAuditLog>, StoreError> {
        let entries = sqlx::query_as::<_, AdminAuditLog>(
            r#"
            SELECT id, action, admin_id, impersonator_id, tenant_id, details, created_at
            FROM admin_audit_logs
            WHERE action = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(action)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
