use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Append-only record of privileged actions. Never mutated after insert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AdminAuditLog {
    pub id: i64,
    pub action: String,
    pub admin_id: Option<i64>,
    pub impersonator_id: Option<i64>,
    pub tenant_id: Option<i64>,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
