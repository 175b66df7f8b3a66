use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub bolna_sub_account_id: Option<String>,
    pub plan: String,
    pub status: String,
    pub settings: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }

    /// Tenant-scoped voice platform API key, if one is configured.
    pub fn bolna_api_key(&self) -> Option<&str> {
        self.settings.get("bolna_api_key").and_then(|v| v.as_str())
    }
}
