//! Thin forwarding client for the external Bolna voice platform.
//!
//! Pass-through semantics only: the tenant's API key goes out as a
//! bearer header, JSON bodies are forwarded untouched, and a
//! non-success upstream status surfaces as `UpstreamError::Api`
//! carrying the upstream body text. No retry, no caching, no backoff.

use reqwest::Method;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::config::BolnaConfig;
use crate::db::models::Tenant;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("voice platform returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("voice platform unreachable: {0}")]
    Transport(String),

    #[error("no voice platform API key configured")]
    MissingApiKey,
}

pub struct BolnaClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl BolnaClient {
    /// Build a client scoped to `tenant`: the tenant's own key from
    /// `settings.bolna_api_key` wins over the server-wide fallback.
    pub fn for_tenant(config: &BolnaConfig, tenant: &Tenant) -> Result<Self, UpstreamError> {
        let api_key = tenant
            .bolna_api_key()
            .map(str::to_string)
            .or_else(|| config.api_key.clone())
            .ok_or(UpstreamError::MissingApiKey)?;

        Ok(Self::new(&config.api_base, api_key, config.request_timeout_secs))
    }

    pub fn new(base_url: &str, api_key: String, timeout_secs: u64) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub async fn make_call(&self, payload: Value) -> Result<Value, UpstreamError> {
        self.request(Method::POST, "/call", Some(payload)).await
    }

    pub async fn stop_call(&self, execution_id: &str) -> Result<Value, UpstreamError> {
        let path = format!("/call/{}/stop", execution_id);
        self.request(Method::POST, &path, None).await
    }

    pub async fn list_agents(&self) -> Result<Value, UpstreamError> {
        self.request(Method::GET, "/v2/agent/all", None).await
    }

    pub async fn list_batches(&self) -> Result<Value, UpstreamError> {
        self.request(Method::GET, "/batches/all", None).await
    }

    pub async fn list_voices(&self) -> Result<Value, UpstreamError> {
        self.request(Method::GET, "/me/voices", None).await
    }

    pub async fn add_custom_model(&self, payload: Value) -> Result<Value, UpstreamError> {
        self.request(Method::POST, "/me/models", Some(payload)).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, UpstreamError> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self
            .http
            .request(method, &url)
            .bearer_auth(&self.api_key);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(UpstreamError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        // Some endpoints reply with an empty body on success.
        if text.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| UpstreamError::Transport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn tenant_with_settings(settings: serde_json::Value) -> Tenant {
        Tenant {
            id: 1,
            name: "Acme".to_string(),
            slug: "acme".to_string(),
            bolna_sub_account_id: Some("sub-1".to_string()),
            plan: "starter".to_string(),
            status: "active".to_string(),
            settings,
            created_at: Utc::now(),
        }
    }

    fn config(api_key: Option<&str>) -> BolnaConfig {
        BolnaConfig {
            api_base: "https://api.bolna.ai/".to_string(),
            api_key: api_key.map(str::to_string),
            request_timeout_secs: 5,
        }
    }

    #[test]
    fn tenant_key_wins_over_server_fallback() {
        let tenant = tenant_with_settings(json!({"bolna_api_key": "tenant-key"}));
        let client = BolnaClient::for_tenant(&config(Some("server-key")), &tenant).unwrap();
        assert_eq!(client.api_key, "tenant-key");
    }

    #[test]
    fn server_key_is_the_fallback() {
        let tenant = tenant_with_settings(json!({}));
        let client = BolnaClient::for_tenant(&config(Some("server-key")), &tenant).unwrap();
        assert_eq!(client.api_key, "server-key");
    }

    #[test]
    fn missing_key_is_an_error() {
        let tenant = tenant_with_settings(json!({}));
        assert!(matches!(
            BolnaClient::for_tenant(&config(None), &tenant),
            Err(UpstreamError::MissingApiKey)
        ));
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = BolnaClient::new("https://api.bolna.ai/", "k".to_string(), 5);
        assert_eq!(client.base_url, "https://api.bolna.ai");
    }
}
