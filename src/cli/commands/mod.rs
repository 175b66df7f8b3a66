pub mod auth;
pub mod impersonate;
pub mod migrate;
pub mod seed;

use anyhow::{bail, Context};
use serde_json::Value;

/// POST a JSON body and unwrap the `{"success": true, "data": ...}`
/// envelope, turning error envelopes into readable failures.
pub(crate) async fn post_json(
    url: &str,
    token: Option<&str>,
    body: Value,
) -> anyhow::Result<Value> {
    let client = reqwest::Client::new();
    let mut request = client.post(url).json(&body);
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }

    let response = request.send().await.context("request failed")?;
    unwrap_envelope(response).await
}

pub(crate) async fn get_json(url: &str, token: &str) -> anyhow::Result<Value> {
    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .bearer_auth(token)
        .send()
        .await
        .context("request failed")?;
    unwrap_envelope(response).await
}

async fn unwrap_envelope(response: reqwest::Response) -> anyhow::Result<Value> {
    let status = response.status();
    let body: Value = response.json().await.context("invalid JSON response")?;

    if !status.is_success() {
        let message = body
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown error");
        bail!("server returned {}: {}", status, message);
    }

    Ok(body.get("data").cloned().unwrap_or(body))
}

/// Read a password from the terminal when not passed as a flag.
pub(crate) fn password_or_prompt(password: Option<String>) -> anyhow::Result<String> {
    use std::io::{BufRead, Write};

    if let Some(password) = password {
        return Ok(password);
    }

    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
