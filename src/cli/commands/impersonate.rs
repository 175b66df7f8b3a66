use clap::Subcommand;
use serde_json::json;

use super::post_json;
use crate::cli::session::{default_session_path, SessionError, SessionStore, StoredSession};

#[derive(Subcommand)]
pub enum ImpersonateCommands {
    #[command(about = "Start impersonating a tenant (super-admin only)")]
    Start {
        #[arg(help = "Target tenant id")]
        tenant_id: i64,
    },

    #[command(about = "Stop impersonating and restore the saved super-admin session")]
    Stop,
}

pub async fn handle(cmd: ImpersonateCommands, server: &str) -> anyhow::Result<()> {
    let path = default_session_path()?;
    let mut store = SessionStore::load(&path)?;

    match cmd {
        ImpersonateCommands::Start { tenant_id } => {
            let session = store.current()?;
            let data = post_json(
                &format!("{}/api/super-admin/impersonation/start", server),
                Some(&session.token),
                json!({"tenant_id": tenant_id}),
            )
            .await?;

            let token = data
                .get("token")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow::anyhow!("no token in impersonation response"))?;
            let slug = data
                .pointer("/tenant/slug")
                .and_then(|s| s.as_str())
                .unwrap_or("?");

            store.push_impersonation(StoredSession::new(
                token.to_string(),
                format!("impersonating tenant {} ({})", tenant_id, slug),
            ))?;
            store.save(&path)?;
            println!("Impersonating tenant {} ({})", tenant_id, slug);
        }

        ImpersonateCommands::Stop => {
            // Fire-and-forget notification: the server records the stop
            // for the audit trail, but a failure must not block the
            // local session restore.
            if let Ok(session) = store.current() {
                let result = post_json(
                    &format!("{}/api/super-admin/impersonation/stop", server),
                    Some(&session.token),
                    json!({}),
                )
                .await;
                if let Err(e) = result {
                    eprintln!("warning: server stop notification failed: {}", e);
                }
            }

            match store.pop_impersonation() {
                Ok(restored) => {
                    println!("Restored session: {}", restored.label);
                }
                Err(SessionError::NoSavedSession) => {
                    println!("No saved session to restore; please log in again");
                }
                Err(e) => return Err(e.into()),
            }
            store.save(&path)?;
        }
    }

    Ok(())
}
