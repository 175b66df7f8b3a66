use clap::Subcommand;
use serde_json::json;

use super::{get_json, password_or_prompt, post_json};
use crate::cli::session::{default_session_path, SessionStore, StoredSession};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login as a tenant user")]
    Login {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Login as the super-admin")]
    SuperLogin {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Show the verified identity behind the current token")]
    Whoami,

    #[command(about = "Show stored session state")]
    Status,

    #[command(about = "Discard all stored sessions")]
    Logout,
}

pub async fn handle(cmd: AuthCommands, server: &str) -> anyhow::Result<()> {
    let path = default_session_path()?;
    let mut store = SessionStore::load(&path)?;

    match cmd {
        AuthCommands::Login { email, password } => {
            let password = password_or_prompt(password)?;
            let data = post_json(
                &format!("{}/api/auth/login", server),
                None,
                json!({"email": email, "password": password}),
            )
            .await?;

            let token = data
                .get("token")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow::anyhow!("no token in login response"))?;
            let tenant = data
                .pointer("/tenant/slug")
                .and_then(|s| s.as_str())
                .unwrap_or("?");

            store.set_current(StoredSession::new(
                token.to_string(),
                format!("{} @ {}", email, tenant),
            ));
            store.save(&path)?;
            println!("Logged in as {} (tenant: {})", email, tenant);
        }

        AuthCommands::SuperLogin { email, password } => {
            let password = password_or_prompt(password)?;
            let data = post_json(
                &format!("{}/api/super-admin/login", server),
                None,
                json!({"email": email, "password": password}),
            )
            .await?;

            let token = data
                .get("token")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow::anyhow!("no token in login response"))?;

            store.set_current(StoredSession::new(
                token.to_string(),
                format!("super-admin {}", email),
            ));
            store.save(&path)?;
            println!("Logged in as super-admin {}", email);
        }

        AuthCommands::Whoami => {
            let session = store.current()?;
            let data = get_json(&format!("{}/api/auth/whoami", server), &session.token).await?;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }

        AuthCommands::Status => {
            match &store.current {
                Some(session) => println!("Current session: {}", session.label),
                None => println!("Not logged in"),
            }
            if let Some(saved) = &store.saved {
                println!("Saved session:   {} (restored on `impersonate stop`)", saved.label);
            }
        }

        AuthCommands::Logout => {
            store.logout();
            store.save(&path)?;
            println!("Logged out");
        }
    }

    Ok(())
}
