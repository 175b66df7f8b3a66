pub mod commands;
pub mod session;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "voicedesk")]
#[command(about = "VoiceDesk CLI - administration console for the voice platform backend")]
#[command(version)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "Server base URL (defaults to VOICEDESK_SERVER or http://localhost:3000)"
    )]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run or inspect the multi-tenancy schema migration")]
    Migrate {
        #[command(subcommand)]
        cmd: commands::migrate::MigrateCommands,
    },

    #[command(about = "Seed the super-admin account from environment configuration")]
    Seed,

    #[command(about = "Authentication and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Super-admin tenant impersonation")]
    Impersonate {
        #[command(subcommand)]
        cmd: commands::impersonate::ImpersonateCommands,
    },
}

pub fn resolve_server(arg: &Option<String>) -> String {
    arg.clone()
        .or_else(|| std::env::var("VOICEDESK_SERVER").ok())
        .unwrap_or_else(|| "http://localhost:3000".to_string())
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let server = resolve_server(&cli.server);

    match cli.command {
        Commands::Migrate { cmd } => commands::migrate::handle(cmd).await,
        Commands::Seed => commands::seed::handle().await,
        Commands::Auth { cmd } => commands::auth::handle(cmd, &server).await,
        Commands::Impersonate { cmd } => commands::impersonate::handle(cmd, &server).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_server_wins() {
        assert_eq!(
            resolve_server(&Some("http://api.example.com".to_string())),
            "http://api.example.com"
        );
    }

    #[test]
    fn default_server_is_localhost() {
        if std::env::var("VOICEDESK_SERVER").is_err() {
            assert_eq!(resolve_server(&None), "http://localhost:3000");
        }
    }
}
