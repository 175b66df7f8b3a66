use voicedesk_api::{config, db, server, services};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting VoiceDesk API in {:?} mode", config.environment);

    let pool = db::init(&config.database)
        .await
        .unwrap_or_else(|e| panic!("failed to connect database: {}", e));

    // Idempotent: a no-op when the super-admin already exists or the
    // env vars are unset. Requires `voicedesk migrate run` to have
    // created the tables.
    if let Err(e) = services::SuperAdminService::new(pool)
        .seed_from_config(&config.security)
        .await
    {
        tracing::warn!("Super-admin seeding skipped: {}", e);
    }

    let app = server::app();

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("VoiceDesk API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
