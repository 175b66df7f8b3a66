use crate::config;
use crate::db;
use crate::services::SuperAdminService;

/// Idempotently create the super-admin from SUPER_ADMIN_EMAIL,
/// SUPER_ADMIN_PASSWORD, and SUPER_ADMIN_NAME.
pub async fn handle() -> anyhow::Result<()> {
    let config = config::config();
    let pool = db::connect(&config.database).await?;

    let created = SuperAdminService::new(pool)
        .seed_from_config(&config.security)
        .await?;

    if created {
        println!("Super-admin created");
    } else {
        println!("Super-admin already present or seed variables unset, nothing to do");
    }
    Ok(())
}
