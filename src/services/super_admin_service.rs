use sqlx::PgPool;
use tracing::info;

use super::StoreError;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::AuthError;
use crate::config::SecurityConfig;
use crate::db::models::SuperAdmin;

/// Global operator identities, outside any tenant.
pub struct SuperAdminService {
    pool: PgPool,
}

impl SuperAdminService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Verify super-admin credentials. Unknown email and wrong password
    /// are indistinguishable to the caller.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SuperAdmin, StoreError> {
        let admin = sqlx::query_as::<_, SuperAdmin>(
            r#"
            SELECT id, email, name, password_hash, created_at
            FROM super_admins
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(admin) = admin {
            if verify_password(password, &admin.password_hash)? {
                return Ok(admin);
            }
        }

        Err(AuthError::InvalidCredentials.into())
    }

    pub async fn get(&self, id: i64) -> Result<Option<SuperAdmin>, StoreError> {
        let admin = sqlx::query_as::<_, SuperAdmin>(
            r#"
            SELECT id, email, name, password_hash, created_at
            FROM super_admins
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(admin)
    }

    /// Idempotently seed the super-admin from environment configuration.
    /// Re-running with the same email is a no-op.
    pub async fn seed_from_config(&self, security: &SecurityConfig) -> Result<bool, StoreError> {
        let (email, password) = match (
            security.super_admin_email.as_deref(),
            security.super_admin_password.as_deref(),
        ) {
            (Some(email), Some(password)) => (email, password),
            _ => {
                info!("SUPER_ADMIN_EMAIL/SUPER_ADMIN_PASSWORD not set, skipping seed");
                return Ok(false);
            }
        };
        let name = security.super_admin_name.as_deref().unwrap_or("Super Admin");

        let password_hash = hash_password(password)?;
        let result = sqlx::query(
            r#"
            INSERT INTO super_admins (email, name, password_hash)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(email)
        .bind(name)
        .bind(&password_hash)
        .execute(&self.pool)
        .await?;

        let created = result.rows_affected() > 0;
        if created {
            info!("Seeded super-admin {}", email);
        }
        Ok(created)
    }
}
