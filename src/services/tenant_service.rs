use sqlx::PgPool;

use super::{is_unique_violation, StoreError};
use crate::db::models::Tenant;

/// Tenant registry operations, super-admin only.
pub struct TenantService {
    pool: PgPool,
}

impl TenantService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a tenant. Slug and external sub-account id are globally
    /// unique; a violation surfaces as `DuplicateSlug`.
    pub async fn create_tenant(
        &self,
        name: &str,
        slug: &str,
        bolna_sub_account_id: Option<&str>,
        plan: &str,
        settings: serde_json::Value,
    ) -> Result<Tenant, StoreError> {
        validate_slug(slug)?;

        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (name, slug, bolna_sub_account_id, plan, status, settings)
            VALUES ($1, $2, $3, $4, 'active', $5)
            RETURNING id, name, slug, bolna_sub_account_id, plan, status, settings, created_at
            "#,
        )
        .bind(name)
        .bind(slug)
        .bind(bolna_sub_account_id)
        .bind(plan)
        .bind(settings)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateSlug(slug.to_string())
            } else {
                StoreError::Sqlx(e)
            }
        })?;

        Ok(tenant)
    }

    pub async fn get_tenant(&self, id: i64) -> Result<Option<Tenant>, StoreError> {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            SELECT id, name, slug, bolna_sub_account_id, plan, status, settings, created_at
            FROM tenants
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tenant)
    }

    pub async fn list_tenants(&self) -> Result<Vec<Tenant>, StoreError> {
        let tenants = sqlx::query_as::<_, Tenant>(
            r#"
            SELECT id, name, slug, bolna_sub_account_id, plan, status, settings, created_at
            FROM tenants
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tenants)
    }
}

fn validate_slug(slug: &str) -> Result<(), StoreError> {
    let valid = !slug.is_empty()
        && slug.len() <= 64
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !slug.starts_with('-')
        && !slug.ends_with('-');

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidSlug(slug.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_rules() {
        assert!(validate_slug("default").is_ok());
        assert!(validate_slug("acme-corp-2").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("Has-Caps").is_err());
        assert!(validate_slug("-leading").is_err());
        assert!(validate_slug("trailing-").is_err());
        assert!(validate_slug("under_score").is_err());
    }
}
