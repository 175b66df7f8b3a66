use sqlx::PgPool;

use super::{is_unique_violation, StoreError};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::{AuthError, Role};
use crate::db::models::{Tenant, User, UserPublic};

/// Tenant-scoped user records and credential verification.
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a user under `tenant_id`, storing an Argon2id hash.
    ///
    /// Email uniqueness is enforced per tenant by a unique index; a
    /// violation surfaces as `DuplicateEmail`.
    pub async fn create_user(
        &self,
        tenant_id: i64,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<UserPublic, StoreError> {
        let password_hash = hash_password(password)?;

        let user = sqlx::query_as::<_, UserPublic>(
            r#"
            INSERT INTO users (tenant_id, name, email, password_hash, role, status)
            VALUES ($1, $2, $3, $4, $5, 'active')
            RETURNING id, tenant_id, name, email, role, status, created_at
            "#,
        )
        .bind(tenant_id)
        .bind(name)
        .bind(email)
        .bind(&password_hash)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateEmail(email.to_string())
            } else {
                StoreError::Sqlx(e)
            }
        })?;

        Ok(user)
    }

    /// Resolve (user, tenant) for an email/password pair.
    ///
    /// Emails are unique per tenant, not globally, so the same address
    /// may exist under several tenants; the password decides which row
    /// authenticates. Rows under suspended tenants are excluded up
    /// front, so a duplicate under a suspended tenant can never shadow
    /// the same credentials under an active one. Unknown email and
    /// wrong password both collapse into `InvalidCredentials`.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(User, Tenant), StoreError> {
        let rows = sqlx::query_as::<_, CandidateRow>(CANDIDATE_SQL)
            .bind(email)
            .fetch_all(&self.pool)
            .await?;

        first_password_match(rows.into_iter().map(CandidateRow::into_pair), password)
    }

    /// List users belonging to `tenant_id` only. Callers must pass the
    /// tenant from the verified request context, never from the body.
    pub async fn list_users(&self, tenant_id: i64) -> Result<Vec<UserPublic>, StoreError> {
        let users = sqlx::query_as::<_, UserPublic>(
            r#"
            SELECT id, tenant_id, name, email, role, status, created_at
            FROM users
            WHERE tenant_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}

/// Login candidates: active users joined with their active tenant,
/// ordered by user id so ties resolve the same way on every run.
const CANDIDATE_SQL: &str = r#"
    SELECT u.id, u.tenant_id, u.name, u.email, u.password_hash, u.role, u.status, u.created_at,
           t.name                 AS tenant_name,
           t.slug                 AS tenant_slug,
           t.bolna_sub_account_id AS tenant_bolna_sub_account_id,
           t.plan                 AS tenant_plan,
           t.status               AS tenant_status,
           t.settings             AS tenant_settings,
           t.created_at           AS tenant_created_at
    FROM users u
    JOIN tenants t ON t.id = u.tenant_id AND t.status = 'active'
    WHERE lower(u.email) = lower($1) AND u.status = 'active'
    ORDER BY u.id
"#;

#[derive(sqlx::FromRow)]
struct CandidateRow {
    id: i64,
    tenant_id: i64,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    status: String,
    created_at: chrono::DateTime<chrono::Utc>,
    tenant_name: String,
    tenant_slug: String,
    tenant_bolna_sub_account_id: Option<String>,
    tenant_plan: String,
    tenant_status: String,
    tenant_settings: serde_json::Value,
    tenant_created_at: chrono::DateTime<chrono::Utc>,
}

impl CandidateRow {
    fn into_pair(self) -> (User, Tenant) {
        (
            User {
                id: self.id,
                tenant_id: self.tenant_id,
                name: self.name,
                email: self.email,
                password_hash: self.password_hash,
                role: self.role,
                status: self.status,
                created_at: self.created_at,
            },
            Tenant {
                id: self.tenant_id,
                name: self.tenant_name,
                slug: self.tenant_slug,
                bolna_sub_account_id: self.tenant_bolna_sub_account_id,
                plan: self.tenant_plan,
                status: self.tenant_status,
                settings: self.tenant_settings,
                created_at: self.tenant_created_at,
            },
        )
    }
}

/// First candidate whose stored hash matches `password` wins; a
/// non-matching candidate is skipped, never a reason to stop looking.
fn first_password_match(
    candidates: impl Iterator<Item = (User, Tenant)>,
    password: &str,
) -> Result<(User, Tenant), StoreError> {
    for (user, tenant) in candidates {
        if verify_password(password, &user.password_hash)? {
            return Ok((user, tenant));
        }
    }
    Err(AuthError::InvalidCredentials.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn candidate(user_id: i64, tenant_id: i64, slug: &str, password: &str) -> (User, Tenant) {
        (
            User {
                id: user_id,
                tenant_id,
                name: "Dana".to_string(),
                email: "dana@example.com".to_string(),
                password_hash: hash_password(password).unwrap(),
                role: "admin".to_string(),
                status: "active".to_string(),
                created_at: Utc::now(),
            },
            Tenant {
                id: tenant_id,
                name: slug.to_string(),
                slug: slug.to_string(),
                bolna_sub_account_id: None,
                plan: "starter".to_string(),
                status: "active".to_string(),
                settings: json!({}),
                created_at: Utc::now(),
            },
        )
    }

    #[test]
    fn password_picks_the_row_when_emails_collide() {
        let candidates = vec![
            candidate(1, 10, "acme", "acme-pw"),
            candidate(2, 20, "globex", "globex-pw"),
        ];

        let (user, tenant) = first_password_match(candidates.into_iter(), "globex-pw").unwrap();
        assert_eq!(user.id, 2);
        assert_eq!(tenant.id, 20);
    }

    #[test]
    fn earlier_non_matching_candidate_does_not_end_the_search() {
        // Same password under both tenants, as per-tenant uniqueness
        // allows; order decides, and a skipped first candidate must not
        // fail the login outright.
        let candidates = vec![
            candidate(1, 10, "acme", "shared-pw"),
            candidate(2, 20, "globex", "shared-pw"),
        ];
        let (user, _) = first_password_match(candidates.into_iter(), "shared-pw").unwrap();
        assert_eq!(user.id, 1);

        let only_second_matches = vec![
            candidate(1, 10, "acme", "other-pw"),
            candidate(2, 20, "globex", "shared-pw"),
        ];
        let (user, tenant) =
            first_password_match(only_second_matches.into_iter(), "shared-pw").unwrap();
        assert_eq!(user.id, 2);
        assert_eq!(tenant.slug, "globex");
    }

    #[test]
    fn no_match_is_invalid_credentials() {
        let candidates = vec![candidate(1, 10, "acme", "acme-pw")];
        assert!(matches!(
            first_password_match(candidates.into_iter(), "wrong"),
            Err(StoreError::Auth(AuthError::InvalidCredentials))
        ));
        assert!(matches!(
            first_password_match(std::iter::empty(), "any"),
            Err(StoreError::Auth(AuthError::InvalidCredentials))
        ));
    }

    #[test]
    fn candidate_query_excludes_suspended_tenants_and_is_ordered() {
        // Suspended tenants are filtered in the join, so a duplicate
        // email under one can never shadow the active tenant's row,
        // and the ordering keeps candidate iteration deterministic.
        assert!(CANDIDATE_SQL.contains("t.status = 'active'"));
        assert!(CANDIDATE_SQL.contains("u.status = 'active'"));
        assert!(CANDIDATE_SQL.contains("ORDER BY u.id"));
    }
}
