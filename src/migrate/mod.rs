//! One-time schema evolution from single-tenant to multi-tenant.
//!
//! The sequence is a linear pipeline of named steps, each classified by
//! how it behaves on re-run. Completed steps are recorded in a
//! checkpoint table so an aborted run resumes after the last completed
//! step instead of redoing the whole sequence.

use sqlx::PgPool;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("migration step '{step}' failed: {source}")]
    StepFailed {
        step: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Idempotency classification of a migration step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// `CREATE ... IF NOT EXISTS` — idempotent by construction.
    PureCreate,
    /// `ALTER TABLE ... ADD COLUMN IF NOT EXISTS` — idempotent by construction.
    GuardedAlter,
    /// Data writes that only target rows not yet migrated.
    ConditionalBackfill,
    /// Constraint additions whose duplicate-object failure is swallowed
    /// rather than aborting the sequence.
    SwallowOnConflict,
}

pub struct MigrationStep {
    pub name: &'static str,
    pub kind: StepKind,
    pub sql: &'static str,
}

/// The multi-tenancy migration, in execution order. Tables are created
/// before foreign keys referencing them; columns are added before they
/// are backfilled; backfills run before constraints that depend on
/// non-null values; the `users` backup precedes any tenancy change to
/// `users`.
pub fn tenancy_steps() -> Vec<MigrationStep> {
    vec![
        MigrationStep {
            name: "create_tenants",
            kind: StepKind::PureCreate,
            sql: r#"
                CREATE TABLE IF NOT EXISTS tenants (
                    id                   BIGSERIAL PRIMARY KEY,
                    name                 TEXT NOT NULL,
                    slug                 TEXT UNIQUE NOT NULL,
                    bolna_sub_account_id TEXT UNIQUE,
                    plan                 TEXT NOT NULL DEFAULT 'starter',
                    status               TEXT NOT NULL DEFAULT 'active',
                    settings             JSONB NOT NULL DEFAULT '{}',
                    created_at           TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
            "#,
        },
        MigrationStep {
            name: "create_super_admins",
            kind: StepKind::PureCreate,
            sql: r#"
                CREATE TABLE IF NOT EXISTS super_admins (
                    id            BIGSERIAL PRIMARY KEY,
                    email         TEXT UNIQUE NOT NULL,
                    name          TEXT NOT NULL,
                    password_hash TEXT NOT NULL,
                    created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
            "#,
        },
        MigrationStep {
            name: "create_admin_audit_logs",
            kind: StepKind::PureCreate,
            sql: r#"
                CREATE TABLE IF NOT EXISTS admin_audit_logs (
                    id              BIGSERIAL PRIMARY KEY,
                    action          TEXT NOT NULL,
                    admin_id        BIGINT,
                    impersonator_id BIGINT,
                    tenant_id       BIGINT,
                    details         JSONB NOT NULL DEFAULT '{}',
                    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
            "#,
        },
        // Pre-tenancy shape: fresh installs get the legacy table, which
        // the steps below then upgrade like any existing deployment.
        MigrationStep {
            name: "create_users",
            kind: StepKind::PureCreate,
            sql: r#"
                CREATE TABLE IF NOT EXISTS users (
                    id            BIGSERIAL PRIMARY KEY,
                    name          TEXT NOT NULL,
                    email         TEXT NOT NULL,
                    password_hash TEXT NOT NULL,
                    role          TEXT NOT NULL DEFAULT 'agent',
                    status        TEXT NOT NULL DEFAULT 'active',
                    created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
            "#,
        },
        MigrationStep {
            name: "backup_users_pre_tenancy",
            kind: StepKind::PureCreate,
            sql: r#"
                CREATE TABLE IF NOT EXISTS users_backup_pre_tenancy AS
                SELECT * FROM users
            "#,
        },
        MigrationStep {
            name: "add_users_tenant_id",
            kind: StepKind::GuardedAlter,
            sql: "ALTER TABLE users ADD COLUMN IF NOT EXISTS tenant_id BIGINT",
        },
        MigrationStep {
            name: "seed_default_tenant",
            kind: StepKind::ConditionalBackfill,
            sql: r#"
                INSERT INTO tenants (name, slug)
                VALUES ('Default Company', 'default')
                ON CONFLICT (slug) DO NOTHING
            "#,
        },
        MigrationStep {
            name: "backfill_users_tenant_id",
            kind: StepKind::ConditionalBackfill,
            sql: r#"
                UPDATE users
                SET tenant_id = (SELECT id FROM tenants WHERE slug = 'default')
                WHERE tenant_id IS NULL
            "#,
        },
        MigrationStep {
            name: "users_tenant_id_fkey",
            kind: StepKind::SwallowOnConflict,
            sql: r#"
                ALTER TABLE users
                ADD CONSTRAINT users_tenant_id_fkey
                FOREIGN KEY (tenant_id) REFERENCES tenants (id)
            "#,
        },
        MigrationStep {
            name: "users_tenant_id_not_null",
            kind: StepKind::SwallowOnConflict,
            sql: "ALTER TABLE users ALTER COLUMN tenant_id SET NOT NULL",
        },
        MigrationStep {
            name: "users_tenant_email_unique",
            kind: StepKind::PureCreate,
            sql: r#"
                CREATE UNIQUE INDEX IF NOT EXISTS users_tenant_email_key
                ON users (tenant_id, lower(email))
            "#,
        },
    ]
}

#[derive(Debug, Default)]
pub struct MigrationReport {
    pub applied: Vec<&'static str>,
    pub skipped: Vec<&'static str>,
    pub swallowed: Vec<&'static str>,
}

#[derive(Debug)]
pub struct StepStatus {
    pub name: &'static str,
    pub kind: StepKind,
    pub applied: bool,
}

pub struct MigrationRunner {
    pool: PgPool,
}

impl MigrationRunner {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Execute all steps not yet recorded in the checkpoint table.
    ///
    /// A failing step aborts the remainder unless it is classified
    /// swallow-on-conflict, in which case the failure is logged and the
    /// step is checkpointed as done. No transactional all-or-nothing
    /// guarantee: completed steps stay completed.
    pub async fn run(&self) -> Result<MigrationReport, MigrationError> {
        self.ensure_checkpoint_table().await?;
        let done = self.applied_steps().await?;

        let mut report = MigrationReport::default();
        for step in tenancy_steps() {
            if done.contains(&step.name.to_string()) {
                report.skipped.push(step.name);
                continue;
            }

            info!(step = step.name, "Applying migration step");
            match sqlx::query(step.sql).execute(&self.pool).await {
                Ok(_) => {
                    self.checkpoint(step.name).await?;
                    report.applied.push(step.name);
                }
                Err(e) if step.kind == StepKind::SwallowOnConflict => {
                    warn!(step = step.name, error = %e, "Step failed, swallowed by classification");
                    self.checkpoint(step.name).await?;
                    report.swallowed.push(step.name);
                }
                Err(e) => {
                    error!(step = step.name, statement = step.sql, error = %e, "Migration aborted");
                    return Err(MigrationError::StepFailed {
                        step: step.name,
                        source: e,
                    });
                }
            }
        }

        info!(
            applied = report.applied.len(),
            skipped = report.skipped.len(),
            swallowed = report.swallowed.len(),
            "Migration complete"
        );
        Ok(report)
    }

    /// Per-step applied/pending view without executing anything.
    pub async fn status(&self) -> Result<Vec<StepStatus>, MigrationError> {
        self.ensure_checkpoint_table().await?;
        let done = self.applied_steps().await?;

        Ok(tenancy_steps()
            .into_iter()
            .map(|step| StepStatus {
                name: step.name,
                kind: step.kind,
                applied: done.contains(&step.name.to_string()),
            })
            .collect())
    }

    async fn ensure_checkpoint_table(&self) -> Result<(), MigrationError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS schema_migration_steps (
                name       TEXT PRIMARY KEY,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn applied_steps(&self) -> Result<Vec<String>, MigrationError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM schema_migration_steps ORDER BY applied_at")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    async fn checkpoint(&self, name: &str) -> Result<(), MigrationError> {
        sqlx::query(
            "INSERT INTO schema_migration_steps (name) VALUES ($1) ON CONFLICT (name) DO NOTHING",
        )
        .bind(name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(steps: &[MigrationStep], name: &str) -> usize {
        steps
            .iter()
            .position(|s| s.name == name)
            .unwrap_or_else(|| panic!("missing step {}", name))
    }

    #[test]
    fn step_names_are_unique() {
        let steps = tenancy_steps();
        let mut names: Vec<_> = steps.iter().map(|s| s.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), steps.len());
    }

    #[test]
    fn backup_precedes_tenancy_changes_to_users() {
        let steps = tenancy_steps();
        assert!(
            index_of(&steps, "backup_users_pre_tenancy") < index_of(&steps, "add_users_tenant_id")
        );
    }

    #[test]
    fn column_exists_before_backfill_and_backfill_before_constraints() {
        let steps = tenancy_steps();
        let add = index_of(&steps, "add_users_tenant_id");
        let seed = index_of(&steps, "seed_default_tenant");
        let backfill = index_of(&steps, "backfill_users_tenant_id");
        let fk = index_of(&steps, "users_tenant_id_fkey");
        let not_null = index_of(&steps, "users_tenant_id_not_null");

        assert!(add < backfill);
        assert!(seed < backfill);
        assert!(backfill < fk);
        assert!(backfill < not_null);
    }

    #[test]
    fn referenced_tables_are_created_before_foreign_keys() {
        let steps = tenancy_steps();
        assert!(index_of(&steps, "create_tenants") < index_of(&steps, "users_tenant_id_fkey"));
    }

    #[test]
    fn classifications_match_statement_shape() {
        for step in tenancy_steps() {
            let sql = step.sql.to_uppercase();
            match step.kind {
                StepKind::PureCreate => assert!(
                    sql.contains("IF NOT EXISTS"),
                    "{} must be guarded",
                    step.name
                ),
                StepKind::GuardedAlter => assert!(
                    sql.contains("ADD COLUMN IF NOT EXISTS"),
                    "{} must be guarded",
                    step.name
                ),
                StepKind::ConditionalBackfill => assert!(
                    sql.contains("IS NULL") || sql.contains("ON CONFLICT"),
                    "{} must only target unmigrated rows",
                    step.name
                ),
                // Not statement-guarded; the runner swallows the failure.
                StepKind::SwallowOnConflict => {}
            }
        }
    }
}
