use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub bolna: BolnaConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub enable_cors: bool,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string, required at runtime.
    pub url: String,
    /// Force TLS on the database connection.
    pub ssl: bool,
    /// When false, accept the server certificate without verification
    /// (managed Postgres providers with self-signed chains).
    pub ssl_reject_unauthorized: bool,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub super_admin_email: Option<String>,
    pub super_admin_password: Option<String>,
    pub super_admin_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BolnaConfig {
    /// Base URL of the external voice platform API.
    pub api_base: String,
    /// Server-wide fallback API key; tenants may carry their own key
    /// in `settings.bolna_api_key`.
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Environment defaults first, then specific env vars on top.
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_SSL") {
            self.database.ssl = v.parse().unwrap_or(self.database.ssl);
        }
        if let Ok(v) = env::var("DATABASE_SSL_REJECT_UNAUTHORIZED") {
            self.database.ssl_reject_unauthorized =
                v.parse().unwrap_or(self.database.ssl_reject_unauthorized);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }

        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SUPER_ADMIN_EMAIL") {
            self.security.super_admin_email = Some(v);
        }
        if let Ok(v) = env::var("SUPER_ADMIN_PASSWORD") {
            self.security.super_admin_password = Some(v);
        }
        if let Ok(v) = env::var("SUPER_ADMIN_NAME") {
            self.security.super_admin_name = Some(v);
        }

        if let Ok(v) = env::var("BOLNA_API_BASE") {
            self.bolna.api_base = v;
        }
        if let Ok(v) = env::var("BOLNA_API_KEY") {
            self.bolna.api_key = Some(v);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 3000,
                enable_cors: true,
                enable_request_logging: true,
            },
            database: DatabaseConfig {
                url: String::new(),
                ssl: false,
                ssl_reject_unauthorized: true,
                max_connections: 10,
                connect_timeout_secs: 30,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7,
                super_admin_email: None,
                super_admin_password: None,
                super_admin_name: None,
            },
            bolna: BolnaConfig {
                api_base: "https://api.bolna.ai".to_string(),
                api_key: None,
                request_timeout_secs: 30,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 3000,
                enable_cors: true,
                enable_request_logging: true,
            },
            database: DatabaseConfig {
                ssl: true,
                max_connections: 20,
                connect_timeout_secs: 10,
                ..Self::development().database
            },
            security: SecurityConfig {
                jwt_expiry_hours: 24,
                ..Self::development().security
            },
            bolna: Self::development().bolna,
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 3000,
                enable_cors: true,
                enable_request_logging: false,
            },
            database: DatabaseConfig {
                ssl: true,
                max_connections: 50,
                connect_timeout_secs: 5,
                ..Self::development().database
            },
            security: SecurityConfig {
                jwt_expiry_hours: 12,
                ..Self::development().security
            },
            bolna: Self::development().bolna,
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 3000);
        assert!(!config.database.ssl);
        assert_eq!(config.security.jwt_expiry_hours, 24 * 7);
        assert_eq!(config.bolna.api_base, "https://api.bolna.ai");
    }

    #[test]
    fn production_tightens_database_and_tokens() {
        let config = AppConfig::production();
        assert!(config.database.ssl);
        assert!(config.database.ssl_reject_unauthorized);
        assert_eq!(config.security.jwt_expiry_hours, 12);
        assert!(!config.server.enable_request_logging);
    }
}
