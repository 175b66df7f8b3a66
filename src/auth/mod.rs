pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;

const TOKEN_ISSUER: &str = "voicedesk-api";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("token expired")]
    TokenExpired,
    #[error("token invalid: {0}")]
    TokenInvalid(String),
    #[error("crypto error: {0}")]
    Crypto(String),
}

/// User role within a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Agent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Agent => "agent",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            "agent" => Some(Role::Agent),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityKind {
    User,
    SuperAdmin,
}

/// The identity a token is issued for.
///
/// An impersonation token is a super-admin acting as a tenant admin:
/// the subject stays the super-admin so every downstream action remains
/// attributable, while `tenant_id` scopes data access to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    User {
        user_id: i64,
        tenant_id: i64,
        role: Role,
    },
    SuperAdmin {
        admin_id: i64,
    },
    Impersonation {
        admin_id: i64,
        tenant_id: i64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id or super-admin id.
    pub sub: i64,
    pub kind: IdentityKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Set while a super-admin is impersonating a tenant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impersonator_id: Option<i64>,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl Claims {
    fn new(identity: Identity, ttl_secs: i64) -> Self {
        let now = Utc::now();
        let (sub, kind, tenant_id, role, impersonator_id) = match identity {
            Identity::User {
                user_id,
                tenant_id,
                role,
            } => (user_id, IdentityKind::User, Some(tenant_id), Some(role), None),
            Identity::SuperAdmin { admin_id } => {
                (admin_id, IdentityKind::SuperAdmin, None, None, None)
            }
            // Role is fixed to admin for the duration of an impersonation.
            Identity::Impersonation {
                admin_id,
                tenant_id,
            } => (
                admin_id,
                IdentityKind::SuperAdmin,
                Some(tenant_id),
                Some(Role::Admin),
                Some(admin_id),
            ),
        };

        Self {
            sub,
            kind,
            tenant_id,
            role,
            impersonator_id,
            iss: TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl_secs)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    pub fn is_impersonating(&self) -> bool {
        self.impersonator_id.is_some()
    }

    /// Recover the issued identity from verified claims.
    pub fn identity(&self) -> Identity {
        match (self.kind, self.tenant_id, self.impersonator_id) {
            (IdentityKind::SuperAdmin, Some(tenant_id), Some(admin_id)) => {
                Identity::Impersonation {
                    admin_id,
                    tenant_id,
                }
            }
            (IdentityKind::SuperAdmin, _, _) => Identity::SuperAdmin { admin_id: self.sub },
            (IdentityKind::User, tenant_id, _) => Identity::User {
                user_id: self.sub,
                tenant_id: tenant_id.unwrap_or_default(),
                role: self.role.unwrap_or(Role::Agent),
            },
        }
    }
}

/// Issue a signed HS256 token for `identity`, valid for `ttl_secs`.
pub fn issue_token_with(identity: Identity, secret: &str, ttl_secs: i64) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::Crypto("JWT secret not configured".to_string()));
    }

    let claims = Claims::new(identity, ttl_secs);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Crypto(format!("JWT encode: {}", e)))
}

/// Decode and verify a token (signature, expiry with zero leeway, issuer).
pub fn verify_token_with(token: &str, secret: &str) -> Result<Claims, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::Crypto("JWT secret not configured".to_string()));
    }

    let mut validation = Validation::default();
    validation.leeway = 0;
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss"]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::TokenInvalid(e.to_string()),
    })
}

/// Issue a token using the configured secret and expiry.
pub fn issue_token(identity: Identity) -> Result<String, AuthError> {
    let security = &config::config().security;
    issue_token_with(
        identity,
        &security.jwt_secret,
        security.jwt_expiry_hours as i64 * 3600,
    )
}

/// Verify a token using the configured secret.
pub fn verify_token(token: &str) -> Result<Claims, AuthError> {
    verify_token_with(token, &config::config().security.jwt_secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn user_token_roundtrip() {
        let identity = Identity::User {
            user_id: 7,
            tenant_id: 1,
            role: Role::Admin,
        };
        let token = issue_token_with(identity, SECRET, 3600).unwrap();
        let claims = verify_token_with(&token, SECRET).unwrap();

        assert_eq!(claims.identity(), identity);
        assert_eq!(claims.kind, IdentityKind::User);
        assert_eq!(claims.tenant_id, Some(1));
        assert_eq!(claims.role, Some(Role::Admin));
        assert!(!claims.is_impersonating());
    }

    #[test]
    fn super_admin_token_has_no_tenant() {
        let token = issue_token_with(Identity::SuperAdmin { admin_id: 3 }, SECRET, 3600).unwrap();
        let claims = verify_token_with(&token, SECRET).unwrap();

        assert_eq!(claims.identity(), Identity::SuperAdmin { admin_id: 3 });
        assert_eq!(claims.tenant_id, None);
    }

    #[test]
    fn impersonation_token_carries_both_parties() {
        let identity = Identity::Impersonation {
            admin_id: 3,
            tenant_id: 2,
        };
        let token = issue_token_with(identity, SECRET, 3600).unwrap();
        let claims = verify_token_with(&token, SECRET).unwrap();

        assert!(claims.is_impersonating());
        assert_eq!(claims.impersonator_id, Some(3));
        assert_eq!(claims.tenant_id, Some(2));
        assert_eq!(claims.role, Some(Role::Admin));
        assert_eq!(claims.identity(), identity);
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        let token =
            issue_token_with(Identity::SuperAdmin { admin_id: 1 }, SECRET, -60).unwrap();
        match verify_token_with(&token, SECRET) {
            Err(AuthError::TokenExpired) => {}
            other => panic!("expected TokenExpired, got {:?}", other),
        }
    }

    #[test]
    fn tampered_token_is_invalid() {
        let token = issue_token_with(Identity::SuperAdmin { admin_id: 1 }, SECRET, 3600).unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(if token.ends_with('A') { 'B' } else { 'A' });

        match verify_token_with(&tampered, SECRET) {
            Err(AuthError::TokenInvalid(_)) => {}
            other => panic!("expected TokenInvalid, got {:?}", other),
        }
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = issue_token_with(Identity::SuperAdmin { admin_id: 1 }, SECRET, 3600).unwrap();
        assert!(matches!(
            verify_token_with(&token, "other-secret"),
            Err(AuthError::TokenInvalid(_))
        ));
    }

    #[test]
    fn role_parse_roundtrip() {
        for role in [Role::Admin, Role::Manager, Role::Agent] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("root"), None);
    }
}
