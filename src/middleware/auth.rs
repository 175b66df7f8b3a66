use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{self, Claims, IdentityKind, Role};

use crate::error::ApiError;

/// Authenticated identity extracted from a verified bearer token.
///
/// Handlers must take the acting tenant from here and never from the
/// request body or path; that is the tenant-isolation invariant.
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub id: i64,
    pub kind: IdentityKind,
    pub tenant_id: Option<i64>,
    pub role: Option<Role>,
    pub impersonator_id: Option<i64>,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            kind: claims.kind,
            tenant_id: claims.tenant_id,
            role: claims.role,
            impersonator_id: claims.impersonator_id,
        }
    }
}

impl AuthContext {
    pub fn is_impersonating(&self) -> bool {
        self.impersonator_id.is_some()
    }

    /// The tenant this request is scoped to, failing for identities
    /// without one (a super-admin outside impersonation).
    pub fn require_tenant(&self) -> Result<i64, ApiError> {
        self.tenant_id
            .ok_or_else(|| ApiError::forbidden("This endpoint requires a tenant-scoped identity"))
    }

    /// Require a plain super-admin token (not impersonating).
    pub fn require_super_admin(&self) -> Result<i64, ApiError> {
        if self.kind != IdentityKind::SuperAdmin {
            return Err(ApiError::forbidden("Super-admin access required"));
        }
        if self.is_impersonating() {
            return Err(ApiError::forbidden(
                "Stop the active impersonation before performing super-admin actions",
            ));
        }
        Ok(self.id)
    }
}

/// Bearer-token authentication middleware.
///
/// Invalid or expired tokens fail the request here with a uniform
/// unauthorized response; handlers behind this layer always find an
/// `AuthContext` in request extensions.
pub async fn bearer_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers).map_err(ApiError::unauthorized)?;
    let claims = auth::verify_token(&token)?;

    request.extensions_mut().insert(AuthContext::from(claims));
    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty bearer token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn rejects_missing_header() {
        assert!(extract_bearer_token(&HeaderMap::new()).is_err());
    }

    #[test]
    fn rejects_non_bearer_scheme() {
        let headers = headers_with("Basic dXNlcjpwdw==");
        assert!(extract_bearer_token(&headers).is_err());
    }

    #[test]
    fn rejects_empty_token() {
        let headers = headers_with("Bearer   ");
        assert!(extract_bearer_token(&headers).is_err());
    }

    #[test]
    fn super_admin_checks() {
        let ctx = AuthContext {
            id: 3,
            kind: IdentityKind::SuperAdmin,
            tenant_id: None,
            role: None,
            impersonator_id: None,
        };
        assert_eq!(ctx.require_super_admin().unwrap(), 3);
        assert!(ctx.require_tenant().is_err());

        let impersonating = AuthContext {
            tenant_id: Some(2),
            role: Some(Role::Admin),
            impersonator_id: Some(3),
            ..ctx
        };
        assert!(impersonating.require_super_admin().is_err());
        assert_eq!(impersonating.require_tenant().unwrap(), 2);
    }

    #[test]
    fn user_context_is_tenant_scoped_only() {
        let ctx = AuthContext {
            id: 7,
            kind: IdentityKind::User,
            tenant_id: Some(1),
            role: Some(Role::Manager),
            impersonator_id: None,
        };
        assert_eq!(ctx.require_tenant().unwrap(), 1);
        assert!(ctx.require_super_admin().is_err());
    }
}
