// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (unique-constraint violations)
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (external voice platform returned a failure)
    BadGateway(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError(_) => 500,
            ApiError::BadGateway(_) => 502,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::BadGateway(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway(_) => "UPSTREAM_API_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert domain error types to ApiError
impl From<crate::auth::AuthError> for ApiError {
    fn from(err: crate::auth::AuthError) -> Self {
        use crate::auth::AuthError;
        match err {
            // A single message for both unknown email and wrong password,
            // so callers cannot enumerate accounts.
            AuthError::InvalidCredentials => ApiError::unauthorized("Invalid credentials"),
            AuthError::TokenExpired => ApiError::unauthorized("Token expired"),
            AuthError::TokenInvalid(_) => ApiError::unauthorized("Invalid token"),
            AuthError::Crypto(msg) => {
                tracing::error!("Auth crypto error: {}", msg);
                ApiError::internal_server_error("Authentication failure")
            }
        }
    }
}

impl From<crate::services::StoreError> for ApiError {
    fn from(err: crate::services::StoreError) -> Self {
        use crate::services::StoreError;
        match err {
            StoreError::DuplicateEmail(email) => {
                ApiError::conflict(format!("Email already registered: {}", email))
            }
            StoreError::DuplicateSlug(slug) => {
                ApiError::conflict(format!("Tenant slug or sub-account already in use: {}", slug))
            }
            StoreError::NotFound(what) => ApiError::not_found(what),
            StoreError::InvalidRole(role) => {
                ApiError::bad_request(format!("Unknown role: {}", role))
            }
            StoreError::InvalidSlug(slug) => {
                ApiError::bad_request(format!("Invalid tenant slug: {}", slug))
            }
            StoreError::Auth(e) => e.into(),
            StoreError::Sqlx(e) => {
                // Log the real error but return a generic message
                tracing::error!("SQLx error: {}", e);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<crate::db::DbError> for ApiError {
    fn from(err: crate::db::DbError) -> Self {
        use crate::db::DbError;
        match err {
            DbError::ConfigMissing(what) => {
                tracing::error!("Missing database configuration: {}", what);
                ApiError::service_unavailable("Database not configured")
            }
            DbError::NotInitialized => {
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DbError::Sqlx(e) => {
                tracing::error!("SQLx error: {}", e);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<crate::bolna::UpstreamError> for ApiError {
    fn from(err: crate::bolna::UpstreamError) -> Self {
        use crate::bolna::UpstreamError;
        match err {
            // Pass-through semantics: the upstream body is the message.
            UpstreamError::Api { status, body } => {
                ApiError::bad_gateway(format!("Voice platform error ({}): {}", status, body))
            }
            UpstreamError::Transport(msg) => {
                tracing::error!("Voice platform unreachable: {}", msg);
                ApiError::bad_gateway("Voice platform unreachable")
            }
            UpstreamError::MissingApiKey => {
                ApiError::bad_request("No voice platform API key configured for this tenant")
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("SQLx error: {}", err);
        ApiError::internal_server_error("Database error occurred")
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_variants() {
        assert_eq!(ApiError::unauthorized("x").status_code(), 401);
        assert_eq!(ApiError::conflict("x").status_code(), 409);
        assert_eq!(ApiError::bad_gateway("x").status_code(), 502);
    }

    #[test]
    fn credential_errors_share_one_message() {
        let err: ApiError = crate::auth::AuthError::InvalidCredentials.into();
        assert_eq!(err.message(), "Invalid credentials");
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn upstream_body_is_passed_through() {
        let err: ApiError = crate::bolna::UpstreamError::Api {
            status: 422,
            body: "agent not found".to_string(),
        }
        .into();
        assert!(err.message().contains("agent not found"));
        assert_eq!(err.error_code(), "UPSTREAM_API_ERROR");
    }
}
