//! Authentication and authorization error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Authentication and authorization errors
///
/// Every variant maps to exactly one stable machine-readable code and one
/// HTTP status so client integrations can branch reliably. Human-readable
/// messages may vary between releases; codes must not.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthError {
    /// No Authorization header on the request
    #[error("Authorization header missing")]
    MissingAuthHeader,

    /// Authorization header present but not in `Bearer <token>` form
    #[error("Invalid authorization format: {message}")]
    InvalidAuthFormat { message: String },

    /// Authorization header carried an empty token value
    #[error("Authorization token missing")]
    MissingToken,

    /// Token signature is valid but the token has expired
    #[error("Token expired")]
    TokenExpired,

    /// Token is malformed or its signature does not verify
    #[error("Invalid token: {message}")]
    InvalidToken { message: String },

    /// Identity referenced by the token no longer exists
    #[error("User not found")]
    UserNotFound,

    /// Account exists but is not in Active status
    #[error("Account is deactivated")]
    AccountDeactivated,

    /// Account is locked due to failed login attempts
    #[error("Account locked due to failed login attempts")]
    AccountLocked,

    /// Role claimed in the token no longer matches the stored role
    #[error("Token role does not match current account role")]
    RoleMismatch,

    /// Wrong email/password combination (deliberately generic)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Authenticated but lacking the required role or permission
    #[error("Insufficient privileges: {message}")]
    InsufficientPrivileges { message: String },

    /// Too many attempts within the rate-limit window
    #[error("Too many attempts, try again later")]
    TooManyAttempts,

    /// Downstream store or signer unavailable during authentication
    #[error("Authentication service unavailable: {message}")]
    ServiceUnavailable { message: String },

    /// Cryptographic operation failed
    #[error("Cryptographic error: {message}")]
    CryptographicError { message: String },

    /// Invalid authentication configuration
    #[error("Authentication configuration error: {message}")]
    ConfigurationError { message: String },
}

impl AuthError {
    /// Get the stable error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "NO_AUTH_HEADER",
            AuthError::InvalidAuthFormat { .. } => "INVALID_AUTH_FORMAT",
            AuthError::MissingToken => "NO_TOKEN",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::InvalidToken { .. } => "INVALID_TOKEN",
            AuthError::UserNotFound => "USER_NOT_FOUND",
            AuthError::AccountDeactivated => "ACCOUNT_DEACTIVATED",
            AuthError::AccountLocked => "ACCOUNT_LOCKED",
            AuthError::RoleMismatch => "ROLE_MISMATCH",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::InsufficientPrivileges { .. } => "INSUFFICIENT_PRIVILEGES",
            AuthError::TooManyAttempts => "TOO_MANY_ATTEMPTS",
            AuthError::ServiceUnavailable { .. } => "AUTH_SERVICE_ERROR",
            AuthError::CryptographicError { .. } => "AUTH_SERVICE_ERROR",
            AuthError::ConfigurationError { .. } => "AUTH_SERVICE_ERROR",
        }
    }

    /// Get HTTP status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthFormat { .. }
            | AuthError::MissingToken
            | AuthError::TokenExpired
            | AuthError::InvalidToken { .. }
            | AuthError::UserNotFound
            | AuthError::AccountDeactivated
            | AuthError::RoleMismatch
            | AuthError::InvalidCredentials => 401,
            AuthError::AccountLocked => 423, // Locked
            AuthError::InsufficientPrivileges { .. } => 403,
            AuthError::TooManyAttempts => 429,
            AuthError::ServiceUnavailable { .. } => 503,
            AuthError::CryptographicError { .. } | AuthError::ConfigurationError { .. } => 500,
        }
    }

    /// Whether the caller may safely retry after a delay.
    ///
    /// Only infrastructure failures are retryable; credential and
    /// authorization failures never are.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::ServiceUnavailable { .. })
    }

    /// Create an invalid-format error
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidAuthFormat {
            message: message.into(),
        }
    }

    /// Create an invalid-token error
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// Create an insufficient-privileges error
    pub fn insufficient_privileges(message: impl Into<String>) -> Self {
        Self::InsufficientPrivileges {
            message: message.into(),
        }
    }

    /// Create a service-unavailable error
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// Create a cryptographic error
    pub fn crypto_error(message: impl Into<String>) -> Self {
        Self::CryptographicError {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::TokenExpired,
            _ => Self::invalid_token(err.to_string()),
        }
    }
}

#[cfg(feature = "argon2")]
impl From<argon2::Error> for AuthError {
    fn from(err: argon2::Error) -> Self {
        Self::crypto_error(err.to_string())
    }
}

#[cfg(feature = "bcrypt")]
impl From<bcrypt::BcryptError> for AuthError {
    fn from(err: bcrypt::BcryptError) -> Self {
        Self::crypto_error(err.to_string())
    }
}
