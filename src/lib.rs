//! # campus-auth: Authentication and Authorization core
//!
//! Token-based authentication and role-based authorization for an
//! education-platform backend: stateless JWT session tokens, a failed-login
//! lockout policy, a closed role/permission model, bearer-token request
//! authentication, and declarative authorization guards. Persistence sits
//! behind the [`IdentityStore`] trait so the crate stays framework- and
//! database-agnostic.

pub mod config;
pub mod error;
pub mod identity;
pub mod lockout;
pub mod middleware;
pub mod providers;
pub mod rate_limit;
pub mod rbac;
pub mod traits;
pub mod utils;

// Prelude-style re-exports for core functionality

// Error handling
pub use error::AuthError;

// Core traits and the request principal
pub use traits::{Clock, IdentityStore, PasswordHasher, Principal, SystemClock};

// Identity records and the in-memory store
pub use identity::{ActiveStatus, Identity, IdentityUpdate, MemoryIdentityStore};

// Configuration
pub use config::{AuthConfig, LockoutConfig, PasswordConfig, RateLimitConfig, TokenConfig};

// Providers
pub use providers::jwt::{Claims, IssuedToken, JwtProvider};
pub use providers::password::{LoginOutcome, PasswordProvider};

// Lockout and rate limiting
pub use lockout::LockoutPolicy;
pub use rate_limit::{AttemptLimiter, RateLimitInfo};

// RBAC
pub use rbac::{Role, FULL_ACCESS};

// Middleware
pub use middleware::authenticate::Authenticator;
pub use middleware::guards::{GuardConfig, OwnedResource, OwnershipGuard, RequireAuth};

/// Authentication result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication system version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
