//! Core authentication and authorization traits

use crate::identity::{Identity, IdentityUpdate};
use crate::rbac::{set_has_permission, Role};
use crate::AuthResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Time source, injected so lockout and token logic are testable
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Password hasher trait for different hashing algorithms
pub trait PasswordHasher: Send + Sync {
    /// Hash a password. Fails only on empty input or hasher failure.
    fn hash_password(&self, password: &str) -> AuthResult<String>;

    /// Verify a password against its hash.
    ///
    /// A malformed stored hash verifies as `Ok(false)` rather than an error,
    /// so a corrupt record reads as "not equal" and never as a server fault
    /// visible to the caller.
    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<bool>;

    /// Get the hasher name
    fn hasher_name(&self) -> &str;
}

/// Credential store holding identity records.
///
/// The auth core reads and writes only the narrow field set in
/// [`IdentityUpdate`]; business-entity persistence lives elsewhere. Store
/// failures must surface as `AuthError::ServiceUnavailable`, never be
/// swallowed.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Look up an identity by its opaque id
    async fn find_by_id(&self, id: &str) -> AuthResult<Option<Identity>>;

    /// Look up an identity by email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<Identity>>;

    /// Apply a partial update to an identity record
    async fn save(&self, id: &str, update: IdentityUpdate) -> AuthResult<()>;

    /// Create a new identity record
    async fn insert(&self, identity: Identity) -> AuthResult<()>;
}

/// Authenticated principal attached to a single request's lifetime.
///
/// An ephemeral view of an [`Identity`]; never persisted. Routes open to
/// anonymous callers see `Option<Principal>::None` instead of a principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    /// Identity id
    pub user_id: String,

    /// Login email
    pub email: String,

    /// Current role, re-read from the store at authentication time
    pub role: Role,

    /// Permissions derived from the role
    pub permissions: Vec<String>,

    /// When this request was authenticated
    pub authenticated_at: DateTime<Utc>,
}

impl Principal {
    /// Check for an exact role
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    /// Check role seniority
    pub fn is_at_least(&self, role: Role) -> bool {
        self.role.is_at_least(role)
    }

    /// Check a permission, honoring the `full_access` wildcard
    pub fn has_permission(&self, permission: &str) -> bool {
        set_has_permission(&self.permissions, permission)
    }

    /// Check if any of the given permissions is present
    pub fn has_any_permission<S: AsRef<str>>(&self, permissions: &[S]) -> bool {
        permissions.iter().any(|p| self.has_permission(p.as_ref()))
    }

    /// Check if all of the given permissions are present
    pub fn has_all_permissions<S: AsRef<str>>(&self, permissions: &[S]) -> bool {
        permissions.iter().all(|p| self.has_permission(p.as_ref()))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::Mutex;

    /// Clock fixed at a settable instant, for lockout and token tests
    pub struct FixedClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl FixedClock {
        pub fn at(now: DateTime<Utc>) -> Self {
            Self { now: Mutex::new(now) }
        }

        pub fn advance(&self, by: chrono::Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    pub fn principal_with_role(role: Role) -> Principal {
        Principal {
            user_id: "user-1".to_string(),
            email: "student@example.edu".to_string(),
            role,
            permissions: role.permissions().iter().map(|p| p.to_string()).collect(),
            authenticated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::principal_with_role;
    use super::*;

    #[test]
    fn test_principal_role_checks() {
        let principal = principal_with_role(Role::Instructor);
        assert!(principal.has_role(Role::Instructor));
        assert!(!principal.has_role(Role::Admin));
        assert!(principal.is_at_least(Role::User));
        assert!(!principal.is_at_least(Role::Admin));
    }

    #[test]
    fn test_principal_permission_checks() {
        let principal = principal_with_role(Role::Instructor);
        assert!(principal.has_permission("grade:quizzes"));
        assert!(!principal.has_permission("manage:users"));

        assert!(principal.has_any_permission(&["manage:users", "grade:quizzes"]));
        assert!(!principal.has_any_permission(&["manage:users", "view:dashboard"]));
        assert!(principal.has_all_permissions(&["grade:quizzes", "upload:materials"]));
        assert!(!principal.has_all_permissions(&["grade:quizzes", "manage:users"]));
    }

    #[test]
    fn test_principal_wildcard_permission() {
        let principal = principal_with_role(Role::SuperAdmin);
        assert!(principal.has_permission("manage:users"));
        assert!(principal.has_permission("entirely:unlisted"));
    }

    #[test]
    fn test_system_clock_monotonic_enough() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
