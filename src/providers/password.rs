//! Credential login flow
//!
//! Composes the hasher, lockout policy, optional attempt limiter and token
//! provider into the single `login` entry point. Check ordering is strict
//! and information-hiding: limiter, existence, account status, lock, and
//! only then the password. A locked account is reported locked before the
//! password is examined, and an unknown email is indistinguishable from a
//! wrong password.

use crate::lockout::LockoutPolicy;
use crate::providers::jwt::JwtProvider;
use crate::rate_limit::AttemptLimiter;
use crate::traits::{Clock, IdentityStore, PasswordHasher, Principal, SystemClock};
use crate::identity::IdentityUpdate;
use crate::{AuthError, AuthResult};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Signed session token
    pub token: String,

    /// Token expiry
    pub expires_at: DateTime<Utc>,

    /// Request-scoped view of the authenticated identity
    pub principal: Principal,
}

/// Email + password login against an [`IdentityStore`]
pub struct PasswordProvider<S: IdentityStore> {
    store: Arc<S>,
    hasher: Box<dyn PasswordHasher>,
    tokens: Arc<JwtProvider>,
    lockout: LockoutPolicy,
    limiter: Option<AttemptLimiter>,
    clock: Arc<dyn Clock>,
}

impl<S: IdentityStore> PasswordProvider<S> {
    pub fn new(store: Arc<S>, hasher: Box<dyn PasswordHasher>, tokens: Arc<JwtProvider>) -> Self {
        Self {
            store,
            hasher,
            tokens,
            lockout: LockoutPolicy::default(),
            limiter: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Rate-limit login attempts per lowercased email
    pub fn with_limiter(mut self, limiter: AttemptLimiter) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn with_lockout(mut self, lockout: LockoutPolicy) -> Self {
        self.lockout = lockout;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Authenticate an email + password pair and issue a session token.
    ///
    /// The failure-counter write for a wrong password is one logical save,
    /// including the lock applied by the crossing failure. The crossing call
    /// itself still reports invalid credentials; the lock is only observable
    /// on subsequent calls.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<LoginOutcome> {
        let key = email.to_lowercase();

        if let Some(limiter) = &self.limiter {
            let info = limiter.check(&key)?;
            if !info.allowed {
                tracing::warn!(
                    email = %key,
                    current = info.current,
                    "login attempt rate limit exceeded"
                );
                return Err(AuthError::TooManyAttempts);
            }
        }

        let mut identity = match self.store.find_by_email(&key).await? {
            Some(identity) => identity,
            // Same error as a wrong password so the response does not reveal
            // whether the email is registered
            None => return Err(AuthError::InvalidCredentials),
        };

        if !identity.is_active() {
            return Err(AuthError::AccountDeactivated);
        }

        let now = self.clock.now();
        if self.lockout.is_locked(&identity, now) {
            return Err(AuthError::AccountLocked);
        }

        if !self.hasher.verify_password(password, &identity.password_hash)? {
            self.lockout.record_failure(&mut identity, now);
            self.store
                .save(
                    &identity.id,
                    IdentityUpdate::attempt_state(identity.login_attempts, identity.lock_until),
                )
                .await?;
            return Err(AuthError::InvalidCredentials);
        }

        self.lockout.record_success(&mut identity);
        identity.last_active = Some(now);
        self.store
            .save(
                &identity.id,
                IdentityUpdate {
                    login_attempts: Some(0),
                    lock_until: Some(None),
                    last_active: Some(now),
                    ..IdentityUpdate::default()
                },
            )
            .await?;

        let issued = self
            .tokens
            .issue(&identity.id, &identity.email, identity.role)?;
        tracing::debug!(user_id = %identity.id, "login succeeded");

        Ok(LoginOutcome {
            token: issued.token,
            expires_at: issued.expires_at,
            principal: identity.to_principal(now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RateLimitConfig, TokenConfig};
    use crate::identity::{ActiveStatus, Identity, MemoryIdentityStore};
    use crate::rbac::Role;
    use crate::traits::test_support::FixedClock;
    use chrono::Duration;

    /// Transparent hasher so lockout tests are not dominated by KDF cost
    struct PlainHasher;

    impl PasswordHasher for PlainHasher {
        fn hash_password(&self, password: &str) -> AuthResult<String> {
            Ok(format!("plain:{password}"))
        }

        fn verify_password(&self, password: &str, hash: &str) -> AuthResult<bool> {
            Ok(hash == format!("plain:{password}"))
        }

        fn hasher_name(&self) -> &str {
            "plain"
        }
    }

    fn tokens() -> Arc<JwtProvider> {
        Arc::new(
            JwtProvider::new(&TokenConfig {
                secret: "test-secret-key-that-is-long-enough-for-validation".to_string(),
                ..TokenConfig::default()
            })
            .unwrap(),
        )
    }

    async fn store_with(email: &str, password: &str, role: Role) -> (Arc<MemoryIdentityStore>, String) {
        let store = Arc::new(MemoryIdentityStore::new());
        let identity = Identity::new(email, format!("plain:{password}"), role);
        let id = identity.id.clone();
        store.insert(identity).await.unwrap();
        (store, id)
    }

    fn provider(store: Arc<MemoryIdentityStore>) -> PasswordProvider<MemoryIdentityStore> {
        PasswordProvider::new(store, Box::new(PlainHasher), tokens())
    }

    #[tokio::test]
    async fn test_login_success_issues_verifiable_token() {
        let (store, id) = store_with("student@example.edu", "Passw0rd", Role::Instructor).await;
        let provider = provider(store.clone());

        let outcome = provider.login("Student@Example.EDU", "Passw0rd").await.unwrap();
        assert_eq!(outcome.principal.user_id, id);
        assert_eq!(outcome.principal.role, Role::Instructor);
        assert!(outcome.expires_at > Utc::now());

        let claims = tokens().verify(&outcome.token).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, Role::Instructor);

        // Success persisted last_active
        let saved = store.find_by_id(&id).await.unwrap().unwrap();
        assert!(saved.last_active.is_some());
    }

    #[tokio::test]
    async fn test_unknown_email_reads_as_invalid_credentials() {
        let (store, _) = store_with("student@example.edu", "Passw0rd", Role::User).await;
        let provider = provider(store);

        let err = provider.login("nobody@example.edu", "Passw0rd").await.unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_deactivated_account_rejected() {
        let store = Arc::new(MemoryIdentityStore::new());
        let mut identity = Identity::new("student@example.edu", "plain:pw".to_string(), Role::User);
        identity.active_status = ActiveStatus::Suspended;
        store.insert(identity).await.unwrap();

        let err = provider(store).login("student@example.edu", "pw").await.unwrap_err();
        assert_eq!(err, AuthError::AccountDeactivated);
    }

    #[tokio::test]
    async fn test_fifth_failure_locks_but_reports_invalid_credentials() {
        let (store, id) = store_with("student@example.edu", "Passw0rd", Role::User).await;
        let provider = provider(store.clone());

        for _ in 0..4 {
            let err = provider.login("student@example.edu", "wrong").await.unwrap_err();
            assert_eq!(err, AuthError::InvalidCredentials);
        }
        let saved = store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(saved.login_attempts, 4);
        assert!(saved.lock_until.is_none());

        // The crossing call applies the lock but still reads as bad password
        let err = provider.login("student@example.edu", "wrong").await.unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
        let saved = store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(saved.login_attempts, 5);
        assert!(saved.lock_until.is_some());

        // Subsequent calls see the lock, even with the correct password
        let err = provider.login("student@example.edu", "Passw0rd").await.unwrap_err();
        assert_eq!(err, AuthError::AccountLocked);
    }

    #[tokio::test]
    async fn test_lock_expires_and_success_clears_state() {
        let (store, id) = store_with("student@example.edu", "Passw0rd", Role::User).await;
        let clock = Arc::new(FixedClock::at(Utc::now()));
        let provider = provider(store.clone()).with_clock(clock.clone());

        for _ in 0..5 {
            provider.login("student@example.edu", "wrong").await.unwrap_err();
        }
        assert_eq!(
            provider.login("student@example.edu", "Passw0rd").await.unwrap_err(),
            AuthError::AccountLocked
        );

        clock.advance(Duration::hours(2) + Duration::seconds(1));
        let outcome = provider.login("student@example.edu", "Passw0rd").await.unwrap();
        assert_eq!(outcome.principal.user_id, id);

        let saved = store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(saved.login_attempts, 0);
        assert!(saved.lock_until.is_none());
    }

    #[tokio::test]
    async fn test_limiter_rejects_before_store_lookup() {
        let (store, _) = store_with("student@example.edu", "Passw0rd", Role::User).await;
        let limiter = AttemptLimiter::new(RateLimitConfig {
            max_attempts: 2,
            window_seconds: 60,
        });
        let provider = provider(store).with_limiter(limiter);

        provider.login("student@example.edu", "Passw0rd").await.unwrap();
        provider.login("student@example.edu", "Passw0rd").await.unwrap();
        let err = provider.login("student@example.edu", "Passw0rd").await.unwrap_err();
        assert_eq!(err, AuthError::TooManyAttempts);

        // Unknown emails are limited too, with the same key scheme
        let err = provider.login("STUDENT@example.edu", "whatever").await.unwrap_err();
        assert_eq!(err, AuthError::TooManyAttempts);
    }
}
