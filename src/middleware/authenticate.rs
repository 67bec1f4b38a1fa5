//! Bearer-token request authentication
//!
//! Turns an `Authorization` header value into a [`Principal`], re-reading
//! the identity on every request so a token never outlives a deactivation,
//! a lock, or a role change. Stays framework-agnostic: the caller hands in
//! the header value and gets a principal or a typed error back.

use crate::lockout::LockoutPolicy;
use crate::providers::jwt::JwtProvider;
use crate::traits::{Clock, IdentityStore, Principal, SystemClock};
use crate::identity::IdentityUpdate;
use crate::{AuthError, AuthResult};
use std::sync::Arc;

const BEARER_PREFIX: &str = "Bearer ";

/// Request authenticator: verifies a bearer token and loads its identity
pub struct Authenticator<S: IdentityStore> {
    store: Arc<S>,
    tokens: Arc<JwtProvider>,
    lockout: LockoutPolicy,
    clock: Arc<dyn Clock>,
}

impl<S: IdentityStore> Authenticator<S> {
    pub fn new(store: Arc<S>, tokens: Arc<JwtProvider>) -> Self {
        Self {
            store,
            tokens,
            lockout: LockoutPolicy::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_lockout(mut self, lockout: LockoutPolicy) -> Self {
        self.lockout = lockout;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Extract the token from an `Authorization` header value.
    ///
    /// Absent, malformed, and empty header values are three distinct errors
    /// so clients can tell a missing login apart from a broken one.
    pub fn extract_token(auth_header: Option<&str>) -> AuthResult<&str> {
        let header = auth_header.ok_or(AuthError::MissingAuthHeader)?;
        let token = header
            .strip_prefix(BEARER_PREFIX)
            .ok_or_else(|| AuthError::invalid_format("expected 'Bearer <token>'"))?;
        if token.trim().is_empty() {
            return Err(AuthError::MissingToken);
        }
        Ok(token)
    }

    /// Authenticate a request from its `Authorization` header value.
    ///
    /// Side effects are one identity read and, on success only, one
    /// `last_active` write.
    pub async fn authenticate(&self, auth_header: Option<&str>) -> AuthResult<Principal> {
        let token = Self::extract_token(auth_header)?;
        let claims = self.tokens.verify(token)?;

        let identity = self
            .store
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !identity.is_active() {
            return Err(AuthError::AccountDeactivated);
        }

        let now = self.clock.now();
        if self.lockout.is_locked(&identity, now) {
            return Err(AuthError::AccountLocked);
        }

        // A token issued before a role change is stale and must be
        // re-obtained, in either direction of the change
        if claims.role != identity.role {
            tracing::warn!(
                user_id = %identity.id,
                token_role = %claims.role,
                current_role = %identity.role,
                "token role does not match stored role"
            );
            return Err(AuthError::RoleMismatch);
        }

        self.store
            .save(&identity.id, IdentityUpdate::touch(now))
            .await?;

        tracing::debug!(user_id = %identity.id, "request authenticated");
        Ok(identity.to_principal(now))
    }

    /// Authentication for routes open to anonymous callers.
    ///
    /// Credential, account-state and transport failures degrade to
    /// `Ok(None)`; infrastructure failures still propagate so an outage is
    /// not misread as "not logged in". No `last_active` write happens for
    /// anonymous outcomes.
    pub async fn authenticate_optional(
        &self,
        auth_header: Option<&str>,
    ) -> AuthResult<Option<Principal>> {
        match self.authenticate(auth_header).await {
            Ok(principal) => Ok(Some(principal)),
            Err(err) if err.status_code() >= 500 => Err(err),
            Err(_) => Ok(None),
        }
    }
}
