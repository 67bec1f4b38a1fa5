//! JWT token issuance and verification
//!
//! Stateless, signed, time-boxed bearer tokens. The server keeps no token
//! registry: revocation happens implicitly through expiry or through the
//! identity's status and lock fields at verification time. Claims carry the
//! role so coarse decisions are possible without a store round-trip, but the
//! request authenticator still re-reads the identity: tokens prove identity
//! continuity, not current authorization.

use crate::config::TokenConfig;
use crate::rbac::Role;
use crate::{AuthError, AuthResult};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

const MIN_SECRET_LENGTH: usize = 32;

/// Decoded token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Identity id
    pub sub: String,

    /// Login email at issuance time
    pub email: String,

    /// Role at issuance time; re-checked against the store on every request
    pub role: Role,

    /// Issued-at, seconds since epoch
    pub iat: i64,

    /// Expiry, seconds since epoch
    pub exp: i64,

    /// Issuer
    pub iss: String,
}

/// A freshly issued token with its expiry
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Token service: issues and verifies signed bearer tokens with a
/// process-wide secret, initialized once at startup
pub struct JwtProvider {
    issuer: String,
    ttl: Duration,
    header: Header,
    validation: Validation,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtProvider {
    /// Create a provider from token configuration
    pub fn new(config: &TokenConfig) -> AuthResult<Self> {
        if config.secret.len() < MIN_SECRET_LENGTH {
            return Err(AuthError::config_error(format!(
                "token secret must be at least {MIN_SECRET_LENGTH} characters"
            )));
        }

        let algorithm = match config.algorithm.as_str() {
            "HS256" => Algorithm::HS256,
            "HS384" => Algorithm::HS384,
            "HS512" => Algorithm::HS512,
            other => {
                return Err(AuthError::config_error(format!(
                    "unsupported token algorithm: {other}"
                )))
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.set_issuer(&[&config.issuer]);

        Ok(Self {
            issuer: config.issuer.clone(),
            ttl: Duration::seconds(config.ttl_seconds as i64),
            header: Header::new(algorithm),
            validation,
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
        })
    }

    /// Configured token lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a session token with the configured TTL
    pub fn issue(&self, user_id: &str, email: &str, role: Role) -> AuthResult<IssuedToken> {
        self.issue_with_ttl(user_id, email, role, self.ttl)
    }

    /// Issue a token with an explicit TTL
    pub fn issue_with_ttl(
        &self,
        user_id: &str,
        email: &str,
        role: Role,
        ttl: Duration,
    ) -> AuthResult<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + ttl;
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.issuer.clone(),
        };

        let token = encode(&self.header, &claims, &self.encoding_key)
            .map_err(|e| AuthError::crypto_error(e.to_string()))?;
        Ok(IssuedToken { token, expires_at })
    }

    /// Verify a token and return its claims.
    ///
    /// Pure CPU work over the token and the secret; no I/O. Expired tokens
    /// map to `TokenExpired`, bad signatures and malformed or incomplete
    /// payloads to `InvalidToken`.
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> JwtProvider {
        JwtProvider::new(&TokenConfig {
            secret: "test-secret-key-that-is-long-enough-for-validation".to_string(),
            ..TokenConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_round_trip_preserves_claims() {
        let provider = provider();
        for role in Role::ORDER {
            let issued = provider.issue("user-1", "student@example.edu", role).unwrap();
            let claims = provider.verify(&issued.token).unwrap();
            assert_eq!(claims.sub, "user-1");
            assert_eq!(claims.email, "student@example.edu");
            assert_eq!(claims.role, role);
            assert_eq!(claims.iss, "campus");
        }
    }

    #[test]
    fn test_verification_is_idempotent() {
        let provider = provider();
        let issued = provider
            .issue("user-1", "student@example.edu", Role::User)
            .unwrap();
        let first = provider.verify(&issued.token).unwrap();
        let second = provider.verify(&issued.token).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_default_ttl_is_seven_days() {
        let provider = provider();
        let issued = provider
            .issue("user-1", "student@example.edu", Role::User)
            .unwrap();
        let claims = provider.verify(&issued.token).unwrap();
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_expired_token() {
        let provider = provider();
        // Expiry in the past
        let issued = provider
            .issue_with_ttl(
                "user-1",
                "student@example.edu",
                Role::User,
                Duration::seconds(-1),
            )
            .unwrap();
        let err = provider.verify(&issued.token).unwrap_err();
        assert_eq!(err, AuthError::TokenExpired);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let provider = provider();
        let other = JwtProvider::new(&TokenConfig {
            secret: "a-completely-different-secret-key-also-long".to_string(),
            ..TokenConfig::default()
        })
        .unwrap();

        let issued = provider
            .issue("user-1", "student@example.edu", Role::Admin)
            .unwrap();
        let err = other.verify(&issued.token).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_TOKEN");
    }

    #[test]
    fn test_garbage_token_rejected() {
        let provider = provider();
        let err = provider.verify("not.a.token").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_TOKEN");
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let other = JwtProvider::new(&TokenConfig {
            secret: "test-secret-key-that-is-long-enough-for-validation".to_string(),
            issuer: "someone-else".to_string(),
            ..TokenConfig::default()
        })
        .unwrap();
        let issued = other
            .issue("user-1", "student@example.edu", Role::User)
            .unwrap();

        let err = provider().verify(&issued.token).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_TOKEN");
    }

    #[test]
    fn test_short_secret_rejected() {
        let result = JwtProvider::new(&TokenConfig {
            secret: "short".to_string(),
            ..TokenConfig::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_unsupported_algorithm_rejected() {
        let result = JwtProvider::new(&TokenConfig {
            secret: "test-secret-key-that-is-long-enough-for-validation".to_string(),
            algorithm: "RS256".to_string(),
            ..TokenConfig::default()
        });
        assert!(result.is_err());
    }
}
