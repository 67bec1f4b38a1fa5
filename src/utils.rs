//! Password hashing and cryptographic utilities

use crate::config::PasswordConfig;
use crate::{AuthError, AuthResult, PasswordHasher};
use rand::{distributions::Alphanumeric, thread_rng, Rng};

#[cfg(feature = "argon2")]
use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};

#[cfg(feature = "bcrypt")]
use bcrypt::{hash, verify, DEFAULT_COST};

/// bcrypt password hasher implementation
#[cfg(feature = "bcrypt")]
#[derive(Debug, Clone)]
pub struct BcryptHasher {
    cost: u32,
}

#[cfg(feature = "bcrypt")]
impl BcryptHasher {
    /// Create a new bcrypt hasher with custom cost
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Create a bcrypt hasher with default cost
    pub fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }

    /// Create a bcrypt hasher optimized for production
    pub fn production() -> Self {
        Self { cost: 12 }
    }

    /// Create a bcrypt hasher optimized for development (faster)
    pub fn development() -> Self {
        Self { cost: 4 }
    }
}

#[cfg(feature = "bcrypt")]
impl PasswordHasher for BcryptHasher {
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        if password.is_empty() {
            return Err(AuthError::crypto_error("password must not be empty"));
        }
        hash(password, self.cost).map_err(AuthError::from)
    }

    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<bool> {
        match verify(password, hash) {
            Ok(matches) => Ok(matches),
            Err(err) => {
                // A malformed stored hash reads as "not equal"
                tracing::warn!(error = %err, "stored password hash failed to parse");
                Ok(false)
            }
        }
    }

    fn hasher_name(&self) -> &str {
        "bcrypt"
    }
}

/// Argon2 password hasher implementation
#[cfg(feature = "argon2")]
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    memory_cost: u32,
    time_cost: u32,
    parallelism: u32,
}

#[cfg(feature = "argon2")]
impl Argon2Hasher {
    /// Create a new Argon2 hasher with custom parameters
    pub fn new(memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            memory_cost,
            time_cost,
            parallelism,
        }
    }

    /// Create an Argon2 hasher with default parameters
    pub fn default() -> Self {
        Self {
            memory_cost: 65536, // 64 MB
            time_cost: 3,
            parallelism: 4,
        }
    }

    /// Create an Argon2 hasher optimized for development (faster)
    pub fn development() -> Self {
        Self {
            memory_cost: 4096, // 4 MB
            time_cost: 2,
            parallelism: 2,
        }
    }

    fn instance(&self) -> AuthResult<Argon2<'static>> {
        Ok(Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            argon2::Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
                .map_err(|e| AuthError::crypto_error(e.to_string()))?,
        ))
    }
}

#[cfg(feature = "argon2")]
impl PasswordHasher for Argon2Hasher {
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        if password.is_empty() {
            return Err(AuthError::crypto_error("password must not be empty"));
        }
        let salt = SaltString::generate(&mut thread_rng());
        let password_hash = self
            .instance()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::crypto_error(e.to_string()))?;
        Ok(password_hash.to_string())
    }

    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<bool> {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!(error = %err, "stored password hash failed to parse");
                return Ok(false);
            }
        };
        Ok(self
            .instance()?
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    fn hasher_name(&self) -> &str {
        "argon2"
    }
}

/// Password hasher factory for creating hashers from configuration
pub struct PasswordHasherFactory;

impl PasswordHasherFactory {
    /// Create a password hasher from the password policy configuration
    pub fn from_config(config: &PasswordConfig) -> AuthResult<Box<dyn PasswordHasher>> {
        match config.hash_algorithm.as_str() {
            #[cfg(feature = "bcrypt")]
            "bcrypt" => Ok(Box::new(BcryptHasher::new(config.bcrypt_cost))),
            #[cfg(feature = "argon2")]
            "argon2" => Ok(Box::new(Argon2Hasher::new(
                config.argon2_memory,
                config.argon2_iterations,
                config.argon2_parallelism,
            ))),
            other => Err(AuthError::config_error(format!(
                "unknown password hashing algorithm: {other} (or feature not enabled)"
            ))),
        }
    }

    /// Create the default hasher (bcrypt)
    pub fn default_hasher() -> Box<dyn PasswordHasher> {
        #[cfg(feature = "bcrypt")]
        return Box::new(BcryptHasher::default());

        #[cfg(all(not(feature = "bcrypt"), feature = "argon2"))]
        return Box::new(Argon2Hasher::default());

        #[cfg(all(not(feature = "bcrypt"), not(feature = "argon2")))]
        panic!("No password hasher available. Enable either 'bcrypt' or 'argon2' feature");
    }
}

/// Utility functions for generating random values and enforcing the
/// password policy
pub struct CryptoUtils;

impl CryptoUtils {
    /// Generate a random string of specified length using alphanumeric
    /// characters
    pub fn generate_random_string(length: usize) -> String {
        thread_rng()
            .sample_iter(&Alphanumeric)
            .take(length)
            .map(char::from)
            .collect()
    }

    /// Generate a token signing secret
    pub fn generate_signing_secret(length: Option<usize>) -> String {
        Self::generate_random_string(length.unwrap_or(64))
    }

    /// Validate password strength against the policy
    pub fn validate_password_strength(password: &str, policy: &PasswordConfig) -> AuthResult<()> {
        if password.len() < policy.min_length {
            return Err(AuthError::crypto_error(format!(
                "Password must be at least {} characters long",
                policy.min_length
            )));
        }

        if password.len() > policy.max_length {
            return Err(AuthError::crypto_error(format!(
                "Password must be at most {} characters long",
                policy.max_length
            )));
        }

        if policy.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            return Err(AuthError::crypto_error(
                "Password must contain at least one uppercase letter",
            ));
        }

        if policy.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
            return Err(AuthError::crypto_error(
                "Password must contain at least one lowercase letter",
            ));
        }

        if policy.require_numbers && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AuthError::crypto_error(
                "Password must contain at least one number",
            ));
        }

        if policy.require_special
            && !password
                .chars()
                .any(|c| "!@#$%^&*()_+-=[]{}|;:,.<>?".contains(c))
        {
            return Err(AuthError::crypto_error(
                "Password must contain at least one special character",
            ));
        }

        Ok(())
    }
}
