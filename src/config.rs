//! Authentication configuration types and utilities

use serde::{Deserialize, Serialize};

/// Main authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// Token issuance and verification configuration
    pub token: TokenConfig,

    /// Password policy configuration
    pub password: PasswordConfig,

    /// Account lockout configuration
    pub lockout: LockoutConfig,

    /// Login-attempt rate limiting configuration
    pub rate_limit: RateLimitConfig,
}

/// Bearer token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Secret key for token signing (HS256/384/512)
    pub secret: String,

    /// Signing algorithm (HS256, HS384, HS512)
    #[serde(default = "default_token_algorithm")]
    pub algorithm: String,

    /// Session token lifetime in seconds
    #[serde(default = "default_token_ttl")]
    pub ttl_seconds: u64,

    /// Token issuer claim
    #[serde(default = "default_token_issuer")]
    pub issuer: String,
}

/// Password policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordConfig {
    /// Minimum password length
    #[serde(default = "default_min_password_length")]
    pub min_length: usize,

    /// Maximum password length
    #[serde(default = "default_max_password_length")]
    pub max_length: usize,

    /// Require uppercase letters
    #[serde(default = "default_true")]
    pub require_uppercase: bool,

    /// Require lowercase letters
    #[serde(default = "default_true")]
    pub require_lowercase: bool,

    /// Require numbers
    #[serde(default = "default_true")]
    pub require_numbers: bool,

    /// Require special characters
    #[serde(default = "default_false")]
    pub require_special: bool,

    /// Password hashing algorithm (bcrypt, argon2)
    #[serde(default = "default_hash_algorithm")]
    pub hash_algorithm: String,

    /// Bcrypt cost factor (if using bcrypt)
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,

    /// Argon2 memory cost in KB (if using argon2)
    #[serde(default = "default_argon2_memory")]
    pub argon2_memory: u32,

    /// Argon2 time cost (iterations)
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism factor
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

/// Account lockout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockoutConfig {
    /// Consecutive failed attempts before the account locks
    #[serde(default = "default_max_login_attempts")]
    pub max_attempts: u32,

    /// Lock duration in seconds once the threshold is crossed
    #[serde(default = "default_lock_duration")]
    pub lock_duration_seconds: u64,
}

/// Login-attempt rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum attempts per key within the window
    #[serde(default = "default_rate_limit_attempts")]
    pub max_attempts: u32,

    /// Window length in seconds
    #[serde(default = "default_rate_limit_window")]
    pub window_seconds: u64,
}

// Default value functions
fn default_token_algorithm() -> String {
    "HS256".to_string()
}
fn default_token_ttl() -> u64 {
    7 * 24 * 60 * 60
} // 7 days, primary session tokens
fn default_token_issuer() -> String {
    "campus".to_string()
}
fn default_min_password_length() -> usize {
    8
}
fn default_max_password_length() -> usize {
    128
}
fn default_hash_algorithm() -> String {
    "bcrypt".to_string()
}
fn default_bcrypt_cost() -> u32 {
    12
}
fn default_argon2_memory() -> u32 {
    65536
} // 64MB
fn default_argon2_iterations() -> u32 {
    3
}
fn default_argon2_parallelism() -> u32 {
    4
}
fn default_max_login_attempts() -> u32 {
    5
}
fn default_lock_duration() -> u64 {
    2 * 60 * 60
} // 2 hours
fn default_rate_limit_attempts() -> u32 {
    10
}
fn default_rate_limit_window() -> u64 {
    15 * 60
} // 15 minutes
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: "default-secret-key-change-in-production-32-chars-long".to_string(),
            algorithm: default_token_algorithm(),
            ttl_seconds: default_token_ttl(),
            issuer: default_token_issuer(),
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: default_min_password_length(),
            max_length: default_max_password_length(),
            require_uppercase: default_true(),
            require_lowercase: default_true(),
            require_numbers: default_true(),
            require_special: default_false(),
            hash_algorithm: default_hash_algorithm(),
            bcrypt_cost: default_bcrypt_cost(),
            argon2_memory: default_argon2_memory(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_login_attempts(),
            lock_duration_seconds: default_lock_duration(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_rate_limit_attempts(),
            window_seconds: default_rate_limit_window(),
        }
    }
}

impl AuthConfig {
    /// Create a development configuration with relaxed settings
    pub fn development() -> Self {
        let mut config = Self::default();
        config.token.secret = "dev-secret-key-change-in-production-32-chars".to_string();
        config.password.require_special = false;
        config.password.bcrypt_cost = 4; // Fast hashing for local iteration
        config
    }

    /// Create a production configuration with strict security
    pub fn production() -> Self {
        let mut config = Self::default();
        config.password.require_special = true;
        config.password.min_length = 12;
        config.rate_limit.max_attempts = 5;
        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.token.secret.len() < 32 {
            return Err("Token secret must be at least 32 characters".to_string());
        }

        if !["HS256", "HS384", "HS512"].contains(&self.token.algorithm.as_str()) {
            return Err("Invalid token signing algorithm".to_string());
        }

        if self.token.ttl_seconds == 0 {
            return Err("Token TTL must be positive".to_string());
        }

        if self.password.min_length > self.password.max_length {
            return Err("Password min_length cannot be greater than max_length".to_string());
        }

        if self.password.min_length < 1 {
            return Err("Password min_length must be at least 1".to_string());
        }

        if !["bcrypt", "argon2"].contains(&self.password.hash_algorithm.as_str()) {
            return Err("Invalid password hashing algorithm".to_string());
        }

        if self.lockout.max_attempts == 0 {
            return Err("Lockout max_attempts must be at least 1".to_string());
        }

        if self.rate_limit.max_attempts == 0 || self.rate_limit.window_seconds == 0 {
            return Err("Rate limit attempts and window must be positive".to_string());
        }

        Ok(())
    }
}
