//! Authentication providers

pub mod jwt;
pub mod password;

pub use jwt::{Claims, IssuedToken, JwtProvider};
pub use password::{LoginOutcome, PasswordProvider};
