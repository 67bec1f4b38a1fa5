//! Request authentication and authorization middleware

pub mod authenticate;
pub mod guards;

pub use authenticate::Authenticator;
pub use guards::{GuardConfig, OwnedResource, OwnershipGuard, RequireAuth};
