//! Declarative authorization guards
//!
//! Authorization requirements are declared as data on a [`GuardConfig`] and
//! evaluated against an authenticated [`Principal`]. An admin-only route is
//! a role requirement, not a separate code path, so route policy stays
//! inspectable and testable without handlers.

use crate::rbac::Role;
use crate::traits::Principal;
use crate::{AuthError, AuthResult};

/// Declarative requirements evaluated against a request's principal
#[derive(Debug, Clone, Default)]
pub struct GuardConfig {
    /// Paths that bypass this guard entirely
    pub skip_paths: Vec<String>,

    /// Roles the principal may hold
    pub required_roles: Vec<Role>,

    /// Minimum role by seniority
    pub minimum_role: Option<Role>,

    /// Permissions the principal must carry
    pub required_permissions: Vec<String>,

    /// Whether all roles are required instead of any
    pub require_all_roles: bool,

    /// Whether all permissions are required instead of any
    pub require_all_permissions: bool,
}

impl GuardConfig {
    /// Whether this guard is bypassed for `path` (exact or prefix match)
    pub fn should_skip(&self, path: &str) -> bool {
        self.skip_paths
            .iter()
            .any(|skip| path == skip.as_str() || path.starts_with(&format!("{skip}/")))
    }

    /// Evaluate every declared requirement against the principal
    pub fn check(&self, principal: &Principal) -> AuthResult<()> {
        if !self.required_roles.is_empty() {
            let satisfied = if self.require_all_roles {
                // A principal holds one role; "all" of several distinct
                // roles is only satisfiable for a single-element list
                self.required_roles.iter().all(|r| principal.has_role(*r))
            } else {
                self.required_roles.iter().any(|r| principal.has_role(*r))
            };
            if !satisfied {
                return Err(AuthError::insufficient_privileges(format!(
                    "requires role {:?}",
                    self.required_roles
                )));
            }
        }

        if let Some(minimum) = self.minimum_role {
            if !principal.is_at_least(minimum) {
                return Err(AuthError::insufficient_privileges(format!(
                    "requires at least {minimum} role"
                )));
            }
        }

        if !self.required_permissions.is_empty() {
            let satisfied = if self.require_all_permissions {
                principal.has_all_permissions(&self.required_permissions)
            } else {
                principal.has_any_permission(&self.required_permissions)
            };
            if !satisfied {
                return Err(AuthError::insufficient_privileges(format!(
                    "requires permission {:?}",
                    self.required_permissions
                )));
            }
        }

        Ok(())
    }
}

/// Builder for [`GuardConfig`]
#[derive(Debug, Clone, Default)]
pub struct RequireAuth {
    config: GuardConfig,
}

impl RequireAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require an exact role
    pub fn require_role(mut self, role: Role) -> Self {
        self.config.required_roles.push(role);
        self
    }

    /// Require any of the given roles
    pub fn require_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.config.required_roles.extend(roles);
        self
    }

    /// Require the given role or any more senior one
    pub fn require_at_least(mut self, role: Role) -> Self {
        self.config.minimum_role = Some(role);
        self
    }

    /// Require a permission
    pub fn require_permission(mut self, permission: impl Into<String>) -> Self {
        self.config.required_permissions.push(permission.into());
        self
    }

    /// Require permissions (any by default, see `require_all_permissions`)
    pub fn require_permissions<S: Into<String>>(
        mut self,
        permissions: impl IntoIterator<Item = S>,
    ) -> Self {
        self.config
            .required_permissions
            .extend(permissions.into_iter().map(Into::into));
        self
    }

    /// All listed roles must match instead of any
    pub fn require_all_roles(mut self) -> Self {
        self.config.require_all_roles = true;
        self
    }

    /// All listed permissions must be present instead of any
    pub fn require_all_permissions(mut self) -> Self {
        self.config.require_all_permissions = true;
        self
    }

    /// Bypass the guard for a path (exact or prefix match)
    pub fn skip_path(mut self, path: impl Into<String>) -> Self {
        self.config.skip_paths.push(path.into());
        self
    }

    pub fn build(self) -> GuardConfig {
        self.config
    }
}

/// Resource with an owning identity, checked by [`OwnershipGuard`]
pub trait OwnedResource {
    fn owner_id(&self) -> &str;
}

/// Owner-or-admin access check.
///
/// Grants when the principal owns the resource or holds at least the bypass
/// role. An absent resource denies rather than grants, so a failed lookup
/// can never widen access.
#[derive(Debug, Clone)]
pub struct OwnershipGuard {
    bypass_at: Role,
}

impl Default for OwnershipGuard {
    fn default() -> Self {
        Self {
            bypass_at: Role::Admin,
        }
    }
}

impl OwnershipGuard {
    pub fn new(bypass_at: Role) -> Self {
        Self { bypass_at }
    }

    /// Check a known owner id against the principal
    pub fn check_owner(&self, principal: &Principal, owner_id: &str) -> AuthResult<()> {
        if principal.user_id == owner_id || principal.is_at_least(self.bypass_at) {
            return Ok(());
        }
        Err(AuthError::insufficient_privileges(
            "not the owner of this resource",
        ))
    }

    /// Check a looked-up resource; `None` denies
    pub fn check_resource<R: OwnedResource>(
        &self,
        principal: &Principal,
        resource: Option<&R>,
    ) -> AuthResult<()> {
        match resource {
            Some(resource) => self.check_owner(principal, resource.owner_id()),
            None => Err(AuthError::insufficient_privileges("resource not found")),
        }
    }
}
