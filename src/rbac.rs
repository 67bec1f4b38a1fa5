//! Role and permission model
//!
//! A closed, ordered role hierarchy with a static permission table per role.
//! Seniority is defined by position in [`Role::ORDER`]; permission sets are
//! enumerated independently per role and are never unioned automatically, so
//! a promotion grants exactly the target role's set and nothing implicit.

use crate::{AuthError, AuthResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wildcard permission: a role carrying it satisfies any permission check.
pub const FULL_ACCESS: &str = "full_access";

/// Platform roles, ordered from least to most senior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Instructor,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Seniority order, least senior first
    pub const ORDER: [Role; 4] = [Role::User, Role::Instructor, Role::Admin, Role::SuperAdmin];

    /// Position in the seniority order
    pub fn seniority(&self) -> usize {
        Self::ORDER
            .iter()
            .position(|r| r == self)
            .expect("role present in ORDER")
    }

    /// True when `self` is at least as senior as `other`
    pub fn is_at_least(&self, other: Role) -> bool {
        self.seniority() >= other.seniority()
    }

    /// The static permission set for this role.
    ///
    /// Each set is enumerated on its own; senior roles do not inherit junior
    /// entries. `SuperAdmin` carries the `full_access` wildcard instead of an
    /// exhaustive list.
    pub fn permissions(&self) -> &'static [&'static str] {
        match self {
            Role::User => &[
                "read:own_profile",
                "update:own_profile",
                "take:quizzes",
                "view:quiz_results",
                "read:materials",
                "download:materials",
                "read:notifications",
            ],
            Role::Instructor => &[
                "read:own_profile",
                "update:own_profile",
                "create:quizzes",
                "update:own_quizzes",
                "delete:own_quizzes",
                "grade:quizzes",
                "upload:materials",
                "update:own_materials",
                "delete:own_materials",
                "send:notifications",
                "view:student_progress",
            ],
            Role::Admin => &[
                "manage:users",
                "manage:quizzes",
                "manage:materials",
                "manage:notifications",
                "view:dashboard",
                "export:reports",
            ],
            Role::SuperAdmin => &[FULL_ACCESS],
        }
    }

    /// Check a permission against this role's static set, honoring the
    /// `full_access` wildcard
    pub fn has_permission(&self, permission: &str) -> bool {
        set_has_permission(self.permissions(), permission)
    }

    /// String form used in tokens and configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Instructor => "instructor",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> AuthResult<Self> {
        match s {
            "user" => Ok(Role::User),
            "instructor" => Ok(Role::Instructor),
            "admin" => Ok(Role::Admin),
            "super_admin" => Ok(Role::SuperAdmin),
            other => Err(AuthError::config_error(format!("unknown role '{other}'"))),
        }
    }
}

/// Wildcard-aware membership test over a permission set
pub fn set_has_permission<S: AsRef<str>>(set: &[S], permission: &str) -> bool {
    set.iter()
        .any(|p| p.as_ref() == permission || p.as_ref() == FULL_ACCESS)
}
