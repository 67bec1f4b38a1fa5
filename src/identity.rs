//! Identity records and the in-memory credential store

use crate::rbac::Role;
use crate::traits::{IdentityStore, Principal};
use crate::{AuthError, AuthResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Account lifecycle status; only `Active` accounts may authenticate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveStatus {
    Active,
    Inactive,
    Suspended,
    Pending,
}

/// The authoritative account record.
///
/// Permissions are not stored: they are always derived from `role`, so a
/// role change re-derives them by construction and there are no per-user
/// overrides to drift out of sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque unique identifier, immutable
    pub id: String,

    /// Login email, stored lowercased
    pub email: String,

    /// One-way password hash; never serialized outward
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Current role
    pub role: Role,

    /// Account lifecycle status
    pub active_status: ActiveStatus,

    /// Consecutive failed login attempts
    pub login_attempts: u32,

    /// While `now < lock_until` the account is locked regardless of
    /// password correctness. An expired value reads as unlocked but is only
    /// cleared on the next login success or failure (lazy cleanup), so its
    /// absence must not be read as "never locked".
    pub lock_until: Option<DateTime<Utc>>,

    /// Updated on every successful authenticated request
    pub last_active: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    /// Create a new active identity with a fresh id
    pub fn new(email: &str, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_lowercase(),
            password_hash,
            role,
            active_status: ActiveStatus::Active,
            login_attempts: 0,
            lock_until: None,
            last_active: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the account may authenticate at all
    pub fn is_active(&self) -> bool {
        self.active_status == ActiveStatus::Active
    }

    /// Permissions derived from the current role
    pub fn permissions(&self) -> Vec<String> {
        self.role
            .permissions()
            .iter()
            .map(|p| p.to_string())
            .collect()
    }

    /// Build the request-scoped principal view
    pub fn to_principal(&self, now: DateTime<Utc>) -> Principal {
        Principal {
            user_id: self.id.clone(),
            email: self.email.clone(),
            role: self.role,
            permissions: self.permissions(),
            authenticated_at: now,
        }
    }
}

/// Partial update applied via [`IdentityStore::save`].
///
/// Covers the narrow field set the auth core mutates; `None` fields are
/// left untouched. `lock_until` is doubly optional so the update can
/// distinguish "leave as-is" from "clear the lock".
#[derive(Debug, Clone, Default)]
pub struct IdentityUpdate {
    pub role: Option<Role>,
    pub active_status: Option<ActiveStatus>,
    pub password_hash: Option<String>,
    pub login_attempts: Option<u32>,
    pub lock_until: Option<Option<DateTime<Utc>>>,
    pub last_active: Option<DateTime<Utc>>,
}

impl IdentityUpdate {
    /// Update capturing the lockout bookkeeping of one login attempt
    pub fn attempt_state(attempts: u32, lock_until: Option<DateTime<Utc>>) -> Self {
        Self {
            login_attempts: Some(attempts),
            lock_until: Some(lock_until),
            ..Self::default()
        }
    }

    /// Update recording request activity
    pub fn touch(now: DateTime<Utc>) -> Self {
        Self {
            last_active: Some(now),
            ..Self::default()
        }
    }

    /// Apply this update to a record in place
    pub fn apply(&self, identity: &mut Identity, now: DateTime<Utc>) {
        if let Some(role) = self.role {
            identity.role = role;
        }
        if let Some(status) = self.active_status {
            identity.active_status = status;
        }
        if let Some(hash) = &self.password_hash {
            identity.password_hash = hash.clone();
        }
        if let Some(attempts) = self.login_attempts {
            identity.login_attempts = attempts;
        }
        if let Some(lock_until) = self.lock_until {
            identity.lock_until = lock_until;
        }
        if let Some(last_active) = self.last_active {
            identity.last_active = Some(last_active);
        }
        identity.updated_at = now;
    }
}

/// In-memory credential store for tests and single-process deployments.
///
/// The backing map serializes per-record writes through the `RwLock`, which
/// is what the concurrency contract of the auth core assumes of any store.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    records: RwLock<HashMap<String, Identity>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_by_id(&self, id: &str) -> AuthResult<Option<Identity>> {
        let records = self.records.read().await;
        Ok(records.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<Identity>> {
        let needle = email.to_lowercase();
        let records = self.records.read().await;
        Ok(records.values().find(|i| i.email == needle).cloned())
    }

    async fn save(&self, id: &str, update: IdentityUpdate) -> AuthResult<()> {
        let mut records = self.records.write().await;
        let identity = records
            .get_mut(id)
            .ok_or(AuthError::UserNotFound)?;
        update.apply(identity, Utc::now());
        Ok(())
    }

    async fn insert(&self, identity: Identity) -> AuthResult<()> {
        let mut records = self.records.write().await;
        records.insert(identity.id.clone(), identity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_identity() -> Identity {
        Identity::new("Student@Example.EDU", "$2b$04$hash".to_string(), Role::User)
    }

    #[test]
    fn test_email_is_lowercased() {
        let identity = sample_identity();
        assert_eq!(identity.email, "student@example.edu");
    }

    #[test]
    fn test_permissions_follow_role() {
        let mut identity = sample_identity();
        assert!(identity.permissions().contains(&"take:quizzes".to_string()));

        identity.role = Role::Admin;
        let permissions = identity.permissions();
        assert!(permissions.contains(&"manage:users".to_string()));
        // Derived set is exactly the admin table, nothing carried over
        assert!(!permissions.contains(&"take:quizzes".to_string()));
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let identity = sample_identity();
        let json = serde_json::to_string(&identity).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("$2b$04$hash"));
    }

    #[test]
    fn test_update_apply_is_partial() {
        let mut identity = sample_identity();
        let created = identity.created_at;
        let now = Utc::now();

        IdentityUpdate::attempt_state(3, None).apply(&mut identity, now);
        assert_eq!(identity.login_attempts, 3);
        assert_eq!(identity.lock_until, None);
        assert_eq!(identity.role, Role::User);
        assert_eq!(identity.created_at, created);

        let lock = Some(now + chrono::Duration::hours(2));
        IdentityUpdate::attempt_state(5, lock).apply(&mut identity, now);
        assert_eq!(identity.lock_until, lock);

        // Default update clears nothing
        IdentityUpdate::default().apply(&mut identity, now);
        assert_eq!(identity.lock_until, lock);
        assert_eq!(identity.login_attempts, 5);
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryIdentityStore::new();
        let identity = sample_identity();
        let id = identity.id.clone();
        store.insert(identity).await.unwrap();

        let found = store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(found.id, id);

        // Case-insensitive email lookup
        let found = store
            .find_by_email("STUDENT@example.edu")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, id);

        assert!(store.find_by_id("missing").await.unwrap().is_none());
        assert!(store
            .find_by_email("nobody@example.edu")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_memory_store_save() {
        let store = MemoryIdentityStore::new();
        let identity = sample_identity();
        let id = identity.id.clone();
        store.insert(identity).await.unwrap();

        store
            .save(&id, IdentityUpdate::attempt_state(2, None))
            .await
            .unwrap();
        let found = store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(found.login_attempts, 2);

        let err = store
            .save("missing", IdentityUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::UserNotFound);
    }
}
