//! In-memory user and role store
//!
//! Backs the development server when no database is configured, and the test
//! suites. Roles are seeded on construction with ids 1 (CUSTOMER), 2 (ADMIN)
//! and 3 (STAFF).

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::{
    models::{NewUser, Role, User, UserStatus, UserUpdate},
    rbac::RoleType,
    traits::{RoleRepository, UserRepository},
    AuthError, AuthResult,
};

#[derive(Debug)]
struct Tables {
    users: BTreeMap<i64, User>,
    next_user_id: i64,
}

/// Users and roles held behind a single async lock
#[derive(Debug)]
pub struct InMemoryAuthStore {
    roles: Vec<Role>,
    tables: RwLock<Tables>,
    writes: AtomicUsize,
}

impl InMemoryAuthStore {
    /// Empty user table with the standard roles
    pub fn new() -> Self {
        let roles = RoleType::ALL
            .iter()
            .enumerate()
            .map(|(idx, role)| Role::new(idx as i64 + 1, *role))
            .collect();
        Self::with_roles(roles)
    }

    /// Empty user table with an explicit role list
    pub fn with_roles(roles: Vec<Role>) -> Self {
        Self {
            roles,
            tables: RwLock::new(Tables {
                users: BTreeMap::new(),
                next_user_id: 1,
            }),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of users successfully inserted so far
    pub fn user_writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    fn role(&self, id: i64) -> Option<&Role> {
        self.roles.iter().find(|r| r.id == id)
    }

    fn with_role(&self, mut user: User) -> User {
        user.role = self.role(user.role_id).cloned();
        user
    }
}

impl Default for InMemoryAuthStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryAuthStore {
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .map(|u| self.with_role(u)))
    }

    async fn find_by_id(&self, id: i64) -> AuthResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned().map(|u| self.with_role(u)))
    }

    async fn create(&self, user: NewUser) -> AuthResult<User> {
        let mut tables = self.tables.write().await;

        // Checked under the write lock so concurrent registrations of the
        // same email cannot both succeed.
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(AuthError::EmailTaken);
        }
        if self.role(user.role_id).is_none() {
            return Err(AuthError::role_not_found(user.role_id.to_string()));
        }

        let id = tables.next_user_id;
        tables.next_user_id += 1;

        let now = Utc::now();
        let record = User {
            id,
            role_id: user.role_id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password_hash: user.password_hash,
            phone: user.phone,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            role: None,
        };
        tables.users.insert(id, record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);

        Ok(self.with_role(record))
    }

    async fn update(&self, id: i64, update: UserUpdate) -> AuthResult<User> {
        let mut tables = self.tables.write().await;

        if let Some(email) = &update.email {
            if tables.users.values().any(|u| u.id != id && &u.email == email) {
                return Err(AuthError::EmailTaken);
            }
        }

        let user = tables.users.get_mut(&id).ok_or(AuthError::UserNotFound)?;
        update.apply_to(user);
        let user = user.clone();

        Ok(self.with_role(user))
    }

    async fn delete(&self, id: i64) -> AuthResult<()> {
        let mut tables = self.tables.write().await;
        let user = tables.users.get_mut(&id).ok_or(AuthError::UserNotFound)?;
        let now = Utc::now();
        user.deleted_at = Some(now);
        user.updated_at = now;
        Ok(())
    }
}

#[async_trait]
impl RoleRepository for InMemoryAuthStore {
    async fn find_by_name(&self, name: RoleType) -> AuthResult<Option<Role>> {
        Ok(self.roles.iter().find(|r| r.name == name).cloned())
    }

    async fn find_by_id(&self, id: i64) -> AuthResult<Option<Role>> {
        Ok(self.role(id).cloned())
    }

    async fn find_all(&self) -> AuthResult<Vec<Role>> {
        Ok(self.roles.clone())
    }
}
