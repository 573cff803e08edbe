//! Identity records: users and roles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::rbac::RoleType;
use crate::AuthError;

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "ACTIVE",
            UserStatus::Inactive => "INACTIVE",
            UserStatus::Suspended => "SUSPENDED",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ACTIVE" => Ok(UserStatus::Active),
            "INACTIVE" => Ok(UserStatus::Inactive),
            "SUSPENDED" => Ok(UserStatus::Suspended),
            other => Err(AuthError::validation(format!("Unknown user status: {}", other))),
        }
    }
}

/// Named permission category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: i64,
    pub name: RoleType,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn new(id: i64, name: RoleType) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            description: Some(name.default_description().to_string()),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Stored user account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub role_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub role: Option<Role>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// The single source of truth for "may this account sign in".
    ///
    /// Status and the soft-deletion timestamp are both consulted; callers must
    /// never compare either field directly.
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active && self.deleted_at.is_none()
    }

    /// Role carried in issued tokens. Accounts without an attached role get
    /// the least privileged one.
    pub fn role_type(&self) -> RoleType {
        self.role.as_ref().map(|r| r.name).unwrap_or(RoleType::Customer)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role.as_ref().map(|r| r.name), Some(RoleType::Admin))
    }

    pub fn is_customer(&self) -> bool {
        matches!(self.role.as_ref().map(|r| r.name), Some(RoleType::Customer))
    }
}

/// Data required to create a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub role_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
}

/// Partial update applied to an existing user
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<UserStatus>,
}

impl UserUpdate {
    /// Apply the present fields to a user record
    pub fn apply_to(&self, user: &mut User) {
        if let Some(first_name) = &self.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &self.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            user.phone = Some(phone.clone());
        }
        if let Some(status) = self.status {
            user.status = status;
        }
        user.updated_at = Utc::now();
    }
}

#[cfg(test)]
pub(crate) fn sample_user(status: UserStatus) -> User {
    let now = Utc::now();
    User {
        id: 7,
        role_id: 1,
        first_name: "Ana".to_string(),
        last_name: "Gomez".to_string(),
        email: "ana@test.com".to_string(),
        password_hash: "$2b$04$notarealhash".to_string(),
        phone: None,
        status,
        created_at: now,
        updated_at: now,
        deleted_at: None,
        role: Some(Role::new(1, RoleType::Customer)),
    }
}
