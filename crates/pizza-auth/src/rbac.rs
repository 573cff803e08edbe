//! Role-Based Access Control (RBAC) system
//!
//! Roles form a closed set of tags. Protected operations name the set of
//! roles they accept through a [`RoleSet`] preset instead of building lists
//! at every call site.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::AuthError;

/// Permission category attached to every user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoleType {
    Customer,
    Admin,
    Staff,
}

impl RoleType {
    /// All known roles, in seeding order
    pub const ALL: [RoleType; 3] = [RoleType::Customer, RoleType::Admin, RoleType::Staff];

    /// Canonical upper-case name, as stored and carried in tokens
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleType::Customer => "CUSTOMER",
            RoleType::Admin => "ADMIN",
            RoleType::Staff => "STAFF",
        }
    }

    /// Description used when seeding the role table
    pub fn default_description(&self) -> &'static str {
        match self {
            RoleType::Customer => "Regular customer",
            RoleType::Admin => "System administrator",
            RoleType::Staff => "Store staff",
        }
    }

    fn bit(&self) -> u8 {
        match self {
            RoleType::Customer => 0b001,
            RoleType::Admin => 0b010,
            RoleType::Staff => 0b100,
        }
    }
}

impl fmt::Display for RoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleType {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CUSTOMER" => Ok(RoleType::Customer),
            "ADMIN" => Ok(RoleType::Admin),
            "STAFF" => Ok(RoleType::Staff),
            _ => Err(AuthError::role_not_found(s)),
        }
    }
}

/// Set of roles allowed through an authorization gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoleSet {
    bits: u8,
}

impl RoleSet {
    /// A set that admits nobody
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Administrators only
    pub const fn admin_only() -> Self {
        Self { bits: 0b010 }
    }

    /// Customers and administrators
    pub const fn customer_or_admin() -> Self {
        Self { bits: 0b011 }
    }

    /// Build a set from roles
    pub fn of<I>(roles: I) -> Self
    where
        I: IntoIterator<Item = RoleType>,
    {
        roles.into_iter().fold(Self::empty(), |set, role| set.with(role))
    }

    /// Add a role to the set
    pub fn with(mut self, role: RoleType) -> Self {
        self.bits |= role.bit();
        self
    }

    /// Check membership
    pub fn contains(&self, role: RoleType) -> bool {
        self.bits & role.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Roles in the set, in declaration order
    pub fn roles(&self) -> Vec<RoleType> {
        RoleType::ALL.iter().copied().filter(|r| self.contains(*r)).collect()
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.roles().iter().map(|r| r.as_str()).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_names_round_trip() {
        for role in RoleType::ALL {
            assert_eq!(role.as_str().parse::<RoleType>().unwrap(), role);
        }
        assert_eq!("admin".parse::<RoleType>().unwrap(), RoleType::Admin);
        assert!("".parse::<RoleType>().is_err());
        assert!("ROOT".parse::<RoleType>().is_err());
    }

    #[test]
    fn test_role_serializes_upper_case() {
        let json = serde_json::to_string(&RoleType::Customer).unwrap();
        assert_eq!(json, "\"CUSTOMER\"");
        let role: RoleType = serde_json::from_str("\"STAFF\"").unwrap();
        assert_eq!(role, RoleType::Staff);
    }

    #[test]
    fn test_presets() {
        let admin = RoleSet::admin_only();
        assert!(admin.contains(RoleType::Admin));
        assert!(!admin.contains(RoleType::Customer));
        assert!(!admin.contains(RoleType::Staff));

        let shop = RoleSet::customer_or_admin();
        assert!(shop.contains(RoleType::Customer));
        assert!(shop.contains(RoleType::Admin));
        assert!(!shop.contains(RoleType::Staff));
        assert_eq!(shop, RoleSet::of([RoleType::Admin, RoleType::Customer]));
    }

    #[test]
    fn test_empty_set_admits_nobody() {
        let set = RoleSet::empty();
        assert!(set.is_empty());
        assert!(RoleType::ALL.iter().all(|r| !set.contains(*r)));
    }

    #[test]
    fn test_display() {
        assert_eq!(RoleSet::customer_or_admin().to_string(), "{CUSTOMER, ADMIN}");
        assert_eq!(RoleSet::empty().to_string(), "{}");
    }
}
