//! User roles and the access policy between them

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Access role attached to every user account and token
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Whether a holder of `self` may access an endpoint requiring `required`.
    ///
    /// The rule is exact-match-or-super-admin. There is no ordering between
    /// `user` and `admin`: an admin token does not satisfy a user-only
    /// requirement.
    pub fn satisfies(self, required: Role) -> bool {
        self == required || self == Role::SuperAdmin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        };
        f.write_str(s)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "super_admin" => Ok(Role::SuperAdmin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn super_admin_satisfies_everything() {
        assert!(Role::SuperAdmin.satisfies(Role::User));
        assert!(Role::SuperAdmin.satisfies(Role::Admin));
        assert!(Role::SuperAdmin.satisfies(Role::SuperAdmin));
    }

    #[test]
    fn roles_are_not_ordered() {
        assert!(!Role::Admin.satisfies(Role::User));
        assert!(!Role::Admin.satisfies(Role::SuperAdmin));
        assert!(!Role::User.satisfies(Role::Admin));
        assert!(Role::User.satisfies(Role::User));
    }

    #[test]
    fn serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&Role::SuperAdmin).unwrap(),
            "\"super_admin\""
        );
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for role in [Role::User, Role::Admin, Role::SuperAdmin] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
    }
}
