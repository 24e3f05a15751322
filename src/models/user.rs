//! User account model and request payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::role::Role;

/// User account as stored in the database
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Registration payload
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 64, message = "username must be 3-64 characters"))]
    pub username: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::User
}

/// Login payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Partial update payload; absent fields stay unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 64, message = "username must be 3-64 characters"))]
    pub username: Option<String>,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: Option<String>,
    pub role: Option<Role>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn password_hash_never_serialized() {
        let user = User {
            id: 1,
            username: "alice".into(),
            password_hash: "secret-hash".into(),
            role: Role::Admin,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("alice"));
    }

    #[test]
    fn short_password_fails_validation() {
        let req = CreateUserRequest {
            username: "bob".into(),
            password: "short".into(),
            role: Role::User,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn register_defaults_to_user_role() {
        let req: CreateUserRequest =
            serde_json::from_str(r#"{"username":"carol","password":"longenough"}"#).unwrap();
        assert_eq!(req.role, Role::User);
    }
}
