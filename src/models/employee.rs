//! Employee model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Sortable columns for employee listings
pub const SORTABLE_FIELDS: &[&str] = &["name", "position", "email", "phone"];

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub position: String,
    pub email: String,
    pub phone: String,
}

/// Create/update payload
#[derive(Debug, Deserialize, Validate)]
pub struct EmployeePayload {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "position must not be empty"))]
    pub position: String,
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "phone must not be empty"))]
    pub phone: String,
}
