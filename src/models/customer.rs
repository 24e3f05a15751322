//! Customer model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Sortable columns for customer listings
pub const SORTABLE_FIELDS: &[&str] = &["name", "email", "phone"];

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Create/update payload
#[derive(Debug, Deserialize, Validate)]
pub struct CustomerPayload {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "phone must not be empty"))]
    pub phone: String,
}
