//! Product model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Sortable columns for product listings
pub const SORTABLE_FIELDS: &[&str] = &["name", "price"];

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
}

/// Create/update payload
#[derive(Debug, Deserialize, Validate)]
pub struct ProductPayload {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
}
