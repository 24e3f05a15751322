//! Order model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Sortable columns for order listings
pub const SORTABLE_FIELDS: &[&str] = &["created_at", "quantity", "total_price"];

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    /// Computed at creation time as product price times quantity
    pub total_price: f64,
    pub created_at: DateTime<Utc>,
}

/// Order creation payload. The total price is never client-supplied.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub customer_id: i64,
    pub product_id: i64,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i64,
}
