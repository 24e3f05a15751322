//! Production record model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Sortable columns for production record listings
pub const SORTABLE_FIELDS: &[&str] = &["date_produced", "quantity_produced"];

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductionRecord {
    pub id: i64,
    pub product_id: i64,
    /// Optional: some records predate per-employee tracking
    pub employee_id: Option<i64>,
    pub quantity_produced: i64,
    pub date_produced: NaiveDate,
}

/// Create/update payload
#[derive(Debug, Deserialize, Validate)]
pub struct ProductionPayload {
    pub product_id: i64,
    pub employee_id: Option<i64>,
    #[validate(range(min = 1, message = "quantity_produced must be at least 1"))]
    pub quantity_produced: i64,
    pub date_produced: NaiveDate,
}
