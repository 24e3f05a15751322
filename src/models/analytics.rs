//! Analytics report rows

use chrono::NaiveDate;
use serde::Serialize;

/// Total quantity produced per employee
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct EmployeePerformance {
    pub employee_name: String,
    pub total_quantity: i64,
}

/// Best-selling products by ordered quantity
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TopProduct {
    pub product_name: String,
    pub total_sold: i64,
}

/// Customers whose lifetime order value exceeds a threshold
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CustomerValue {
    pub customer_name: String,
    pub lifetime_value: f64,
}

/// Per-product output on a given date
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductionEfficiency {
    pub product_name: String,
    pub date_produced: NaiveDate,
    pub total_produced: i64,
}
