//! Analytics aggregate queries

use chrono::NaiveDate;

use crate::db::DbPool;
use crate::models::analytics::{
    CustomerValue, EmployeePerformance, ProductionEfficiency, TopProduct,
};

/// How many best-selling products the top-products report returns
const TOP_PRODUCTS_LIMIT: i64 = 10;

pub struct AnalyticsRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> AnalyticsRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Total quantity produced per employee, most productive first.
    /// Records without an employee are excluded by the join.
    pub async fn employee_performance(&self) -> Result<Vec<EmployeePerformance>, sqlx::Error> {
        sqlx::query_as::<_, EmployeePerformance>(
            "SELECT e.name AS employee_name, SUM(pr.quantity_produced) AS total_quantity \
             FROM production_records pr \
             JOIN employees e ON e.id = pr.employee_id \
             GROUP BY e.id \
             ORDER BY total_quantity DESC, e.name ASC",
        )
        .fetch_all(self.pool)
        .await
    }

    pub async fn top_products(&self) -> Result<Vec<TopProduct>, sqlx::Error> {
        sqlx::query_as::<_, TopProduct>(
            "SELECT p.name AS product_name, SUM(o.quantity) AS total_sold \
             FROM orders o \
             JOIN products p ON p.id = o.product_id \
             GROUP BY p.id \
             ORDER BY total_sold DESC, p.name ASC \
             LIMIT ?",
        )
        .bind(TOP_PRODUCTS_LIMIT)
        .fetch_all(self.pool)
        .await
    }

    /// Customers whose summed order value exceeds the threshold.
    pub async fn customer_lifetime_value(
        &self,
        threshold: f64,
    ) -> Result<Vec<CustomerValue>, sqlx::Error> {
        sqlx::query_as::<_, CustomerValue>(
            "SELECT c.name AS customer_name, SUM(o.total_price) AS lifetime_value \
             FROM orders o \
             JOIN customers c ON c.id = o.customer_id \
             GROUP BY c.id \
             HAVING SUM(o.total_price) > ? \
             ORDER BY lifetime_value DESC",
        )
        .bind(threshold)
        .fetch_all(self.pool)
        .await
    }

    /// Per-product output for a single day.
    pub async fn production_efficiency(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<ProductionEfficiency>, sqlx::Error> {
        sqlx::query_as::<_, ProductionEfficiency>(
            "SELECT p.name AS product_name, pr.date_produced AS date_produced, \
                    SUM(pr.quantity_produced) AS total_produced \
             FROM production_records pr \
             JOIN products p ON p.id = pr.product_id \
             WHERE pr.date_produced = ? \
             GROUP BY p.id, pr.date_produced \
             ORDER BY total_produced DESC",
        )
        .bind(date)
        .fetch_all(self.pool)
        .await
    }
}
