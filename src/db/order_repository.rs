//! Order persistence

use crate::db::DbPool;
use crate::models::Order;
use crate::utils::pagination::{Page, ResolvedQuery};

pub struct OrderRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> OrderRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, q: &ResolvedQuery) -> Result<Page<Order>, sqlx::Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(self.pool)
            .await?;

        let sql = format!(
            "SELECT * FROM orders ORDER BY {} LIMIT ? OFFSET ?",
            q.order_clause()
        );
        let items = sqlx::query_as::<_, Order>(&sql)
            .bind(q.per_page)
            .bind(q.offset())
            .fetch_all(self.pool)
            .await?;

        Ok(Page::new(items, total, q))
    }

    pub async fn get(&self, id: i64) -> Result<Option<Order>, sqlx::Error> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await
    }

    /// Insert an order whose total has already been computed from the
    /// product's current price.
    pub async fn create(
        &self,
        customer_id: i64,
        product_id: i64,
        quantity: i64,
        total_price: f64,
    ) -> Result<Order, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO orders (customer_id, product_id, quantity, total_price) VALUES (?, ?, ?, ?)",
        )
        .bind(customer_id)
        .bind(product_id)
        .bind(quantity)
        .bind(total_price)
        .execute(self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get(id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn update_quantity(
        &self,
        id: i64,
        quantity: i64,
        total_price: f64,
    ) -> Result<Option<Order>, sqlx::Error> {
        let result = sqlx::query("UPDATE orders SET quantity = ?, total_price = ? WHERE id = ?")
            .bind(quantity)
            .bind(total_price)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
