//! Product persistence

use crate::db::DbPool;
use crate::models::{Product, ProductPayload};
use crate::utils::pagination::{Page, ResolvedQuery};

pub struct ProductRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> ProductRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, q: &ResolvedQuery) -> Result<Page<Product>, sqlx::Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;

        let sql = format!(
            "SELECT * FROM products ORDER BY {} LIMIT ? OFFSET ?",
            q.order_clause()
        );
        let items = sqlx::query_as::<_, Product>(&sql)
            .bind(q.per_page)
            .bind(q.offset())
            .fetch_all(self.pool)
            .await?;

        Ok(Page::new(items, total, q))
    }

    pub async fn get(&self, id: i64) -> Result<Option<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await
    }

    pub async fn create(&self, payload: &ProductPayload) -> Result<Product, sqlx::Error> {
        let result = sqlx::query("INSERT INTO products (name, price) VALUES (?, ?)")
            .bind(&payload.name)
            .bind(payload.price)
            .execute(self.pool)
            .await?;

        let id = result.last_insert_rowid();
        self.get(id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn update(
        &self,
        id: i64,
        payload: &ProductPayload,
    ) -> Result<Option<Product>, sqlx::Error> {
        let result = sqlx::query("UPDATE products SET name = ?, price = ? WHERE id = ?")
            .bind(&payload.name)
            .bind(payload.price)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
