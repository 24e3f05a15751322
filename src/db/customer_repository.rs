//! Customer persistence

use crate::db::DbPool;
use crate::models::{Customer, CustomerPayload};
use crate::utils::pagination::{Page, ResolvedQuery};

pub struct CustomerRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> CustomerRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, q: &ResolvedQuery) -> Result<Page<Customer>, sqlx::Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(self.pool)
            .await?;

        let sql = format!(
            "SELECT * FROM customers ORDER BY {} LIMIT ? OFFSET ?",
            q.order_clause()
        );
        let items = sqlx::query_as::<_, Customer>(&sql)
            .bind(q.per_page)
            .bind(q.offset())
            .fetch_all(self.pool)
            .await?;

        Ok(Page::new(items, total, q))
    }

    pub async fn get(&self, id: i64) -> Result<Option<Customer>, sqlx::Error> {
        sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await
    }

    pub async fn create(&self, payload: &CustomerPayload) -> Result<Customer, sqlx::Error> {
        let result = sqlx::query("INSERT INTO customers (name, email, phone) VALUES (?, ?, ?)")
            .bind(&payload.name)
            .bind(&payload.email)
            .bind(&payload.phone)
            .execute(self.pool)
            .await?;

        let id = result.last_insert_rowid();
        self.get(id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn update(
        &self,
        id: i64,
        payload: &CustomerPayload,
    ) -> Result<Option<Customer>, sqlx::Error> {
        let result = sqlx::query("UPDATE customers SET name = ?, email = ?, phone = ? WHERE id = ?")
            .bind(&payload.name)
            .bind(&payload.email)
            .bind(&payload.phone)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
