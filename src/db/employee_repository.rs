//! Employee persistence

use crate::db::DbPool;
use crate::models::{Employee, EmployeePayload};
use crate::utils::pagination::{Page, ResolvedQuery};

pub struct EmployeeRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> EmployeeRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, q: &ResolvedQuery) -> Result<Page<Employee>, sqlx::Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees")
            .fetch_one(self.pool)
            .await?;

        // order_clause is built from the validated sort allow-list
        let sql = format!(
            "SELECT * FROM employees ORDER BY {} LIMIT ? OFFSET ?",
            q.order_clause()
        );
        let items = sqlx::query_as::<_, Employee>(&sql)
            .bind(q.per_page)
            .bind(q.offset())
            .fetch_all(self.pool)
            .await?;

        Ok(Page::new(items, total, q))
    }

    pub async fn get(&self, id: i64) -> Result<Option<Employee>, sqlx::Error> {
        sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await
    }

    pub async fn create(&self, payload: &EmployeePayload) -> Result<Employee, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO employees (name, position, email, phone) VALUES (?, ?, ?, ?)",
        )
        .bind(&payload.name)
        .bind(&payload.position)
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
        payload: &EmployeePayload,
    ) -> Result<Option<Employee>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE employees SET name = ?, position = ?, email = ?, phone = ? WHERE id = ?",
        )
        .bind(&payload.name)
        .bind(&payload.position)
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
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
