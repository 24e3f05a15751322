//! Production record persistence

use crate::db::DbPool;
use crate::models::{ProductionPayload, ProductionRecord};
use crate::utils::pagination::{Page, ResolvedQuery};

pub struct ProductionRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> ProductionRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, q: &ResolvedQuery) -> Result<Page<ProductionRecord>, sqlx::Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM production_records")
            .fetch_one(self.pool)
            .await?;

        let sql = format!(
            "SELECT * FROM production_records ORDER BY {} LIMIT ? OFFSET ?",
            q.order_clause()
        );
        let items = sqlx::query_as::<_, ProductionRecord>(&sql)
            .bind(q.per_page)
            .bind(q.offset())
            .fetch_all(self.pool)
            .await?;

        Ok(Page::new(items, total, q))
    }

    pub async fn get(&self, id: i64) -> Result<Option<ProductionRecord>, sqlx::Error> {
        sqlx::query_as::<_, ProductionRecord>("SELECT * FROM production_records WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await
    }

    pub async fn create(&self, payload: &ProductionPayload) -> Result<ProductionRecord, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO production_records (product_id, employee_id, quantity_produced, date_produced) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(payload.product_id)
        .bind(payload.employee_id)
        .bind(payload.quantity_produced)
        .bind(payload.date_produced)
        .execute(self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get(id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn update(
        &self,
        id: i64,
        payload: &ProductionPayload,
    ) -> Result<Option<ProductionRecord>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE production_records SET product_id = ?, employee_id = ?, \
             quantity_produced = ?, date_produced = ? WHERE id = ?",
        )
        .bind(payload.product_id)
        .bind(payload.employee_id)
        .bind(payload.quantity_produced)
        .bind(payload.date_produced)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM production_records WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
