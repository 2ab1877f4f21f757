//! Bill documents. The full bill is kept as JSONB; id, owner and timestamps
//! are mirrored into columns for lookups and ordering.

use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use super::{BillRepository, PgStore, StoreError};
use crate::bill::Bill;

#[async_trait]
impl BillRepository for PgStore {
    async fn insert_bill(&self, bill: &Bill) -> Result<(), StoreError> {
        let document = serde_json::to_value(bill)?;
        sqlx::query(
            r#"
            INSERT INTO bills (id, user_id, document, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(bill.id)
        .bind(bill.user_id)
        .bind(document)
        .bind(bill.created_at)
        .bind(bill.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_bill(&self, id: Uuid) -> Result<Option<Bill>, StoreError> {
        let row: Option<(Json<Bill>,)> =
            sqlx::query_as("SELECT document FROM bills WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(Json(bill),)| bill))
    }

    async fn list_bills(&self, owner: Option<Uuid>) -> Result<Vec<Bill>, StoreError> {
        let rows: Vec<(Json<Bill>,)> = match owner {
            Some(user_id) => {
                sqlx::query_as(
                    "SELECT document FROM bills WHERE user_id = $1 ORDER BY created_at DESC",
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as("SELECT document FROM bills ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows.into_iter().map(|(Json(bill),)| bill).collect())
    }

    async fn replace_bill(&self, bill: &Bill) -> Result<bool, StoreError> {
        let document = serde_json::to_value(bill)?;
        let result = sqlx::query(
            "UPDATE bills SET document = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(bill.id)
        .bind(document)
        .bind(bill.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_bill(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM bills WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
