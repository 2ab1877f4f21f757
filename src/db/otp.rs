use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{OtpRepository, PgStore, StoreError};
use crate::otp::OtpRecord;

#[async_trait]
impl OtpRepository for PgStore {
    async fn upsert_otp(&self, record: &OtpRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO otps (email, code, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE
            SET code = EXCLUDED.code, expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(&record.email)
        .bind(&record.code)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_otp(&self, email: &str) -> Result<Option<OtpRecord>, StoreError> {
        let record = sqlx::query_as::<_, OtpRecord>(
            "SELECT email, code, expires_at FROM otps WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn delete_otp(&self, email: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM otps WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM otps WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
