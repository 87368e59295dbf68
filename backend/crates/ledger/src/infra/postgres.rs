//! PostgreSQL Key-Value Store

use crate::domain::repository::KeyValueStore;
use crate::error::LedgerResult;
use sqlx::PgPool;

/// PostgreSQL-backed key-value store over the `ledger_kv` table
#[derive(Clone)]
pub struct PgKvStore {
    pool: PgPool,
}

impl PgKvStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl KeyValueStore for PgKvStore {
    async fn get(&self, key: &str) -> LedgerResult<Option<String>> {
        let value = sqlx::query_scalar::<_, String>("SELECT kv_value FROM ledger_kv WHERE kv_key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> LedgerResult<()> {
        sqlx::query(
            r#"
            INSERT INTO ledger_kv (kv_key, kv_value)
            VALUES ($1, $2)
            ON CONFLICT (kv_key)
            DO UPDATE SET kv_value = EXCLUDED.kv_value, updated_at = now()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        tracing::info!(key = %key, bytes = value.len(), "Ledger value overwritten");
        Ok(())
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
    ) -> LedgerResult<bool> {
        let rows = match expected {
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO ledger_kv (kv_key, kv_value)
                    VALUES ($1, $2)
                    ON CONFLICT (kv_key) DO NOTHING
                    "#,
                )
                .bind(key)
                .bind(value)
                .execute(&self.pool)
                .await?
                .rows_affected()
            }
            Some(expected) => {
                sqlx::query(
                    r#"
                    UPDATE ledger_kv
                    SET kv_value = $3, updated_at = now()
                    WHERE kv_key = $1 AND kv_value = $2
                    "#,
                )
                .bind(key)
                .bind(expected)
                .bind(value)
                .execute(&self.pool)
                .await?
                .rows_affected()
            }
        };

        if rows == 0 {
            tracing::debug!(key = %key, "Conditional write lost");
        }

        Ok(rows == 1)
    }
}
