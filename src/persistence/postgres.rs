//! PostgreSQL implementation of the prefix storage contract.
//!
//! One row per prefix in the `prefixes` table:
//!
//! ```sql
//! CREATE TABLE prefixes (
//!     cidr   TEXT PRIMARY KEY,
//!     prefix JSONB NOT NULL
//! );
//! ```
//!
//! The primary key on `cidr` is part of the contract, not an
//! optimization: `create_prefix`'s existence pre-check and its insert run
//! in separate transactions, so two concurrent creates for the same CIDR
//! can both observe "absent". The unique constraint turns that race into
//! a detectable violation, which the loser resolves by re-reading the
//! winner's row.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::PrefixStorage;
use super::models::PrefixRecord;
use crate::config::StoreConfig;
use crate::domain::Prefix;
use crate::error::StoreError;

/// PostgreSQL-backed prefix store using `sqlx::PgPool`.
///
/// Cheap to clone; all clones share the underlying connection pool. Safe
/// for concurrent use — every operation is an independent query or
/// single-statement transaction against the pool.
#[derive(Debug, Clone)]
pub struct PrefixStore {
    pool: PgPool,
}

impl PrefixStore {
    /// Creates a store over an existing connection pool.
    ///
    /// The caller owns connection setup and the `prefixes` schema; this
    /// layer assumes both are in place.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Builds a connection pool from [`StoreConfig`] and wraps it.
    ///
    /// Convenience for binaries that have no pool of their own.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`sqlx::Error`] if the pool cannot be
    /// established.
    pub async fn connect(config: &StoreConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        tracing::info!(url = %config.database_url, "connected prefix store");
        Ok(Self::new(pool))
    }

    /// Returns a reference to the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn encode(prefix: &Prefix) -> Result<serde_json::Value, StoreError> {
        serde_json::to_value(PrefixRecord::from(prefix))
            .map_err(|e| StoreError::Encode(format!("{}: {e}", prefix.cidr)))
    }

    fn decode(document: serde_json::Value) -> Result<Prefix, StoreError> {
        serde_json::from_value::<PrefixRecord>(document)
            .map(Prefix::from)
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PrefixStorage for PrefixStore {
    async fn create_prefix(&self, prefix: &Prefix) -> Result<Prefix, StoreError> {
        // Pre-check: create-if-absent returns the stored value untouched.
        match self.read_prefix(&prefix.cidr).await {
            Ok(existing) => {
                tracing::debug!(cidr = %prefix.cidr, "create found existing prefix");
                return Ok(existing);
            }
            Err(StoreError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let document = Self::encode(prefix)?;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Transaction(format!("begin create {}: {e}", prefix.cidr)))?;

        let inserted = sqlx::query("INSERT INTO prefixes (cidr, prefix) VALUES ($1, $2)")
            .bind(&prefix.cidr)
            .bind(&document)
            .execute(&mut *tx)
            .await;

        match inserted {
            Ok(_) => {
                tx.commit().await.map_err(|e| {
                    StoreError::Transaction(format!("commit create {}: {e}", prefix.cidr))
                })?;
                Ok(prefix.clone())
            }
            Err(e)
                if e.as_database_error()
                    .is_some_and(|db| db.is_unique_violation()) =>
            {
                // Lost the create race: a concurrent caller inserted this
                // CIDR between the pre-check and our insert. Hand back the
                // winner's row.
                tx.rollback().await.ok();
                tracing::debug!(cidr = %prefix.cidr, "create lost insert race, returning winner");
                self.read_prefix(&prefix.cidr).await
            }
            Err(e) => Err(StoreError::Transaction(format!(
                "insert {}: {e}",
                prefix.cidr
            ))),
        }
    }

    async fn read_prefix(&self, cidr: &str) -> Result<Prefix, StoreError> {
        let document =
            sqlx::query_scalar::<_, serde_json::Value>("SELECT prefix FROM prefixes WHERE cidr=$1")
                .bind(cidr)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::Read(format!("{cidr}: {e}")))?
                .ok_or_else(|| StoreError::NotFound(cidr.to_string()))?;

        Self::decode(document)
    }

    async fn read_all_prefixes(&self) -> Result<Vec<Prefix>, StoreError> {
        let documents = sqlx::query_scalar::<_, serde_json::Value>("SELECT prefix FROM prefixes")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Read(e.to_string()))?;

        // A single corrupt document aborts the whole read; partial results
        // would let the allocation engine resume from an incomplete view.
        documents.into_iter().map(Self::decode).collect()
    }

    async fn update_prefix(&self, prefix: &Prefix) -> Result<Prefix, StoreError> {
        let document = Self::encode(prefix)?;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Transaction(format!("begin update {}: {e}", prefix.cidr)))?;

        let result = sqlx::query("UPDATE prefixes SET prefix=$1 WHERE cidr=$2")
            .bind(&document)
            .bind(&prefix.cidr)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Transaction(format!("update {}: {e}", prefix.cidr)))?;

        tx.commit()
            .await
            .map_err(|e| StoreError::Transaction(format!("commit update {}: {e}", prefix.cidr)))?;

        if result.rows_affected() == 0 {
            tracing::debug!(cidr = %prefix.cidr, "update affected no rows");
        }
        Ok(prefix.clone())
    }

    async fn delete_prefix(&self, prefix: &Prefix) -> Result<Prefix, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Transaction(format!("begin delete {}: {e}", prefix.cidr)))?;

        let result = sqlx::query("DELETE FROM prefixes WHERE cidr=$1")
            .bind(&prefix.cidr)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Transaction(format!("delete {}: {e}", prefix.cidr)))?;

        tx.commit()
            .await
            .map_err(|e| StoreError::Transaction(format!("commit delete {}: {e}", prefix.cidr)))?;

        if result.rows_affected() == 0 {
            tracing::debug!(cidr = %prefix.cidr, "delete affected no rows");
        }
        Ok(prefix.clone())
    }
}
