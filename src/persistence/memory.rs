//! In-memory implementation of the prefix storage contract.
//!
//! Backs the same [`PrefixStorage`] semantics as the PostgreSQL store
//! with a `HashMap` behind a single [`tokio::sync::RwLock`]. Useful for
//! embedding an IPAM engine without a database and for exercising the
//! storage contract in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::PrefixStorage;
use crate::domain::Prefix;
use crate::error::StoreError;

/// In-process prefix store.
///
/// Where the PostgreSQL store relies on the `cidr` primary key to make
/// the create race safe, this store holds the write lock across the
/// existence check and the insert, so the race cannot occur at all.
#[derive(Debug, Default)]
pub struct MemoryStore {
    prefixes: RwLock<HashMap<String, Prefix>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PrefixStorage for MemoryStore {
    async fn create_prefix(&self, prefix: &Prefix) -> Result<Prefix, StoreError> {
        let mut prefixes = self.prefixes.write().await;
        if let Some(existing) = prefixes.get(&prefix.cidr) {
            tracing::debug!(cidr = %prefix.cidr, "create found existing prefix");
            return Ok(existing.clone());
        }
        prefixes.insert(prefix.cidr.clone(), prefix.clone());
        Ok(prefix.clone())
    }

    async fn read_prefix(&self, cidr: &str) -> Result<Prefix, StoreError> {
        self.prefixes
            .read()
            .await
            .get(cidr)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(cidr.to_string()))
    }

    async fn read_all_prefixes(&self) -> Result<Vec<Prefix>, StoreError> {
        Ok(self.prefixes.read().await.values().cloned().collect())
    }

    async fn update_prefix(&self, prefix: &Prefix) -> Result<Prefix, StoreError> {
        let mut prefixes = self.prefixes.write().await;
        match prefixes.get_mut(&prefix.cidr) {
            Some(stored) => *stored = prefix.clone(),
            // Matches the SQL contract: an UPDATE that matches no row is
            // a silent no-op, never an implicit insert.
            None => tracing::debug!(cidr = %prefix.cidr, "update affected no rows"),
        }
        Ok(prefix.clone())
    }

    async fn delete_prefix(&self, prefix: &Prefix) -> Result<Prefix, StoreError> {
        let mut prefixes = self.prefixes.write().await;
        if prefixes.remove(&prefix.cidr).is_none() {
            tracing::debug!(cidr = %prefix.cidr, "delete affected no rows");
        }
        Ok(prefix.clone())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;

    fn allocated_prefix(cidr: &str, parent: &str) -> Prefix {
        let mut prefix = Prefix::new(cidr, parent);
        prefix.child_prefix_length = 28;
        prefix
            .available_child_prefixes
            .insert(format!("{cidr}-child"), true);
        prefix.ips.insert("10.0.0.1".to_string(), true);
        prefix
    }

    #[tokio::test]
    async fn create_then_read_round_trips() {
        let store = MemoryStore::new();
        let prefix = allocated_prefix("10.0.0.0/24", "10.0.0.0/16");

        let created = store.create_prefix(&prefix).await;
        assert!(created.is_ok());

        let read = store.read_prefix("10.0.0.0/24").await;
        assert_eq!(read.ok(), Some(prefix));
    }

    #[tokio::test]
    async fn create_is_idempotent_and_keeps_first_value() {
        let store = MemoryStore::new();
        let first = allocated_prefix("10.0.0.0/24", "");

        let mut second = first.clone();
        second.ips.insert("10.0.0.99".to_string(), true);

        let _ = store.create_prefix(&first).await;
        let result = store.create_prefix(&second).await;

        // The second create succeeds but returns the first stored value.
        assert_eq!(result.ok(), Some(first.clone()));

        let all = store.read_all_prefixes().await.unwrap_or_default();
        assert_eq!(all.len(), 1);
        assert_eq!(store.read_prefix("10.0.0.0/24").await.ok(), Some(first));
    }

    #[tokio::test]
    async fn update_overwrites_bookkeeping() {
        let store = MemoryStore::new();
        let original = allocated_prefix("10.0.0.0/24", "");
        let _ = store.create_prefix(&original).await;

        let mut updated = original.clone();
        updated.ips.insert("10.0.0.7".to_string(), true);
        updated
            .available_child_prefixes
            .insert("10.0.0.16/28".to_string(), false);

        let result = store.update_prefix(&updated).await;
        assert!(result.is_ok());

        let read = store.read_prefix("10.0.0.0/24").await;
        assert_eq!(read.ok(), Some(updated));
    }

    #[tokio::test]
    async fn update_of_unknown_cidr_silently_succeeds() {
        let store = MemoryStore::new();
        let phantom = allocated_prefix("172.16.0.0/12", "");
        let result = store.update_prefix(&phantom).await;
        assert!(result.is_ok());

        // The no-op update must not have inserted anything.
        let read = store.read_prefix("172.16.0.0/12").await;
        assert!(matches!(read, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_then_read_is_not_found() {
        let store = MemoryStore::new();
        let prefix = allocated_prefix("10.0.0.0/24", "");
        let _ = store.create_prefix(&prefix).await;

        let deleted = store.delete_prefix(&prefix).await;
        assert!(deleted.is_ok());

        let read = store.read_prefix("10.0.0.0/24").await;
        assert!(matches!(read, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_of_unknown_cidr_silently_succeeds() {
        let store = MemoryStore::new();
        let phantom = Prefix::new("192.0.2.0/24", "");
        let result = store.delete_prefix(&phantom).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn read_all_returns_every_stored_prefix() {
        let store = MemoryStore::new();
        let cidrs = ["10.0.0.0/24", "10.0.1.0/24", "10.0.2.0/24"];
        for cidr in cidrs {
            let _ = store.create_prefix(&allocated_prefix(cidr, "10.0.0.0/16")).await;
        }

        let all = store.read_all_prefixes().await.unwrap_or_default();
        let seen: HashSet<String> = all.iter().map(|p| p.cidr.clone()).collect();
        assert_eq!(seen, cidrs.iter().map(|c| (*c).to_string()).collect());

        for prefix in all {
            assert_eq!(prefix.parent_cidr, "10.0.0.0/16");
            assert_eq!(prefix.child_prefix_length, 28);
        }
    }

    #[tokio::test]
    async fn read_all_of_empty_store_is_empty() {
        let store = MemoryStore::new();
        let all = store.read_all_prefixes().await.unwrap_or_default();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn concurrent_creates_store_exactly_one_prefix() {
        let store = Arc::new(MemoryStore::new());

        let mut first = Prefix::new("10.0.0.0/24", "");
        first.ips.insert("10.0.0.1".to_string(), true);
        let mut second = Prefix::new("10.0.0.0/24", "");
        second.ips.insert("10.0.0.2".to_string(), true);

        let store_a = Arc::clone(&store);
        let store_b = Arc::clone(&store);
        let a = tokio::spawn(async move { store_a.create_prefix(&first).await });
        let b = tokio::spawn(async move { store_b.create_prefix(&second).await });

        let result_a = a.await.ok().and_then(Result::ok);
        let result_b = b.await.ok().and_then(Result::ok);

        // Both calls succeed and agree on the winner's value.
        assert!(result_a.is_some());
        assert_eq!(result_a, result_b);

        let all = store.read_all_prefixes().await.unwrap_or_default();
        assert_eq!(all.len(), 1);
        assert_eq!(all.first().cloned(), result_a);
    }
}
