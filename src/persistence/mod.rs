//! Persistence layer: durable storage of prefix allocation state.
//!
//! Provides the [`PrefixStorage`] trait — the contract between the
//! allocation engine and durable storage — together with two backends:
//! [`postgres::PrefixStore`] over `sqlx::PgPool` and an in-process
//! [`memory::MemoryStore`].

use async_trait::async_trait;

use crate::domain::Prefix;
use crate::error::StoreError;

pub mod memory;
pub mod models;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PrefixStore;

/// Storage contract for prefix persistence.
///
/// All implementations share the same semantics:
///
/// - `create_prefix` is create-if-absent: when the CIDR is already stored
///   the *existing* value is returned unchanged and the call succeeds —
///   the caller's new data is discarded. Two concurrent creates for the
///   same CIDR result in exactly one stored record; the loser observes
///   the winner's value.
/// - `update_prefix` and `delete_prefix` of an unknown CIDR succeed
///   silently (zero rows affected).
/// - Each mutation is atomic on its own; there is no atomicity across
///   calls.
#[async_trait]
pub trait PrefixStorage: Send + Sync {
    /// Stores a new prefix, or returns the already-stored one for its CIDR.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Encode`] if the prefix cannot be serialized
    /// and [`StoreError::Transaction`] if the insert or commit fails.
    async fn create_prefix(&self, prefix: &Prefix) -> Result<Prefix, StoreError>;

    /// Reads the prefix stored under `cidr`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no record exists,
    /// [`StoreError::Read`] when the lookup fails, and
    /// [`StoreError::Decode`] when the stored document cannot be parsed.
    async fn read_prefix(&self, cidr: &str) -> Result<Prefix, StoreError>;

    /// Reads every stored prefix, in storage-defined order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] when the bulk query fails and
    /// [`StoreError::Decode`] when any single document cannot be parsed —
    /// one corrupt record aborts the whole read.
    async fn read_all_prefixes(&self) -> Result<Vec<Prefix>, StoreError>;

    /// Overwrites the stored record for the prefix's CIDR.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Encode`] or [`StoreError::Transaction`]
    /// analogous to `create_prefix`. An unknown CIDR is not an error.
    async fn update_prefix(&self, prefix: &Prefix) -> Result<Prefix, StoreError>;

    /// Deletes the stored record for the prefix's CIDR.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Transaction`] if the delete or commit fails.
    /// An unknown CIDR is not an error.
    async fn delete_prefix(&self, prefix: &Prefix) -> Result<Prefix, StoreError>;
}
