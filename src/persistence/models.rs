//! Stored document shape for prefix records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::Prefix;

/// The document stored in the `prefix` column of the `prefixes` table.
///
/// A distinct type from [`Prefix`] on purpose: the entity and its stored
/// shape are converted explicitly at the storage boundary, so the
/// document layout never leaks from field visibility or rename churn on
/// the domain type. Field names serialize in PascalCase (`Cidr`,
/// `AvailableChildPrefixes`, `IPs`, ...) to stay byte-compatible with
/// documents written by other implementations of this layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PrefixRecord {
    /// Canonical CIDR notation. Duplicated into the `cidr` key column.
    pub cidr: String,

    /// CIDR of the enclosing prefix, empty for a root prefix.
    pub parent_cidr: String,

    /// Child CIDRs carved out of this prefix and their availability.
    pub available_child_prefixes: HashMap<String, bool>,

    /// Prefix length used when subdividing into children.
    pub child_prefix_length: u8,

    /// Allocation flag per individual address.
    #[serde(rename = "IPs")]
    pub ips: HashMap<String, bool>,
}

impl From<&Prefix> for PrefixRecord {
    fn from(prefix: &Prefix) -> Self {
        Self {
            cidr: prefix.cidr.clone(),
            parent_cidr: prefix.parent_cidr.clone(),
            available_child_prefixes: prefix.available_child_prefixes.clone(),
            child_prefix_length: prefix.child_prefix_length,
            ips: prefix.ips.clone(),
        }
    }
}

impl From<PrefixRecord> for Prefix {
    fn from(record: PrefixRecord) -> Self {
        Self {
            cidr: record.cidr,
            parent_cidr: record.parent_cidr,
            available_child_prefixes: record.available_child_prefixes,
            child_prefix_length: record.child_prefix_length,
            ips: record.ips,
        }
    }
}
