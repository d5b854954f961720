//! The prefix entity: a CIDR block and its allocation bookkeeping.

use std::collections::HashMap;
use std::fmt;

/// A CIDR block tracked by the IPAM system.
///
/// The allocation engine carves child prefixes and individual IPs out of
/// a `Prefix` and records the result in the bookkeeping maps; this crate
/// persists the whole entity as one document so that a reload yields an
/// object the engine can resume from without recomputation.
///
/// # Identity
///
/// `cidr` is the sole lookup key and is globally unique across the store.
/// `parent_cidr` is purely informational at this layer — referential
/// integrity between parent and child is the engine's responsibility.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prefix {
    /// Canonical CIDR notation, e.g. `10.0.0.0/24`. Primary key.
    pub cidr: String,

    /// CIDR of the enclosing prefix. Empty for a root prefix.
    pub parent_cidr: String,

    /// Child CIDRs carved out of this prefix, mapped to whether each is
    /// still available for allocation.
    pub available_child_prefixes: HashMap<String, bool>,

    /// Prefix length used when this prefix is subdivided into children.
    /// Zero when the prefix has never been subdivided.
    pub child_prefix_length: u8,

    /// Individual addresses within this prefix, mapped to whether each
    /// is currently allocated.
    pub ips: HashMap<String, bool>,
}

impl Prefix {
    /// Creates a prefix with empty bookkeeping.
    #[must_use]
    pub fn new(cidr: impl Into<String>, parent_cidr: impl Into<String>) -> Self {
        Self {
            cidr: cidr.into(),
            parent_cidr: parent_cidr.into(),
            ..Self::default()
        }
    }

    /// Returns `true` if this prefix has no parent.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_cidr.is_empty()
    }

    /// Number of IPs currently marked allocated within this prefix.
    #[must_use]
    pub fn allocated_ip_count(&self) -> usize {
        self.ips.values().filter(|allocated| **allocated).count()
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cidr)
    }
}
