//! Domain layer: the prefix entity tracked by the IPAM system.
//!
//! This module contains the in-memory representation of a CIDR block and
//! its allocation bookkeeping. How that state is persisted lives in
//! [`crate::persistence`]; how it is mutated lives in the allocation
//! engine, outside this crate.

pub mod prefix;

pub use prefix::Prefix;
