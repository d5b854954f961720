//! # ipam-store
//!
//! Durable persistence layer for an IP address management (IPAM) system.
//!
//! This crate stores [`domain::Prefix`] records — CIDR blocks, their parent
//! links, and the allocation state inside each block — in PostgreSQL, one row
//! per CIDR with the full state encoded as a JSONB document. All allocation
//! decisions (which child prefix or IP to hand out) belong to the calling
//! allocation engine; this crate only persists the result.
//!
//! ## Architecture
//!
//! ```text
//! Allocation engine (external)
//!     │
//!     ├── PrefixStorage trait (persistence/)
//!     │       ├── PrefixStore  — PostgreSQL, sqlx::PgPool
//!     │       └── MemoryStore  — in-process HashMap
//!     │
//!     ├── Prefix (domain/)
//!     └── PrefixRecord (persistence/models) — stored document shape
//! ```
//!
//! Every mutation runs in its own transaction; the `cidr` primary key is the
//! only cross-call consistency mechanism (see [`persistence::postgres`]).

pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
