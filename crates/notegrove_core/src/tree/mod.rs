//! Tree materialization and the addressable index adapter.
//!
//! # Responsibility
//! - Rebuild the recursive folder/note tree from flat gateway rows.
//! - Expose the tree through a row/column/handle index protocol with
//!   change notifications and an id → address cache.
//!
//! # Invariants
//! - The synthetic root is never addressable through the protocol.
//! - Tree and identity index mutate inside the same synchronous call.

pub mod index_model;
pub mod materialize;
