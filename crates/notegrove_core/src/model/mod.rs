//! Domain model for the folder/note tree.
//!
//! # Responsibility
//! - Define the arena-backed tree shape shared by materialization and the
//!   index adapter.
//!
//! # Invariants
//! - Every node is identified by a stable `NodeId` arena handle.
//! - Parent back-references never own their target; the arena owns all
//!   nodes.

pub mod node;
