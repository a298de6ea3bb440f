//! Persistence layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the flat CRUD gateway the tree layer builds on.
//! - Keep SQL details and ordering behavior inside the repository
//!   boundary.
//!
//! # Invariants
//! - Gateways return plain rows and own no tree shape.
//! - Row ordering is storage insertion order (`rowid ASC`).

pub mod store;
