//! Catalog domain model.
//!
//! # Responsibility
//! - Define the book/person/format read models used by queries.
//! - Own the public serialization shape of catalog entries.
//!
//! # Invariants
//! - Models are read-only snapshots; no persistence logic lives here.

pub mod book;
