//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into listing-level APIs.
//! - Keep HTTP/serialization layers decoupled from storage details.
//!
//! # Invariants
//! - Services are stateless; every call builds its own query from scratch.

pub mod book_service;
pub mod category_service;
