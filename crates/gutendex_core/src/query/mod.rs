//! Listing request parsing and composition.
//!
//! # Responsibility
//! - Turn untrusted query parameters into typed filters and page windows.
//! - Build absolute links that echo the inbound request.
//!
//! # Invariants
//! - Nothing in this module touches storage.
//! - Parsing is total: malformed input degrades, it never errors.

pub mod filter;
pub mod link;
pub mod page;
pub mod params;
