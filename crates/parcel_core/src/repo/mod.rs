//! Repository layer for parcel persistence.
//!
//! # Responsibility
//! - Define the caller-facing parcel storage contract.
//! - Keep SQLite query details out of service code.
//!
//! # Invariants
//! - Status-gated mutations are expressed as predicates of a single
//!   statement, never as read-then-write sequences.

pub mod parcel_repo;
