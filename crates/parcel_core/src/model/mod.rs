//! Domain model for tracked parcels.
//!
//! # Responsibility
//! - Define the canonical record exchanged with the parcel store.
//!
//! # Invariants
//! - Every parcel is identified by an engine-generated `ParcelNumber`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod parcel;
