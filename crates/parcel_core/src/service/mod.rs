//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into workflow-level APIs.
//! - Keep CLI and host layers decoupled from storage details.

pub mod parcel_service;
