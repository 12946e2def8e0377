//! Parcel domain model.
//!
//! # Responsibility
//! - Define the exchange type passed between callers and the parcel store.
//! - Name the well-known status values used by the delivery workflow.
//!
//! # Invariants
//! - `number` is assigned by the storage engine and never reused.
//! - `client` and `created_at` are fixed at creation time.
//! - Only `STATUS_REGISTERED` carries meaning for the store; every other
//!   status is an opaque tag.

use serde::{Deserialize, Serialize};

/// Engine-generated primary key of a parcel row.
pub type ParcelNumber = i64;

/// Identifier of the client owning a parcel.
pub type ClientId = i64;

/// Initial status. Address changes and deletion are allowed only here.
pub const STATUS_REGISTERED: &str = "registered";
/// Parcel has left the sender.
pub const STATUS_SENT: &str = "sent";
/// Parcel reached its destination.
pub const STATUS_DELIVERED: &str = "delivered";

/// Tracked shipment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
    /// Zero until the store assigns a key on insert.
    pub number: ParcelNumber,
    pub client: ClientId,
    pub status: String,
    pub address: String,
    /// RFC3339 timestamp supplied by the caller.
    pub created_at: String,
}

impl Parcel {
    /// Creates an unsaved parcel in the `registered` state.
    pub fn registered(
        client: ClientId,
        address: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            number: 0,
            client,
            status: STATUS_REGISTERED.to_string(),
            address: address.into(),
            created_at: created_at.into(),
        }
    }

    /// Returns whether address changes and deletion are currently permitted.
    pub fn is_registered(&self) -> bool {
        self.status == STATUS_REGISTERED
    }

    /// Returns the status that follows the current one in the delivery chain.
    ///
    /// `None` for `delivered` and for statuses outside the chain.
    pub fn next_status(&self) -> Option<&'static str> {
        match self.status.as_str() {
            STATUS_REGISTERED => Some(STATUS_SENT),
            STATUS_SENT => Some(STATUS_DELIVERED),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Parcel, STATUS_DELIVERED, STATUS_REGISTERED, STATUS_SENT};

    #[test]
    fn registered_constructor_leaves_number_unassigned() {
        let parcel = Parcel::registered(7, "somewhere", "2024-01-01T00:00:00Z");
        assert_eq!(parcel.number, 0);
        assert_eq!(parcel.status, STATUS_REGISTERED);
        assert!(parcel.is_registered());
    }

    #[test]
    fn next_status_walks_the_delivery_chain() {
        let mut parcel = Parcel::registered(7, "somewhere", "2024-01-01T00:00:00Z");
        assert_eq!(parcel.next_status(), Some(STATUS_SENT));

        parcel.status = STATUS_SENT.to_string();
        assert_eq!(parcel.next_status(), Some(STATUS_DELIVERED));

        parcel.status = STATUS_DELIVERED.to_string();
        assert_eq!(parcel.next_status(), None);

        parcel.status = "lost".to_string();
        assert_eq!(parcel.next_status(), None);
        assert!(!parcel.is_registered());
    }
}
