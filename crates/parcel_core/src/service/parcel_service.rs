//! Parcel use-case service.
//!
//! # Responsibility
//! - Provide the delivery workflow on top of the parcel store: register,
//!   advance status, change address, cancel.
//! - Stamp `created_at` for newly registered parcels.
//!
//! # Invariants
//! - Service APIs never bypass the repository; the `registered` gate stays
//!   inside the store's statements.
//! - Service layer remains storage-agnostic.

use crate::model::parcel::{ClientId, Parcel, ParcelNumber};
use crate::repo::parcel_repo::{ParcelRepository, RepoError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub type ParcelServiceResult<T> = Result<T, ParcelServiceError>;

/// Service error for parcel use-cases.
#[derive(Debug)]
pub enum ParcelServiceError {
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Current time could not be rendered as RFC3339.
    Timestamp(String),
}

impl Display for ParcelServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Timestamp(message) => write!(f, "timestamp format failed: {message}"),
        }
    }
}

impl Error for ParcelServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Timestamp(_) => None,
        }
    }
}

impl From<RepoError> for ParcelServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Use-case service wrapper for the parcel workflow.
pub struct ParcelService<R: ParcelRepository> {
    repo: R,
}

impl<R: ParcelRepository> ParcelService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new parcel for `client` stamped with the current UTC time.
    ///
    /// Returns the stored parcel including its assigned number.
    pub fn register(
        &self,
        client: ClientId,
        address: impl Into<String>,
    ) -> ParcelServiceResult<Parcel> {
        let mut parcel = Parcel::registered(client, address, now_rfc3339()?);
        parcel.number = self.repo.add(&parcel)?;

        info!(
            "event=parcel_register module=service status=ok number={} client={}",
            parcel.number, parcel.client
        );
        Ok(parcel)
    }

    /// Loads one parcel by number.
    pub fn get(&self, number: ParcelNumber) -> ParcelServiceResult<Parcel> {
        Ok(self.repo.get(number)?)
    }

    /// Lists all parcels owned by `client`, in no particular order.
    pub fn parcels_of_client(&self, client: ClientId) -> ParcelServiceResult<Vec<Parcel>> {
        Ok(self.repo.get_by_client(client)?)
    }

    /// Moves a parcel one step along `registered -> sent -> delivered`.
    ///
    /// Returns the status written, or `None` when the parcel is already
    /// delivered, carries a status outside the chain, or had its status
    /// changed by someone else between the read and the write.
    pub fn next_status(&self, number: ParcelNumber) -> ParcelServiceResult<Option<String>> {
        let parcel = self.repo.get(number)?;
        let Some(next) = parcel.next_status() else {
            return Ok(None);
        };

        // Conditional on the status just read, so a concurrent writer wins.
        if !self.repo.advance_status(number, &parcel.status, next)? {
            info!(
                "event=parcel_next_status module=service status=skipped number={} from={}",
                number, parcel.status
            );
            return Ok(None);
        }
        info!(
            "event=parcel_next_status module=service status=ok number={} from={} to={}",
            number, parcel.status, next
        );
        Ok(Some(next.to_string()))
    }

    /// Requests an address change. Has no effect unless still `registered`.
    pub fn change_address(
        &self,
        number: ParcelNumber,
        address: impl AsRef<str>,
    ) -> ParcelServiceResult<()> {
        Ok(self.repo.set_address(number, address.as_ref())?)
    }

    /// Requests deletion. Has no effect unless still `registered`.
    pub fn delete(&self, number: ParcelNumber) -> ParcelServiceResult<()> {
        Ok(self.repo.delete(number)?)
    }
}

fn now_rfc3339() -> ParcelServiceResult<String> {
    let now = OffsetDateTime::now_utc();
    // Whole seconds, like `2024-01-01T00:00:00Z`.
    let now = now.replace_nanosecond(0).unwrap_or(now);
    now.format(&Rfc3339)
        .map_err(|err| ParcelServiceError::Timestamp(err.to_string()))
}
