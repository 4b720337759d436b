#![forbid(unsafe_code)]

//! Error types.

use std::fmt;

use ftour_core::host::HostError;
use ftour_overlay::portal::PortalError;

use crate::descriptor::DescriptorError;

/// Errors surfaced by the tour provider and catalog.
#[derive(Debug)]
pub enum TourError {
    /// Another provider currently owns the overlay.
    OverlayInUse { owner: u64 },
    /// The host could not mount the overlay container.
    Mount(HostError),
    /// A tour descriptor failed to parse or validate.
    Descriptor(DescriptorError),
    /// No tour with this id is registered.
    UnknownTour(String),
}

impl fmt::Display for TourError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TourError::OverlayInUse { owner } => {
                write!(f, "overlay is in use by another tour (owner {owner})")
            }
            TourError::Mount(e) => write!(f, "overlay mount failed: {e}"),
            TourError::Descriptor(e) => write!(f, "invalid tour descriptor: {e}"),
            TourError::UnknownTour(id) => write!(f, "unknown tour: {id}"),
        }
    }
}

impl std::error::Error for TourError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TourError::Mount(e) => Some(e),
            TourError::Descriptor(e) => Some(e),
            TourError::OverlayInUse { .. } | TourError::UnknownTour(_) => None,
        }
    }
}

impl From<PortalError> for TourError {
    fn from(e: PortalError) -> Self {
        match e {
            PortalError::InUse { owner } => TourError::OverlayInUse { owner: owner.get() },
            PortalError::Mount(e) => TourError::Mount(e),
        }
    }
}

impl From<DescriptorError> for TourError {
    fn from(e: DescriptorError) -> Self {
        TourError::Descriptor(e)
    }
}

/// Result type for tour operations.
pub type TourResult<T> = Result<T, TourError>;
