#![forbid(unsafe_code)]

//! The detached overlay mount node.
//!
//! One container node per thread, appended to the document body on first
//! acquisition and removed when the last holder releases it. The node has a
//! single owner at a time: a second owner asking for the slot while it is
//! held is refused, so two tours can never draw on top of each other.

use core::fmt;
use std::cell::{Cell, RefCell};

use ftour_core::host::{Host, HostError, PortalId};

/// Identity of an overlay owner (one per provider).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(u64);

thread_local! {
    static NEXT_OWNER: Cell<u64> = const { Cell::new(1) };
    static SLOT: RefCell<SlotState> = const { RefCell::new(SlotState { portal: None, owner: None, refs: 0 }) };
}

impl OwnerId {
    /// A fresh owner identity.
    pub fn next() -> Self {
        NEXT_OWNER.with(|next| {
            let id = next.get();
            next.set(id + 1);
            Self(id)
        })
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct SlotState {
    portal: Option<PortalId>,
    owner: Option<OwnerId>,
    refs: usize,
}

/// Why the slot could not be acquired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortalError {
    /// Another owner holds the overlay.
    InUse { owner: OwnerId },
    /// The host failed to create the container.
    Mount(HostError),
}

impl fmt::Display for PortalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InUse { owner } => write!(f, "overlay already owned by {}", owner.0),
            Self::Mount(err) => write!(f, "failed to mount overlay container: {err}"),
        }
    }
}

impl std::error::Error for PortalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Mount(err) => Some(err),
            Self::InUse { .. } => None,
        }
    }
}

impl From<HostError> for PortalError {
    fn from(err: HostError) -> Self {
        Self::Mount(err)
    }
}

/// A held claim on the overlay container.
#[must_use = "an overlay slot must be released through OverlaySlot::release"]
#[derive(Debug)]
pub struct OverlaySlot {
    portal: PortalId,
    owner: OwnerId,
}

impl OverlaySlot {
    /// Claim the container for `owner`, mounting it if needed.
    ///
    /// The same owner may hold several claims; each must be released.
    pub fn acquire(host: &mut dyn Host, owner: OwnerId) -> Result<Self, PortalError> {
        SLOT.with(|slot| {
            let mut state = slot.borrow_mut();
            match state.owner {
                Some(current) if current != owner => {
                    return Err(PortalError::InUse { owner: current });
                }
                _ => {}
            }
            let portal = match state.portal {
                Some(portal) => portal,
                None => {
                    let portal = host.mount_portal()?;
                    tracing::trace!(portal = portal.get(), owner = owner.0, "overlay container mounted");
                    state.portal = Some(portal);
                    portal
                }
            };
            state.owner = Some(owner);
            state.refs += 1;
            Ok(Self { portal, owner })
        })
    }

    /// The container this claim renders into.
    pub fn portal(&self) -> PortalId {
        self.portal
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Drop the claim; the last claim unmounts the container.
    pub fn release(self, host: &mut dyn Host) {
        SLOT.with(|slot| {
            let mut state = slot.borrow_mut();
            state.refs = state.refs.saturating_sub(1);
            if state.refs == 0 {
                if let Some(portal) = state.portal.take() {
                    host.unmount_portal(portal);
                    tracing::trace!(portal = portal.get(), "overlay container unmounted");
                }
                state.owner = None;
            }
        });
    }
}

/// Owner currently holding the container on this thread.
pub fn current_owner() -> Option<OwnerId> {
    SLOT.with(|slot| slot.borrow().owner)
}
