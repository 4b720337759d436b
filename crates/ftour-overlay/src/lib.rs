#![forbid(unsafe_code)]

//! Tour steps and the spotlight overlay.
//!
//! [`overlay::OverlayRenderer`] is pure: it maps a step, its index and the
//! tracked rect to a [`markup::Node`] tree and a [`placement::TooltipPosition`].
//! The two process-wide resources an open overlay holds, the body scroll lock
//! and the detached mount node, live in [`scroll_lock`] and [`portal`].

pub mod action;
pub mod markup;
pub mod overlay;
pub mod placement;
pub mod portal;
pub mod scroll_lock;
pub mod step;

pub use action::OverlayAction;
pub use markup::{Element, Node};
pub use overlay::{OverlayRenderer, OverlayState, OverlayView};
pub use placement::{Coord, TooltipPosition, Translate, compute_tooltip_position};
pub use portal::{OverlaySlot, OwnerId, PortalError};
pub use scroll_lock::ScrollLockToken;
pub use step::{Placement, StepContent, StepContext, StepMeta, TourStep};
