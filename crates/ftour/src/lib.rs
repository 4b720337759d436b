#![forbid(unsafe_code)]

//! Guided tours: session control, auto-advance, step scripts and the
//! provider that binds them to a host.
//!
//! # Example
//!
//! ```ignore
//! use ftour::{TourProvider, dispatch_tour_advance};
//! use ftour_core::config::TourConfig;
//! use ftour_overlay::TourStep;
//!
//! let mut provider = TourProvider::new(TourConfig::from_env());
//! provider.open(&mut host, vec![
//!     TourStep::new("[data-tour=\"comment-form\"]", "Write your note"),
//!     TourStep::new("[data-tour=\"comment-submit\"]", "Post it").advance_on("commentPosted"),
//! ], 0)?;
//!
//! // elsewhere in the app
//! dispatch_tour_advance("commentPosted");
//! provider.pump(&mut host);
//! ```

pub mod advance;
pub mod catalog;
pub mod controller;
pub mod descriptor;
pub mod error;
pub mod provider;
pub mod script;

pub use advance::{AutoAdvanceListener, TOUR_ADVANCE_EVENT, dispatch_tour_advance};
pub use catalog::{TourCatalog, TourDefinition, TourSummary};
pub use controller::{TourAdvanceReason, TourController, TourEvent, TourState, TourStepList};
pub use descriptor::{DescriptorError, parse_tour};
pub use error::{TourError, TourResult};
pub use provider::{LaunchStatus, TourProvider};
pub use script::{ScriptRunner, ScriptSlot};
