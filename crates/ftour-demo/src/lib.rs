#![forbid(unsafe_code)]

//! Headless tour player.
//!
//! Runs the built-in guided tours against a simulated site on the in-memory
//! host and prints what the overlay shows at every step.

pub mod cli;
pub mod player;
pub mod site;
pub mod tours;

pub use player::{AdvanceMode, Frame, PlayReport, TourPlayer};
