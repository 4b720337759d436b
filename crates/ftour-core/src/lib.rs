#![forbid(unsafe_code)]

//! Core: geometry, host abstraction, events, configuration, and target tracking
//! for the ftour guided-tour engine.
//!
//! Everything here is host-driven. The embedding environment (a browser, a
//! headless test page) owns the real DOM, timers, and listeners; the engine
//! reaches them only through [`host::Host`] and learns about their firing
//! through [`event::HostEvent`] values pushed back by the host.

pub mod config;
pub mod event;
pub mod geometry;
pub mod host;
pub mod logging;
pub mod script;
pub mod target;
pub mod tracker;

#[cfg(any(test, feature = "memory-host"))]
pub mod memory_host;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, trace};
