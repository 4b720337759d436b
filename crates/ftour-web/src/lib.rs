#![forbid(unsafe_code)]

//! Browser host for ftour.
//!
//! - [`html`] serializes overlay markup for the portal container.
//! - [`handles`] maps identity-only host objects to integer handles.
//! - [`queue`] carries DOM callbacks back into the engine.
//! - On `wasm32`, `DomHost` implements [`ftour_core::host::Host`] over the
//!   live document and `FtourWeb` exposes the provider to JavaScript.
//!
//! Native builds compile only the target-independent parts so the workspace
//! checks and tests without a browser.

pub mod handles;
pub mod html;
pub mod queue;

#[cfg(target_arch = "wasm32")]
pub mod dom;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use dom::DomHost;
#[cfg(target_arch = "wasm32")]
pub use wasm::FtourWeb;

pub use handles::HandleTable;
pub use html::PaintCache;
pub use queue::HostEventQueue;
