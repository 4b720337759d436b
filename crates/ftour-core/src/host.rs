#![forbid(unsafe_code)]

//! The host abstraction: everything the engine needs from a DOM.
//!
//! A [`Host`] answers synchronous reads (selector queries, bounding rects,
//! body style) and owns the registrations the engine makes on its behalf
//! (interval timers, window listeners, the portal mount node). Registrations
//! are identified by opaque ids; when one fires, the host pushes a
//! [`crate::event::HostEvent`] back into the engine.
//!
//! Script-facing operations (navigation, typing, clicking) have default
//! implementations that report [`HostError::Unsupported`], so a host that only
//! displays tours implements the first block of methods and nothing else.

use core::fmt;
use core::time::Duration;

use crate::geometry::{Rect, Size};

macro_rules! handle_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw id value.
            #[inline]
            pub const fn get(self) -> u64 {
                self.0
            }
        }
    };
}

handle_id!(
    /// Opaque handle to a DOM element owned by the host.
    ElementId
);
handle_id!(
    /// Handle to an interval timer registered with the host.
    TimerId
);
handle_id!(
    /// Handle to a window listener registered with the host.
    ListenerId
);
handle_id!(
    /// Handle to a detached top-level mount node.
    PortalId
);

/// Window listeners the engine registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// `resize` on the window.
    Resize,
    /// `scroll`; with `capture` the host listens in the capture phase so
    /// scrolling of inner containers is observed too.
    Scroll { capture: bool },
    /// `keydown` on the window.
    KeyDown,
}

/// Host operation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The host does not implement the operation.
    Unsupported(&'static str),
    /// The element handle no longer refers to a mounted element.
    Detached(ElementId),
    /// The element exists but cannot take the operation (e.g. not an input).
    NotApplicable {
        element: ElementId,
        operation: &'static str,
    },
    /// Underlying DOM call failed.
    Dom(String),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported(op) => write!(f, "unsupported host operation: {op}"),
            Self::Detached(id) => write!(f, "element {} is not mounted", id.get()),
            Self::NotApplicable { element, operation } => {
                write!(f, "element {} does not support {operation}", element.get())
            }
            Self::Dom(msg) => write!(f, "dom error: {msg}"),
        }
    }
}

impl std::error::Error for HostError {}

/// The DOM surface the engine runs against.
pub trait Host {
    /// First element matching `selector`, if any.
    fn query_selector(&self, selector: &str) -> Option<ElementId>;

    /// All elements matching `selector`, in document order.
    fn query_selector_all(&self, selector: &str) -> Vec<ElementId>;

    /// Viewport-relative bounding box; `None` when the handle is stale or does
    /// not refer to an element.
    fn bounding_client_rect(&self, element: ElementId) -> Option<Rect>;

    /// Text content of the element.
    fn text_content(&self, element: ElementId) -> Option<String>;

    /// Current viewport size.
    fn viewport(&self) -> Size;

    /// Monotonic host clock.
    fn now(&self) -> Duration;

    /// Register a repeating timer.
    fn set_interval(&mut self, period: Duration) -> TimerId;

    /// Cancel a timer. Unknown ids are ignored.
    fn clear_interval(&mut self, timer: TimerId);

    /// Register a window listener.
    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId;

    /// Remove a listener. Unknown ids are ignored.
    fn remove_listener(&mut self, listener: ListenerId);

    /// Inline `overflow` on `document.body`; `None` when unset.
    fn body_overflow(&self) -> Option<String>;

    /// Set (or with `None`, clear) inline `overflow` on `document.body`.
    fn set_body_overflow(&mut self, value: Option<&str>);

    /// Append a detached container node to the document body.
    fn mount_portal(&mut self) -> Result<PortalId, HostError>;

    /// Remove a container created by [`Host::mount_portal`].
    fn unmount_portal(&mut self, portal: PortalId);

    /// Current route (path) of the host application.
    fn current_route(&self) -> Option<String> {
        None
    }

    /// Ask the host application to navigate.
    fn navigate(&mut self, route: &str) -> Result<(), HostError> {
        let _ = route;
        Err(HostError::Unsupported("navigate"))
    }

    /// Focus an element.
    fn focus(&mut self, element: ElementId) -> Result<(), HostError> {
        let _ = element;
        Err(HostError::Unsupported("focus"))
    }

    /// Set an input/select value and fire `input` + `change`.
    fn set_value(&mut self, element: ElementId, value: &str) -> Result<(), HostError> {
        let _ = (element, value);
        Err(HostError::Unsupported("set_value"))
    }

    /// Current value of an input/select.
    fn value(&self, element: ElementId) -> Option<String> {
        let _ = element;
        None
    }

    /// Dispatch a bubbling click on the element.
    fn click(&mut self, element: ElementId) -> Result<(), HostError> {
        let _ = element;
        Err(HostError::Unsupported("click"))
    }

    /// Scroll the element into the center of the viewport.
    fn scroll_into_view(&mut self, element: ElementId) -> Result<(), HostError> {
        let _ = element;
        Err(HostError::Unsupported("scroll_into_view"))
    }

    /// Scroll the window back to the top.
    fn scroll_to_top(&mut self) -> Result<(), HostError> {
        Err(HostError::Unsupported("scroll_to_top"))
    }
}
