#![forbid(unsafe_code)]

//! Step targets: what a tour step points at.

use core::fmt;
use std::rc::Rc;

use crate::host::{ElementId, Host};

/// Zero-argument element getter, evaluated against the host on every poll.
#[derive(Clone)]
pub struct Resolver(Rc<dyn Fn(&dyn Host) -> Option<ElementId>>);

impl Resolver {
    /// Wrap a getter.
    pub fn new(f: impl Fn(&dyn Host) -> Option<ElementId> + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Run the getter.
    pub fn resolve(&self, host: &dyn Host) -> Option<ElementId> {
        (self.0)(host)
    }

    /// Identity comparison; two clones of the same getter are equal.
    pub fn ptr_eq(&self, other: &Resolver) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Resolver(..)")
    }
}

/// A reference to a DOM target, resolved lazily because the element may not
/// exist until the user navigates somewhere.
#[derive(Debug, Clone, Default)]
pub enum Target {
    /// No target; the overlay shows its centered placeholder.
    #[default]
    None,
    /// CSS selector, preferably attribute-based (`[data-tour-id="..."]`).
    Selector(String),
    /// A handle the caller already holds.
    Element(ElementId),
    /// A getter evaluated on every resolution.
    Resolver(Resolver),
}

impl Target {
    /// Selector target.
    pub fn selector(selector: impl Into<String>) -> Self {
        Self::Selector(selector.into())
    }

    /// Getter target.
    pub fn resolver(f: impl Fn(&dyn Host) -> Option<ElementId> + 'static) -> Self {
        Self::Resolver(Resolver::new(f))
    }

    /// Resolve against the host. Empty selectors resolve to nothing.
    pub fn resolve(&self, host: &dyn Host) -> Option<ElementId> {
        match self {
            Self::None => None,
            Self::Selector(selector) if selector.trim().is_empty() => None,
            Self::Selector(selector) => host.query_selector(selector),
            Self::Element(id) => Some(*id),
            Self::Resolver(resolver) => resolver.resolve(host),
        }
    }

    /// Whether two targets denote the same thing without resolving them.
    pub fn same_as(&self, other: &Target) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Selector(a), Self::Selector(b)) => a == b,
            (Self::Element(a), Self::Element(b)) => a == b,
            (Self::Resolver(a), Self::Resolver(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// The selector string, when this is a selector target.
    pub fn as_selector(&self) -> Option<&str> {
        match self {
            Self::Selector(selector) => Some(selector),
            _ => None,
        }
    }
}

impl From<&str> for Target {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_owned())
    }
}

impl From<String> for Target {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

impl From<ElementId> for Target {
    fn from(id: ElementId) -> Self {
        Self::Element(id)
    }
}
