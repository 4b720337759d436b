#![forbid(unsafe_code)]

//! Clickable overlay actions.

use core::fmt;
use core::str::FromStr;

/// Attribute that carries an action on an overlay element.
pub const ACTION_ATTR: &str = "data-ftour-action";

/// What a click on an overlay control asks the controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayAction {
    Next,
    Prev,
    Close,
    /// Jump to a step index (progress dots).
    GoTo(usize),
}

impl fmt::Display for OverlayAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Next => f.write_str("next"),
            Self::Prev => f.write_str("prev"),
            Self::Close => f.write_str("close"),
            Self::GoTo(index) => write!(f, "goto:{index}"),
        }
    }
}

/// An action attribute that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseActionError(String);

impl fmt::Display for ParseActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown overlay action: {:?}", self.0)
    }
}

impl std::error::Error for ParseActionError {}

impl FromStr for OverlayAction {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "next" => Ok(Self::Next),
            "prev" => Ok(Self::Prev),
            "close" => Ok(Self::Close),
            other => other
                .strip_prefix("goto:")
                .and_then(|n| n.parse().ok())
                .map(Self::GoTo)
                .ok_or_else(|| ParseActionError(s.to_owned())),
        }
    }
}
