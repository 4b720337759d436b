#![forbid(unsafe_code)]

//! Canonical input and host event types.
//!
//! The host pushes [`HostEvent`] values into the engine whenever something it
//! registered on the engine's behalf fires: an interval timer, a window
//! listener, or a click inside the overlay.
//!
//! # Design Notes
//!
//! - Key codes cover the keys the tour binds plus printable characters; any
//!   other key maps to [`KeyCode::Other`] and is ignored.
//! - `KeyEventKind` defaults to `Press`; repeats count as presses, releases
//!   are dropped by consumers.

use bitflags::bitflags;

use crate::host::TimerId;

/// An event delivered by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// An interval registered through [`crate::host::Host::set_interval`] fired.
    Timer(TimerId),

    /// The window was resized.
    Resize {
        /// New viewport width in px.
        width: f64,
        /// New viewport height in px.
        height: f64,
    },

    /// A scroll event was observed (capture phase, so inner containers too).
    Scroll,

    /// A key went down while a key-down listener was registered.
    Key(KeyEvent),

    /// A click on an overlay element carrying an action attribute.
    ///
    /// The payload is the raw attribute value; the overlay layer parses it.
    OverlayAction(String),
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with default modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether this event should trigger bindings (press or auto-repeat).
    #[must_use]
    pub const fn is_press(&self) -> bool {
        matches!(self.kind, KeyEventKind::Press | KeyEventKind::Repeat)
    }

    /// Whether an open tour consumes this key (Escape and the horizontal
    /// arrows), so the host should suppress its default action.
    #[must_use]
    pub const fn is_tour_navigation(&self) -> bool {
        self.is_press() && matches!(self.code, KeyCode::Escape | KeyCode::Left | KeyCode::Right)
    }

    /// Map a DOM `KeyboardEvent.key` value to a key event.
    #[must_use]
    pub fn from_dom_key(key: &str) -> Self {
        let code = match key {
            "Escape" | "Esc" => KeyCode::Escape,
            "ArrowLeft" | "Left" => KeyCode::Left,
            "ArrowRight" | "Right" => KeyCode::Right,
            "ArrowUp" | "Up" => KeyCode::Up,
            "ArrowDown" | "Down" => KeyCode::Down,
            "Enter" => KeyCode::Enter,
            "Tab" => KeyCode::Tab,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => KeyCode::Other,
                }
            }
        };
        Self::new(code)
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable character key.
    Char(char),
    Enter,
    Escape,
    Tab,
    Left,
    Right,
    Up,
    Down,
    /// Any key the engine does not bind.
    Other,
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not available).
    #[default]
    Press,

    /// Key is being held (auto-repeat).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Meta/Cmd key.
        const META  = 0b1000;
    }
}
