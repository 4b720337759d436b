#![forbid(unsafe_code)]

//! Tour session state machine.
//!
//! Two states: closed, or open on a step index that is always in range.
//! Every transition is a pure function of the current state and returns the
//! [`TourEvent`] it produced, or `None` when nothing changed.

use std::rc::Rc;

use ftour_core::event::{KeyCode, KeyEvent};
use ftour_overlay::step::TourStep;

/// Immutable step list shared by everything that renders a session.
pub type TourStepList = Rc<[TourStep]>;

/// Why the current step changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourAdvanceReason {
    /// An auto-advance key was observed.
    Auto,
    ManualNext,
    ManualPrev,
    Jump,
}

/// Observable session transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourEvent {
    Opened {
        index: usize,
    },
    StepChanged {
        from: usize,
        to: usize,
        reason: TourAdvanceReason,
    },
    /// Next on the last step.
    Finished {
        last_index: usize,
    },
    /// Dismissed before the end.
    Closed {
        from: usize,
    },
}

impl TourEvent {
    /// Whether this event leaves the session closed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished { .. } | Self::Closed { .. })
    }
}

/// Session state as a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourState {
    Closed,
    Open(usize),
}

/// Holds the step list, the open flag and the current index.
#[derive(Debug, Clone)]
pub struct TourController {
    steps: TourStepList,
    is_open: bool,
    current: usize,
    keyboard_navigation: bool,
}

impl Default for TourController {
    fn default() -> Self {
        Self::new()
    }
}

impl TourController {
    pub fn new() -> Self {
        Self {
            steps: Rc::from(Vec::new()),
            is_open: false,
            current: 0,
            keyboard_navigation: true,
        }
    }

    /// Enable or disable Escape / arrow key handling.
    pub fn set_keyboard_navigation(&mut self, enabled: bool) {
        self.keyboard_navigation = enabled;
    }

    pub fn keyboard_navigation(&self) -> bool {
        self.keyboard_navigation
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Current index; 0 whenever closed.
    pub fn current_step_index(&self) -> usize {
        self.current
    }

    pub fn state(&self) -> TourState {
        if self.is_open {
            TourState::Open(self.current)
        } else {
            TourState::Closed
        }
    }

    pub fn steps(&self) -> &TourStepList {
        &self.steps
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// The step being shown, if open.
    pub fn current_step(&self) -> Option<&TourStep> {
        if self.is_open {
            self.steps.get(self.current)
        } else {
            None
        }
    }

    /// Open on `steps` at `start_at`, clamped into range.
    ///
    /// An empty list leaves the controller untouched.
    pub fn open(&mut self, steps: impl Into<TourStepList>, start_at: usize) -> Option<TourEvent> {
        let steps = steps.into();
        if steps.is_empty() {
            return None;
        }
        let index = start_at.min(steps.len() - 1);
        self.steps = steps;
        self.current = index;
        self.is_open = true;
        tracing::debug!(index, count = self.steps.len(), "tour opened");
        Some(TourEvent::Opened { index })
    }

    /// Next step; on the last step this finishes the tour.
    pub fn next(&mut self) -> Option<TourEvent> {
        self.advance(TourAdvanceReason::ManualNext)
    }

    /// Move forward with an explicit reason.
    pub fn advance(&mut self, reason: TourAdvanceReason) -> Option<TourEvent> {
        if !self.is_open {
            return None;
        }
        let from = self.current;
        if from + 1 >= self.steps.len() {
            self.reset();
            tracing::debug!(last_index = from, ?reason, "tour finished");
            return Some(TourEvent::Finished { last_index: from });
        }
        self.current = from + 1;
        tracing::debug!(from, to = self.current, ?reason, "tour step changed");
        Some(TourEvent::StepChanged {
            from,
            to: self.current,
            reason,
        })
    }

    /// Previous step; a no-op on the first step.
    pub fn prev(&mut self) -> Option<TourEvent> {
        if !self.is_open || self.current == 0 {
            return None;
        }
        let from = self.current;
        self.current -= 1;
        tracing::debug!(from, to = self.current, "tour step changed");
        Some(TourEvent::StepChanged {
            from,
            to: self.current,
            reason: TourAdvanceReason::ManualPrev,
        })
    }

    /// Jump to `index`, clamped into `[0, len - 1]`.
    pub fn go_to(&mut self, index: isize) -> Option<TourEvent> {
        if !self.is_open {
            return None;
        }
        let last = self.steps.len().saturating_sub(1);
        let to = usize::try_from(index).unwrap_or(0).min(last);
        if to == self.current {
            return None;
        }
        let from = self.current;
        self.current = to;
        tracing::debug!(from, to, "tour jumped");
        Some(TourEvent::StepChanged {
            from,
            to,
            reason: TourAdvanceReason::Jump,
        })
    }

    /// Close and reset the index. Closing a closed tour does nothing.
    pub fn close(&mut self) -> Option<TourEvent> {
        if !self.is_open {
            return None;
        }
        let from = self.current;
        self.reset();
        tracing::debug!(from, "tour closed");
        Some(TourEvent::Closed { from })
    }

    /// Escape closes, right arrow advances, left arrow goes back.
    pub fn handle_key(&mut self, key: &KeyEvent) -> Option<TourEvent> {
        if !self.is_open || !self.keyboard_navigation || !key.is_tour_navigation() {
            return None;
        }
        match key.code {
            KeyCode::Escape => self.close(),
            KeyCode::Right => self.next(),
            KeyCode::Left => self.prev(),
            _ => None,
        }
    }

    fn reset(&mut self) {
        self.is_open = false;
        self.current = 0;
    }
}
