#![forbid(unsafe_code)]

//! Step scripts: host automation that runs when a step becomes current.
//!
//! A script is plain data, an ordered list of [`ScriptAction`]s, so it can be
//! declared in Rust or loaded from a JSON step descriptor. Scripts typically
//! navigate to the right page and wait for the step's target to mount before
//! the user reads the step. Running them is the job of the tour crate's
//! script runner.

use core::time::Duration;

/// Default timeout for element waits.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_millis(5000);
/// Default poll interval for element waits.
pub const DEFAULT_WAIT_INTERVAL: Duration = Duration::from_millis(100);

/// One script instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptAction {
    /// Navigate to `route`; with `skip_if_current`, nothing happens when the
    /// host already reports that route.
    Navigate { route: String, skip_if_current: bool },
    /// Pause.
    Wait(Duration),
    /// Poll for `selector` until it resolves or `timeout` elapses.
    WaitForElement {
        selector: String,
        timeout: Duration,
        interval: Duration,
    },
    /// Wait for an input, focus it, and set its value.
    TypeInto {
        selector: String,
        value: String,
        timeout: Duration,
    },
    /// Set a select/input value if it differs.
    SetValue { selector: String, value: String },
    /// Wait for an element and click it.
    Click { selector: String, timeout: Duration },
    /// Click the first element under `selector` whose text contains `text`
    /// (case-insensitive), falling back to the first element at all.
    ClickMatching {
        selector: String,
        text: String,
        timeout: Duration,
    },
    /// Scroll an element into the middle of the viewport.
    ScrollIntoView { selector: String },
    /// Scroll the window to the top.
    ScrollToTop,
}

impl ScriptAction {
    /// Navigate unconditionally.
    pub fn navigate(route: impl Into<String>) -> Self {
        Self::Navigate {
            route: route.into(),
            skip_if_current: false,
        }
    }

    /// Wait for an element with the default timeout and interval.
    pub fn wait_for(selector: impl Into<String>) -> Self {
        Self::WaitForElement {
            selector: selector.into(),
            timeout: DEFAULT_WAIT_TIMEOUT,
            interval: DEFAULT_WAIT_INTERVAL,
        }
    }

    /// Pause for `ms` milliseconds.
    pub fn pause_ms(ms: u64) -> Self {
        Self::Wait(Duration::from_millis(ms))
    }

    /// Click with the default timeout.
    pub fn click(selector: impl Into<String>) -> Self {
        Self::Click {
            selector: selector.into(),
            timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }

    /// Type into an input with the default timeout.
    pub fn type_into(selector: impl Into<String>, value: impl Into<String>) -> Self {
        Self::TypeInto {
            selector: selector.into(),
            value: value.into(),
            timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }

    /// Short label for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Navigate { .. } => "navigate",
            Self::Wait(_) => "wait",
            Self::WaitForElement { .. } => "wait_for_element",
            Self::TypeInto { .. } => "type_into",
            Self::SetValue { .. } => "set_value",
            Self::Click { .. } => "click",
            Self::ClickMatching { .. } => "click_matching",
            Self::ScrollIntoView { .. } => "scroll_into_view",
            Self::ScrollToTop => "scroll_to_top",
        }
    }
}

/// An ordered list of actions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepScript {
    actions: Vec<ScriptAction>,
}

impl StepScript {
    /// Empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action.
    #[must_use]
    pub fn then(mut self, action: ScriptAction) -> Self {
        self.actions.push(action);
        self
    }

    /// The actions in order.
    pub fn actions(&self) -> &[ScriptAction] {
        &self.actions
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the script does nothing.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl FromIterator<ScriptAction> for StepScript {
    fn from_iter<I: IntoIterator<Item = ScriptAction>>(iter: I) -> Self {
        Self {
            actions: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_order() {
        let script = StepScript::new()
            .then(ScriptAction::navigate("/"))
            .then(ScriptAction::pause_ms(700))
            .then(ScriptAction::wait_for("#results"));
        let names: Vec<_> = script.actions().iter().map(ScriptAction::name).collect();
        assert_eq!(names, ["navigate", "wait", "wait_for_element"]);
        assert_eq!(script.len(), 3);
    }

    #[test]
    fn helpers_use_defaults() {
        match ScriptAction::wait_for("#x") {
            ScriptAction::WaitForElement {
                timeout, interval, ..
            } => {
                assert_eq!(timeout, DEFAULT_WAIT_TIMEOUT);
                assert_eq!(interval, DEFAULT_WAIT_INTERVAL);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
