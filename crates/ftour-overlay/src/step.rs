#![forbid(unsafe_code)]

//! Tour step model.

use core::fmt;
use core::str::FromStr;
use std::rc::Rc;

use ftour_core::script::StepScript;
use ftour_core::target::Target;

use crate::action::OverlayAction;
use crate::markup::{Element, Node};

/// Where the tooltip sits relative to the target rect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Placement {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
    Center,
}

impl Placement {
    /// Lenient parse; unknown names fall back to [`Placement::Bottom`].
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
            Self::Center => "center",
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Placement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "center" | "centre" => Ok(Self::Center),
            other => Err(format!("unknown placement: {other:?}")),
        }
    }
}

/// What a render function sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepContext<'a> {
    pub step_index: usize,
    pub total: usize,
    /// Whether the step's target currently resolves.
    pub in_dom: bool,
    pub title: Option<&'a str>,
}

impl StepContext<'_> {
    pub fn is_first(&self) -> bool {
        self.step_index == 0
    }

    pub fn is_last(&self) -> bool {
        self.step_index + 1 >= self.total
    }

    /// A button that jumps to `index`.
    pub fn go_to_button(&self, index: usize, label: impl Into<String>) -> Node {
        Element::new("button")
            .class("tour-inline-button")
            .attr("type", "button")
            .action(OverlayAction::GoTo(index))
            .child(Node::text(label))
            .into()
    }

    /// A button that ends the tour.
    pub fn close_button(&self, label: impl Into<String>) -> Node {
        Element::new("button")
            .class("tour-inline-button")
            .attr("type", "button")
            .action(OverlayAction::Close)
            .child(Node::text(label))
            .into()
    }
}

type RenderFn = dyn for<'a> Fn(&StepContext<'a>) -> Node;

/// Step body.
#[derive(Clone)]
pub enum StepContent {
    Static(Node),
    /// Invoked on every render; must be pure.
    Render(Rc<RenderFn>),
}

impl StepContent {
    pub fn render<F>(f: F) -> Self
    where
        F: for<'a> Fn(&StepContext<'a>) -> Node + 'static,
    {
        Self::Render(Rc::new(f))
    }

    /// Produce the body for `ctx`.
    pub fn build(&self, ctx: &StepContext<'_>) -> Node {
        match self {
            Self::Static(node) => node.clone(),
            Self::Render(f) => f(ctx),
        }
    }
}

impl Default for StepContent {
    fn default() -> Self {
        Self::Static(Node::text(""))
    }
}

impl fmt::Debug for StepContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(node) => f.debug_tuple("Static").field(node).finish(),
            Self::Render(_) => f.write_str("Render(..)"),
        }
    }
}

impl From<Node> for StepContent {
    fn from(node: Node) -> Self {
        Self::Static(node)
    }
}

impl From<&str> for StepContent {
    fn from(text: &str) -> Self {
        Self::Static(Node::paragraph(text))
    }
}

impl From<String> for StepContent {
    fn from(text: String) -> Self {
        Self::Static(Node::paragraph(text))
    }
}

/// Per-step extras.
#[derive(Debug, Clone, Default)]
pub struct StepMeta {
    /// Event key that auto-advances past this step.
    pub advance_on: Option<String>,
    /// Automation run when the step becomes current.
    pub script: Option<StepScript>,
}

/// One stop in a tour.
#[derive(Debug, Clone, Default)]
pub struct TourStep {
    pub id: Option<String>,
    pub title: Option<String>,
    pub target: Target,
    pub content: StepContent,
    pub placement: Placement,
    /// Spotlight padding; `None` uses the configured default.
    pub padding: Option<f64>,
    /// Tooltip offset; `None` uses the configured default.
    pub offset: Option<f64>,
    pub meta: StepMeta,
}

impl TourStep {
    pub fn new(target: impl Into<Target>, content: impl Into<StepContent>) -> Self {
        Self {
            target: target.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    #[must_use]
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = Some(padding);
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = Some(offset);
        self
    }

    #[must_use]
    pub fn advance_on(mut self, key: impl Into<String>) -> Self {
        self.meta.advance_on = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_script(mut self, script: StepScript) -> Self {
        self.meta.script = Some(script);
        self
    }

    /// The auto-advance key, ignoring empty strings.
    pub fn advance_key(&self) -> Option<&str> {
        self.meta.advance_on.as_deref().filter(|k| !k.is_empty())
    }
}
