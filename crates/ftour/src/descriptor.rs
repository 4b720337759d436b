#![forbid(unsafe_code)]

//! JSON tour descriptors.
//!
//! ```json
//! {
//!   "id": "commenting",
//!   "title": "Posting a comment",
//!   "prepare": [{ "action": "navigate", "route": "/" }, { "action": "wait", "ms": 450 }],
//!   "steps": [
//!     {
//!       "selector": "[data-tour=\"comment-form\"]",
//!       "title": "Write your note",
//!       "content": ["Draft the comment here.", "Mention teammates with @Name."],
//!       "position": "left",
//!       "spotlightPadding": 10,
//!       "meta": { "advanceOn": "commentPosted" }
//!     }
//!   ]
//! }
//! ```
//!
//! `placement`/`position` and `padding`/`spotlightPadding` are accepted
//! interchangeably. Unknown placements and negative or non-finite numbers
//! are rejected.

use core::time::Duration;
use std::fmt;

use serde::{Deserialize, Serialize};

use ftour_core::script::{DEFAULT_WAIT_INTERVAL, DEFAULT_WAIT_TIMEOUT, ScriptAction, StepScript};
use ftour_core::target::Target;
use ftour_overlay::markup::{Element, Node};
use ftour_overlay::step::{Placement, TourStep};

use crate::catalog::TourDefinition;

/// Why a descriptor was rejected.
#[derive(Debug)]
pub enum DescriptorError {
    /// Malformed JSON or wrong shape.
    Json(serde_json::Error),
    /// The tour has no id.
    MissingId,
    InvalidPlacement { step: usize, value: String },
    InvalidNumber {
        step: usize,
        field: &'static str,
        value: f64,
    },
}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorError::Json(e) => write!(f, "JSON error: {e}"),
            DescriptorError::MissingId => f.write_str("tour id is empty"),
            DescriptorError::InvalidPlacement { step, value } => {
                write!(f, "step {step}: unknown placement {value:?}")
            }
            DescriptorError::InvalidNumber { step, field, value } => {
                write!(f, "step {step}: invalid {field} {value}")
            }
        }
    }
}

impl std::error::Error for DescriptorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DescriptorError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DescriptorError {
    fn from(e: serde_json::Error) -> Self {
        DescriptorError::Json(e)
    }
}

/// A whole tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourDescriptor {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_tour_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prepare: Vec<ActionDescriptor>,
    pub steps: Vec<StepDescriptor>,
}

/// One step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub content: ContentDescriptor,
    #[serde(default, alias = "position", skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,
    #[serde(default, alias = "spotlightPadding", skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
    #[serde(default)]
    pub meta: MetaDescriptor,
}

/// Step body: one paragraph or several.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentDescriptor {
    Text(String),
    Paragraphs(Vec<String>),
}

impl Default for ContentDescriptor {
    fn default() -> Self {
        ContentDescriptor::Paragraphs(Vec::new())
    }
}

impl ContentDescriptor {
    fn to_node(&self) -> Node {
        let paragraphs: Vec<Node> = match self {
            ContentDescriptor::Text(text) => vec![Node::paragraph(text.as_str())],
            ContentDescriptor::Paragraphs(list) => {
                list.iter().map(|p| Node::paragraph(p.as_str())).collect()
            }
        };
        Element::new("div")
            .class("tour-content")
            .children(paragraphs)
            .into()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advance_on: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub script: Vec<ActionDescriptor>,
}

/// One script action; durations are milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ActionDescriptor {
    Navigate {
        route: String,
        #[serde(default)]
        skip_if_current: bool,
    },
    Wait {
        ms: u64,
    },
    WaitForElement {
        selector: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
        #[serde(default)]
        interval_ms: Option<u64>,
    },
    TypeInto {
        selector: String,
        value: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
    SetValue {
        selector: String,
        value: String,
    },
    Click {
        selector: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
    ClickMatching {
        selector: String,
        text: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
    ScrollIntoView {
        selector: String,
    },
    ScrollToTop,
}

fn ms_or(ms: Option<u64>, default: Duration) -> Duration {
    ms.map(Duration::from_millis).unwrap_or(default)
}

impl From<&ActionDescriptor> for ScriptAction {
    fn from(action: &ActionDescriptor) -> Self {
        match action {
            ActionDescriptor::Navigate {
                route,
                skip_if_current,
            } => ScriptAction::Navigate {
                route: route.clone(),
                skip_if_current: *skip_if_current,
            },
            ActionDescriptor::Wait { ms } => ScriptAction::Wait(Duration::from_millis(*ms)),
            ActionDescriptor::WaitForElement {
                selector,
                timeout_ms,
                interval_ms,
            } => ScriptAction::WaitForElement {
                selector: selector.clone(),
                timeout: ms_or(*timeout_ms, DEFAULT_WAIT_TIMEOUT),
                interval: ms_or(*interval_ms, DEFAULT_WAIT_INTERVAL),
            },
            ActionDescriptor::TypeInto {
                selector,
                value,
                timeout_ms,
            } => ScriptAction::TypeInto {
                selector: selector.clone(),
                value: value.clone(),
                timeout: ms_or(*timeout_ms, DEFAULT_WAIT_TIMEOUT),
            },
            ActionDescriptor::SetValue { selector, value } => ScriptAction::SetValue {
                selector: selector.clone(),
                value: value.clone(),
            },
            ActionDescriptor::Click {
                selector,
                timeout_ms,
            } => ScriptAction::Click {
                selector: selector.clone(),
                timeout: ms_or(*timeout_ms, DEFAULT_WAIT_TIMEOUT),
            },
            ActionDescriptor::ClickMatching {
                selector,
                text,
                timeout_ms,
            } => ScriptAction::ClickMatching {
                selector: selector.clone(),
                text: text.clone(),
                timeout: ms_or(*timeout_ms, DEFAULT_WAIT_TIMEOUT),
            },
            ActionDescriptor::ScrollIntoView { selector } => ScriptAction::ScrollIntoView {
                selector: selector.clone(),
            },
            ActionDescriptor::ScrollToTop => ScriptAction::ScrollToTop,
        }
    }
}

fn script_of(actions: &[ActionDescriptor]) -> Option<StepScript> {
    if actions.is_empty() {
        None
    } else {
        Some(actions.iter().map(ScriptAction::from).collect())
    }
}

fn check_number(step: usize, field: &'static str, value: Option<f64>) -> Result<(), DescriptorError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(DescriptorError::InvalidNumber { step, field, value: v }),
        _ => Ok(()),
    }
}

impl StepDescriptor {
    /// Validate and build the step. `index` is only used in errors.
    pub fn to_step(&self, index: usize) -> Result<TourStep, DescriptorError> {
        let placement = match &self.placement {
            Some(raw) => raw
                .parse::<Placement>()
                .map_err(|_| DescriptorError::InvalidPlacement {
                    step: index,
                    value: raw.clone(),
                })?,
            None => Placement::default(),
        };
        check_number(index, "padding", self.padding)?;
        check_number(index, "offset", self.offset)?;

        let target = self.selector.clone().map(Target::Selector).unwrap_or_default();
        let mut step = TourStep::new(target, self.content.to_node()).with_placement(placement);
        step.id = self.id.clone();
        step.title = self.title.clone();
        step.padding = self.padding;
        step.offset = self.offset;
        step.meta.advance_on = self.meta.advance_on.clone().filter(|k| !k.is_empty());
        step.meta.script = script_of(&self.meta.script);
        Ok(step)
    }
}

impl TourDescriptor {
    pub fn from_json(json: &str) -> Result<Self, DescriptorError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn into_definition(self) -> Result<TourDefinition, DescriptorError> {
        if self.id.trim().is_empty() {
            return Err(DescriptorError::MissingId);
        }
        let steps = self
            .steps
            .iter()
            .enumerate()
            .map(|(i, s)| s.to_step(i))
            .collect::<Result<Vec<_>, _>>()?;
        let mut tour = TourDefinition::new(self.id, self.title, steps).with_description(self.description);
        tour.estimated_time = self.estimated_time;
        tour.launch_tour_id = self.launch_tour_id;
        tour.prepare = script_of(&self.prepare);
        Ok(tour)
    }
}

/// Parse and validate a JSON tour.
pub fn parse_tour(json: &str) -> Result<TourDefinition, DescriptorError> {
    TourDescriptor::from_json(json)?.into_definition()
}
