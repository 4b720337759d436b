#![forbid(unsafe_code)]

//! Headless tour playback.
//!
//! [`TourPlayer`] launches a tour on the simulated site and walks it the way
//! a patient user would: wait for the step's script to settle, read the step
//! for the dwell time, then move on. A step gated on an advance key is moved
//! by announcing that key, as the page would after the user performs the
//! action; any other step is moved with the right arrow or a click on the
//! primary button.

use std::time::Duration;

use serde::Serialize;

use ftour::{LaunchStatus, TourDefinition, TourEvent, TourProvider, TourResult, dispatch_tour_advance};
use ftour_core::config::TourConfig;
use ftour_core::event::{KeyCode, KeyEvent};
use ftour_core::host::Host;
use ftour_core::memory_host::MemoryHost;

/// Upper bound on waiting for one script.
const SCRIPT_BUDGET: Duration = Duration::from_secs(30);
/// Clock step while waiting on scripts.
const SLICE: Duration = Duration::from_millis(50);

/// How the player moves past ungated steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdvanceMode {
    /// Press the right arrow.
    #[default]
    Keyboard,
    /// Click the overlay's primary button.
    Click,
}

/// One observed step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub tour: String,
    pub index: usize,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
    pub label: String,
    pub placement: String,
    pub tooltip_left: String,
    pub tooltip_top: String,
    /// `[left, top, width, height]` of the highlight, absent for the
    /// placeholder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<[f64; 4]>,
    pub route: Option<String>,
    pub at_ms: u64,
}

impl Frame {
    pub fn is_placeholder(&self) -> bool {
        self.highlight.is_none()
    }
}

/// Outcome of one playback.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayReport {
    pub tour: String,
    pub status: LaunchStatus,
    pub frames: Vec<Frame>,
    pub events: Vec<TourEvent>,
}

impl PlayReport {
    /// Whether the tour ran to its last step and finished.
    pub fn finished(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, TourEvent::Finished { .. }))
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter().filter(|f| f.is_placeholder())
    }
}

/// Plays tours against one host.
#[derive(Debug)]
pub struct TourPlayer {
    host: MemoryHost,
    provider: TourProvider,
    dwell: Duration,
    mode: AdvanceMode,
}

impl TourPlayer {
    pub fn new(host: MemoryHost, config: TourConfig, dwell: Duration) -> Self {
        let mode = if config.disable_keyboard_navigation {
            AdvanceMode::Click
        } else {
            AdvanceMode::Keyboard
        };
        Self {
            host,
            provider: TourProvider::new(config),
            dwell,
            mode,
        }
    }

    pub fn host(&self) -> &MemoryHost {
        &self.host
    }

    pub fn provider(&self) -> &TourProvider {
        &self.provider
    }

    pub fn mode(&self) -> AdvanceMode {
        self.mode
    }

    /// Launch `tour` and play it to the end, calling `on_frame` per step.
    pub fn play(&mut self, tour: &TourDefinition, mut on_frame: impl FnMut(&Frame)) -> TourResult<PlayReport> {
        let mut report = PlayReport {
            tour: tour.id.clone(),
            status: self.provider.launch(&mut self.host, tour)?,
            frames: Vec::new(),
            events: Vec::new(),
        };
        tracing::info!(tour = %tour.id, status = ?report.status, "tour launched");

        if report.status == LaunchStatus::Preparing {
            let mut waited = Duration::ZERO;
            while self.provider.preparing().is_some() && waited < SCRIPT_BUDGET {
                report.events.extend(self.tick(SLICE));
                waited += SLICE;
            }
        }

        // Every step is shown at most once on the way forward.
        let mut remaining = tour.steps.len();
        while self.provider.is_open() && remaining > 0 {
            remaining -= 1;
            report.events.extend(self.settle_scripts());
            report.events.extend(self.tick(self.dwell));
            if !self.provider.is_open() {
                break;
            }
            if let Some(frame) = self.capture(&tour.id) {
                on_frame(&frame);
                report.frames.push(frame);
            }
            report.events.extend(self.advance());
        }

        if self.provider.is_open() {
            tracing::warn!(tour = %tour.id, "tour still open after its last step, closing");
            report.events.extend(self.provider.close(&mut self.host));
        }
        Ok(report)
    }

    /// Run host timers for `dt`.
    fn tick(&mut self, dt: Duration) -> Vec<TourEvent> {
        let until = self.host.now() + dt;
        let mut events = Vec::new();
        while let Some(event) = self.host.poll_timer(until) {
            events.extend(self.provider.handle_event(&mut self.host, &event));
        }
        events
    }

    fn settle_scripts(&mut self) -> Vec<TourEvent> {
        let mut events = Vec::new();
        let mut waited = Duration::ZERO;
        while self.provider.script_running() && waited < SCRIPT_BUDGET {
            events.extend(self.tick(SLICE));
            waited += SLICE;
        }
        events
    }

    fn capture(&self, tour: &str) -> Option<Frame> {
        let controller = self.provider.controller();
        let step = controller.current_step()?;
        let view = self.provider.render()?;
        let label = step
            .title
            .clone()
            .or_else(|| step.id.clone())
            .unwrap_or_else(|| format!("step {}", controller.current_step_index() + 1));
        Some(Frame {
            tour: tour.to_owned(),
            index: controller.current_step_index(),
            count: controller.step_count(),
            step_id: step.id.clone(),
            label,
            placement: view.tooltip.placement.to_string(),
            tooltip_left: view.tooltip.left.to_string(),
            tooltip_top: view.tooltip.top.to_string(),
            highlight: view.highlight.map(|r| [r.left, r.top, r.width, r.height]),
            route: self.host.current_route(),
            at_ms: u64::try_from(self.host.now().as_millis()).unwrap_or(u64::MAX),
        })
    }

    fn advance(&mut self) -> Vec<TourEvent> {
        let gate = self
            .provider
            .controller()
            .current_step()
            .and_then(|s| s.advance_key().map(str::to_owned));
        if let Some(key) = gate {
            tracing::debug!(%key, "performing gated action");
            dispatch_tour_advance(&key);
            return self.provider.pump(&mut self.host);
        }

        if self.mode == AdvanceMode::Keyboard {
            if let Some(event) = self.host.key(KeyEvent::new(KeyCode::Right)) {
                return self.provider.handle_event(&mut self.host, &event);
            }
        }
        let next = self
            .provider
            .render()
            .and_then(|view| view.root.find_class("tour-nav-primary").and_then(|b| b.action_binding()));
        match next {
            Some(action) => self.provider.apply_action(&mut self.host, action),
            None => Vec::new(),
        }
    }
}
