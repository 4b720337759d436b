#![forbid(unsafe_code)]

//! The tour provider.
//!
//! [`TourProvider`] owns one session and everything it needs on the host: the
//! target tracker, the scroll lock, the overlay container, the key-down
//! listener, the auto-advance subscription and the step script runner. All
//! of it is reconciled against the controller state after every transition,
//! so resources are acquired on entering the open state and released exactly
//! once on leaving it, however the session ends.
//!
//! The host drives everything: it forwards [`HostEvent`]s to
//! [`TourProvider::handle_event`], calls [`TourProvider::pump`] after
//! dispatching advance events, and paints [`TourProvider::render`].

use ftour_core::config::TourConfig;
use ftour_core::event::HostEvent;
use ftour_core::geometry::Rect;
use ftour_core::host::{Host, ListenerId, ListenerKind, PortalId};
use ftour_core::tracker::TargetTracker;
use ftour_overlay::action::OverlayAction;
use ftour_overlay::overlay::{OverlayRenderer, OverlayState, OverlayView};
use ftour_overlay::portal::{OverlaySlot, OwnerId};
use ftour_overlay::scroll_lock::{self, ScrollLockToken};

use crate::advance::AutoAdvanceListener;
use crate::catalog::TourDefinition;
use crate::controller::{TourController, TourEvent, TourStepList};
use crate::error::TourResult;
use crate::script::{ScriptFinished, ScriptOutcome, ScriptRunner, ScriptSlot};

/// What [`TourProvider::launch`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchStatus {
    /// The tour is open on its first step.
    Opened,
    /// The prepare script is running; the tour opens when it finishes.
    Preparing,
    /// Another launch is still preparing; this one was ignored.
    Busy,
    /// The tour has no steps.
    Empty,
    /// The prepare script failed; nothing was opened.
    Aborted,
}

#[derive(Debug)]
struct PendingLaunch {
    tour_id: String,
    steps: TourStepList,
}

/// One tour session bound to a host.
#[derive(Debug)]
pub struct TourProvider {
    config: TourConfig,
    owner: OwnerId,
    controller: TourController,
    tracker: TargetTracker,
    advance: AutoAdvanceListener,
    scripts: ScriptRunner,
    renderer: OverlayRenderer,
    scroll_lock: Option<ScrollLockToken>,
    slot: Option<OverlaySlot>,
    key_listener: Option<ListenerId>,
    pending: Option<PendingLaunch>,
    active_tour: Option<String>,
}

impl TourProvider {
    pub fn new(config: TourConfig) -> Self {
        let mut controller = TourController::new();
        controller.set_keyboard_navigation(!config.disable_keyboard_navigation);
        Self {
            tracker: TargetTracker::new(config.poll_interval),
            config,
            owner: OwnerId::next(),
            controller,
            advance: AutoAdvanceListener::new(),
            scripts: ScriptRunner::new(),
            renderer: OverlayRenderer,
            scroll_lock: None,
            slot: None,
            key_listener: None,
            pending: None,
            active_tour: None,
        }
    }

    pub fn config(&self) -> &TourConfig {
        &self.config
    }

    pub fn controller(&self) -> &TourController {
        &self.controller
    }

    pub fn is_open(&self) -> bool {
        self.controller.is_open()
    }

    pub fn current_step_index(&self) -> usize {
        self.controller.current_step_index()
    }

    /// Padded rect of the current target.
    pub fn rect(&self) -> Option<Rect> {
        self.tracker.rect()
    }

    /// Container the overlay renders into, while open.
    pub fn portal(&self) -> Option<PortalId> {
        self.slot.as_ref().map(OverlaySlot::portal)
    }

    /// Id of the launched tour currently shown.
    pub fn active_tour(&self) -> Option<&str> {
        self.active_tour.as_deref()
    }

    /// Id of the tour whose prepare script is running.
    pub fn preparing(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.tour_id.as_str())
    }

    /// Whether a prepare or step script is still working.
    pub fn script_running(&self) -> bool {
        self.scripts.is_running()
    }

    /// Run `tour`'s prepare script, then open it at its first step.
    ///
    /// Ignored while another launch is preparing.
    pub fn launch(&mut self, host: &mut dyn Host, tour: &TourDefinition) -> TourResult<LaunchStatus> {
        if self.pending.is_some() {
            tracing::debug!(tour = %tour.id, "launch ignored while preparing");
            return Ok(LaunchStatus::Busy);
        }
        if tour.steps.is_empty() {
            return Ok(LaunchStatus::Empty);
        }
        tracing::info!(tour = %tour.id, steps = tour.steps.len(), "launching tour");
        self.pending = Some(PendingLaunch {
            tour_id: tour.id.clone(),
            steps: tour.steps.clone(),
        });
        let finished = match &tour.prepare {
            Some(script) => match self.scripts.run_prepare(host, script) {
                Some(done) => done,
                None => return Ok(LaunchStatus::Preparing),
            },
            None => ScriptFinished {
                slot: ScriptSlot::Prepare,
                outcome: ScriptOutcome::Completed,
            },
        };
        self.finish_prepare(host, finished)?;
        Ok(if self.is_open() {
            LaunchStatus::Opened
        } else {
            LaunchStatus::Aborted
        })
    }

    /// Abandon a launch whose prepare script is still running.
    pub fn cancel_launch(&mut self, host: &mut dyn Host) {
        if self.pending.take().is_some() && self.scripts.running_slot() == Some(ScriptSlot::Prepare) {
            tracing::debug!("tour launch cancelled");
            self.scripts.cancel(host);
        }
    }

    /// Open `steps` at `start_at` (clamped). An empty list does nothing.
    ///
    /// Fails without changing state when another provider owns the overlay.
    pub fn open(
        &mut self,
        host: &mut dyn Host,
        steps: impl Into<TourStepList>,
        start_at: usize,
    ) -> TourResult<Vec<TourEvent>> {
        let steps = steps.into();
        if steps.is_empty() {
            return Ok(Vec::new());
        }
        self.cancel_launch(host);
        if self.slot.is_none() {
            self.slot = Some(OverlaySlot::acquire(host, self.owner)?);
        }
        // A new list means scripts from the old one are stale.
        self.scripts.reset(host);
        self.active_tour = None;
        let event = self.controller.open(steps, start_at);
        Ok(self.settle(host, event))
    }

    pub fn next(&mut self, host: &mut dyn Host) -> Vec<TourEvent> {
        let event = self.controller.next();
        self.settle(host, event)
    }

    pub fn prev(&mut self, host: &mut dyn Host) -> Vec<TourEvent> {
        let event = self.controller.prev();
        self.settle(host, event)
    }

    pub fn go_to(&mut self, host: &mut dyn Host, index: isize) -> Vec<TourEvent> {
        let event = self.controller.go_to(index);
        self.settle(host, event)
    }

    /// Close the tour. Safe to call at any time, any number of times.
    pub fn close(&mut self, host: &mut dyn Host) -> Vec<TourEvent> {
        self.cancel_launch(host);
        let event = self.controller.close();
        self.settle(host, event)
    }

    /// Feed one host event.
    pub fn handle_event(&mut self, host: &mut dyn Host, event: &HostEvent) -> Vec<TourEvent> {
        let mut events = Vec::new();
        match event {
            HostEvent::Timer(_) if self.scripts.owns_event(event) => {
                if let Some(done) = self.scripts.handle_event(host, event) {
                    if done.slot == ScriptSlot::Prepare {
                        match self.finish_prepare(host, done) {
                            Ok(opened) => events.extend(opened),
                            Err(err) => tracing::warn!(error = %err, "tour launch failed"),
                        }
                    }
                }
            }
            HostEvent::Timer(_) | HostEvent::Resize { .. } | HostEvent::Scroll => {
                self.tracker.handle_event(&*host, event);
            }
            HostEvent::Key(key) => {
                if self.key_listener.is_some() {
                    let event = self.controller.handle_key(key);
                    events.extend(self.settle(host, event));
                }
            }
            HostEvent::OverlayAction(raw) => match raw.parse::<OverlayAction>() {
                Ok(action) => events.extend(self.apply_action(host, action)),
                Err(err) => tracing::debug!(%err, "ignoring overlay click"),
            },
        }
        events.extend(self.pump(host));
        events
    }

    /// Act on an overlay control.
    pub fn apply_action(&mut self, host: &mut dyn Host, action: OverlayAction) -> Vec<TourEvent> {
        match action {
            OverlayAction::Next => self.next(host),
            OverlayAction::Prev => self.prev(host),
            OverlayAction::Close => self.close(host),
            OverlayAction::GoTo(index) => {
                self.go_to(host, isize::try_from(index).unwrap_or(isize::MAX))
            }
        }
    }

    /// Take in dispatched advance events and act on them.
    pub fn pump(&mut self, host: &mut dyn Host) -> Vec<TourEvent> {
        if self.advance.pump() {
            self.settle(host, None)
        } else {
            Vec::new()
        }
    }

    /// The overlay for the current frame, if open.
    pub fn render(&self) -> Option<OverlayView> {
        let step = self.controller.current_step()?;
        Some(self.renderer.render(&OverlayState {
            step,
            step_index: self.controller.current_step_index(),
            step_count: self.controller.step_count(),
            rect: self.tracker.rect(),
            config: &self.config,
        }))
    }

    /// Close and release everything this provider holds on the host.
    pub fn destroy(&mut self, host: &mut dyn Host) {
        self.close(host);
        self.release(host);
    }

    fn finish_prepare(&mut self, host: &mut dyn Host, done: ScriptFinished) -> TourResult<Vec<TourEvent>> {
        let Some(pending) = self.pending.take() else {
            return Ok(Vec::new());
        };
        if let ScriptOutcome::Aborted(err) = &done.outcome {
            tracing::warn!(tour = %pending.tour_id, error = %err, "tour prepare failed");
            return Ok(Vec::new());
        }
        let events = self.open(host, pending.steps, 0)?;
        self.active_tour = Some(pending.tour_id);
        Ok(events)
    }

    /// Apply auto-advance, then bring host resources in line with the
    /// controller state.
    fn settle(&mut self, host: &mut dyn Host, first: Option<TourEvent>) -> Vec<TourEvent> {
        let mut events: Vec<TourEvent> = first.into_iter().collect();
        events.extend(self.advance.sync(&mut self.controller));

        if !self.controller.is_open() {
            self.release(host);
            return events;
        }

        if self.scroll_lock.is_none() {
            self.scroll_lock = Some(scroll_lock::acquire(host));
        }
        if self.key_listener.is_none() && self.controller.keyboard_navigation() {
            self.key_listener = Some(host.add_listener(ListenerKind::KeyDown));
        }

        let index = self.controller.current_step_index();
        let Some(step) = self.controller.current_step() else {
            return events;
        };
        let padding = step.padding.unwrap_or(self.config.default_padding);
        self.tracker.set_target(host, step.target.clone(), padding);
        self.tracker.set_active(host, true);
        if let Some(done) = self.scripts.on_step(host, index, Some(step)) {
            if let ScriptOutcome::Aborted(err) = done.outcome {
                tracing::debug!(index, error = %err, "step script aborted");
            }
        }
        events
    }

    /// Tear down every session resource. Idempotent.
    fn release(&mut self, host: &mut dyn Host) {
        self.tracker.set_active(host, false);
        if self.pending.is_none() {
            self.scripts.reset(host);
        }
        if let Some(listener) = self.key_listener.take() {
            host.remove_listener(listener);
        }
        if let Some(token) = self.scroll_lock.take() {
            token.release(host);
        }
        if let Some(slot) = self.slot.take() {
            slot.release(host);
        }
        self.active_tour = None;
    }
}
