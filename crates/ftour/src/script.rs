#![forbid(unsafe_code)]

//! Step script execution.
//!
//! A [`ScriptRunner`] executes [`StepScript`]s against the host. Scripts never
//! block: a wait or an element poll arms an interval timer owned by the
//! runner and the script resumes when the host reports that timer. At most
//! one script runs at a time; starting another, changing step or closing the
//! tour cancels it and clears the timer.
//!
//! Each step's script runs once per visit. Going backwards forgets the steps
//! from the new index on, so revisiting them runs their scripts again.

use core::time::Duration;
use std::collections::BTreeSet;

use ftour_core::event::HostEvent;
use ftour_core::host::{ElementId, Host, HostError, TimerId};
use ftour_core::script::{DEFAULT_WAIT_INTERVAL, ScriptAction, StepScript};
use ftour_overlay::step::TourStep;

/// What a script belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptSlot {
    /// The tour's prepare script, run before the first step opens.
    Prepare,
    /// A step's script.
    Step(usize),
}

/// How a script ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptOutcome {
    Completed,
    Aborted(HostError),
}

/// A finished script, reported once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFinished {
    pub slot: ScriptSlot,
    pub outcome: ScriptOutcome,
}

#[derive(Debug)]
struct Running {
    slot: ScriptSlot,
    actions: Vec<ScriptAction>,
    pc: usize,
    /// Deadline of the current wait or poll, set on first attempt.
    deadline: Option<Duration>,
}

enum Progress {
    Done,
    /// Retry after the given period.
    Pending(Duration),
}

enum Lookup {
    Found(ElementId),
    Missing,
    Pending,
}

/// Runs step and prepare scripts.
#[derive(Debug, Default)]
pub struct ScriptRunner {
    executed: BTreeSet<usize>,
    last_index: Option<usize>,
    running: Option<Running>,
    timer: Option<(TimerId, Duration)>,
}

impl ScriptRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a script is in progress.
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Slot of the script in progress.
    pub fn running_slot(&self) -> Option<ScriptSlot> {
        self.running.as_ref().map(|run| run.slot)
    }

    /// Whether step `index` has had its script started during this visit.
    pub fn has_executed(&self, index: usize) -> bool {
        self.executed.contains(&index)
    }

    /// Start a prepare script, cancelling anything in progress.
    pub fn run_prepare(&mut self, host: &mut dyn Host, script: &StepScript) -> Option<ScriptFinished> {
        self.cancel(host);
        self.start(host, ScriptSlot::Prepare, script)
    }

    /// The current step is now `index`.
    ///
    /// Cancels a script belonging to another step and, if this step's script
    /// has not run during this visit, starts it. A running prepare script is
    /// left alone and the step's script is not started.
    pub fn on_step(
        &mut self,
        host: &mut dyn Host,
        index: usize,
        step: Option<&TourStep>,
    ) -> Option<ScriptFinished> {
        if self.last_index.is_some_and(|last| index < last) {
            self.executed.retain(|&i| i < index);
        }
        self.last_index = Some(index);

        // A pending launch owns the runner; the open tour's step scripts
        // wait until it settles.
        if self.running_slot() == Some(ScriptSlot::Prepare) {
            return None;
        }
        if self.running_slot() != Some(ScriptSlot::Step(index)) {
            self.cancel(host);
        }
        if !self.executed.insert(index) {
            return None;
        }
        let script = step.and_then(|s| s.meta.script.as_ref())?;
        self.start(host, ScriptSlot::Step(index), script)
    }

    /// The tour closed or its step list was replaced: cancel and forget.
    pub fn reset(&mut self, host: &mut dyn Host) {
        self.cancel(host);
        self.executed.clear();
        self.last_index = None;
    }

    /// Feed a host event. Only the runner's own timer is consumed.
    pub fn handle_event(&mut self, host: &mut dyn Host, event: &HostEvent) -> Option<ScriptFinished> {
        match (event, self.timer) {
            (HostEvent::Timer(id), Some((timer, _))) if *id == timer => self.resume(host),
            _ => None,
        }
    }

    /// Whether `event` is this runner's timer.
    pub fn owns_event(&self, event: &HostEvent) -> bool {
        matches!((event, self.timer), (HostEvent::Timer(id), Some((timer, _))) if *id == timer)
    }

    /// Stop the running script and clear its timer.
    pub fn cancel(&mut self, host: &mut dyn Host) {
        if let Some(run) = self.running.take() {
            tracing::debug!(slot = ?run.slot, at = run.pc, "tour script cancelled");
        }
        self.disarm(host);
    }

    fn start(&mut self, host: &mut dyn Host, slot: ScriptSlot, script: &StepScript) -> Option<ScriptFinished> {
        tracing::debug!(?slot, actions = script.len(), "tour script started");
        self.running = Some(Running {
            slot,
            actions: script.actions().to_vec(),
            pc: 0,
            deadline: None,
        });
        self.resume(host)
    }

    fn resume(&mut self, host: &mut dyn Host) -> Option<ScriptFinished> {
        loop {
            let run = self.running.as_mut()?;
            let Some(action) = run.actions.get(run.pc).cloned() else {
                return self.finish(host, ScriptOutcome::Completed);
            };
            match execute(run, host, &action) {
                Ok(Progress::Done) => {
                    run.pc += 1;
                    run.deadline = None;
                }
                Ok(Progress::Pending(period)) => {
                    self.arm(host, period);
                    return None;
                }
                Err(err) => {
                    tracing::warn!(action = action.name(), error = %err, "tour script failed");
                    return self.finish(host, ScriptOutcome::Aborted(err));
                }
            }
        }
    }

    fn finish(&mut self, host: &mut dyn Host, outcome: ScriptOutcome) -> Option<ScriptFinished> {
        self.disarm(host);
        let run = self.running.take()?;
        tracing::debug!(slot = ?run.slot, ?outcome, "tour script finished");
        Some(ScriptFinished {
            slot: run.slot,
            outcome,
        })
    }

    fn arm(&mut self, host: &mut dyn Host, period: Duration) {
        let period = period.max(Duration::from_millis(1));
        match self.timer {
            Some((_, current)) if current == period => {}
            _ => {
                self.disarm(host);
                self.timer = Some((host.set_interval(period), period));
            }
        }
    }

    fn disarm(&mut self, host: &mut dyn Host) {
        if let Some((timer, _)) = self.timer.take() {
            host.clear_interval(timer);
        }
    }
}

fn execute(run: &mut Running, host: &mut dyn Host, action: &ScriptAction) -> Result<Progress, HostError> {
    match action {
        ScriptAction::Navigate {
            route,
            skip_if_current,
        } => {
            let here = *skip_if_current && host.current_route().as_deref() == Some(route.as_str());
            if !here {
                host.navigate(route)?;
            }
            Ok(Progress::Done)
        }
        ScriptAction::Wait(duration) => {
            if duration.is_zero() {
                return Ok(Progress::Done);
            }
            let now = host.now();
            let until = *run.deadline.get_or_insert(now + *duration);
            if now >= until {
                Ok(Progress::Done)
            } else {
                Ok(Progress::Pending(*duration))
            }
        }
        ScriptAction::WaitForElement {
            selector,
            timeout,
            interval,
        } => match lookup(run, &*host, selector, *timeout) {
            Lookup::Found(_) => Ok(Progress::Done),
            Lookup::Missing => {
                missing(selector, "wait_for_element");
                Ok(Progress::Done)
            }
            Lookup::Pending => Ok(Progress::Pending(*interval)),
        },
        ScriptAction::TypeInto {
            selector,
            value,
            timeout,
        } => match lookup(run, &*host, selector, *timeout) {
            Lookup::Found(input) => {
                host.focus(input)?;
                host.set_value(input, value)?;
                Ok(Progress::Done)
            }
            Lookup::Missing => {
                missing(selector, "type_into");
                Ok(Progress::Done)
            }
            Lookup::Pending => Ok(Progress::Pending(DEFAULT_WAIT_INTERVAL)),
        },
        ScriptAction::SetValue { selector, value } => {
            match host.query_selector(selector) {
                Some(input) if host.value(input).as_deref() != Some(value.as_str()) => {
                    host.set_value(input, value)?;
                }
                Some(_) => {}
                None => missing(selector, "set_value"),
            }
            Ok(Progress::Done)
        }
        ScriptAction::Click { selector, timeout } => {
            match lookup(run, &*host, selector, *timeout) {
                Lookup::Found(element) => {
                    host.click(element)?;
                    Ok(Progress::Done)
                }
                Lookup::Missing => {
                    missing(selector, "click");
                    Ok(Progress::Done)
                }
                Lookup::Pending => Ok(Progress::Pending(DEFAULT_WAIT_INTERVAL)),
            }
        }
        ScriptAction::ClickMatching {
            selector,
            text,
            timeout,
        } => match lookup(run, &*host, selector, *timeout) {
            Lookup::Found(first) => {
                let needle = text.to_lowercase();
                let element = host
                    .query_selector_all(selector)
                    .into_iter()
                    .find(|&el| {
                        host.text_content(el)
                            .is_some_and(|t| t.to_lowercase().contains(&needle))
                    })
                    .unwrap_or(first);
                host.click(element)?;
                Ok(Progress::Done)
            }
            Lookup::Missing => {
                missing(selector, "click_matching");
                Ok(Progress::Done)
            }
            Lookup::Pending => Ok(Progress::Pending(DEFAULT_WAIT_INTERVAL)),
        },
        ScriptAction::ScrollIntoView { selector } => {
            match host.query_selector(selector) {
                Some(element) => host.scroll_into_view(element)?,
                None => missing(selector, "scroll_into_view"),
            }
            Ok(Progress::Done)
        }
        ScriptAction::ScrollToTop => {
            host.scroll_to_top()?;
            Ok(Progress::Done)
        }
    }
}

fn lookup(run: &mut Running, host: &dyn Host, selector: &str, timeout: Duration) -> Lookup {
    if let Some(element) = host.query_selector(selector) {
        return Lookup::Found(element);
    }
    let now = host.now();
    let deadline = *run.deadline.get_or_insert(now + timeout);
    if now >= deadline {
        Lookup::Missing
    } else {
        Lookup::Pending
    }
}

fn missing(selector: &str, action: &'static str) {
    tracing::debug!(selector, action, "tour script element not found");
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftour_core::geometry::Rect;
    use ftour_core::memory_host::{ClickEffect, MemoryHost};
    use ftour_core::script::DEFAULT_WAIT_TIMEOUT;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn rect() -> Rect {
        Rect::new(0.0, 0.0, 10.0, 10.0)
    }

    /// Drive the runner until `until`, returning the first finish report.
    fn drive(runner: &mut ScriptRunner, host: &mut MemoryHost, until: Duration) -> Option<ScriptFinished> {
        while let Some(event) = host.poll_timer(until) {
            if let Some(done) = runner.handle_event(host, &event) {
                return Some(done);
            }
        }
        None
    }

    fn scripted(script: StepScript) -> TourStep {
        TourStep::new("#x", "x").with_script(script)
    }

    #[test]
    fn immediate_script_finishes_synchronously() {
        let mut host = MemoryHost::new(800.0, 600.0);
        let mut runner = ScriptRunner::new();
        let step = scripted(StepScript::new().then(ScriptAction::navigate("/addresses")));
        let done = runner.on_step(&mut host, 0, Some(&step));
        assert_eq!(
            done,
            Some(ScriptFinished {
                slot: ScriptSlot::Step(0),
                outcome: ScriptOutcome::Completed
            })
        );
        assert_eq!(host.navigations(), ["/addresses"]);
        assert_eq!(host.active_timers(), 0);
    }

    #[test]
    fn wait_arms_and_clears_timer() {
        let mut host = MemoryHost::new(800.0, 600.0);
        let mut runner = ScriptRunner::new();
        let step = scripted(
            StepScript::new()
                .then(ScriptAction::pause_ms(350))
                .then(ScriptAction::navigate("/")),
        );
        assert_eq!(runner.on_step(&mut host, 0, Some(&step)), None);
        assert_eq!(host.active_timers(), 1);
        assert!(host.navigations().is_empty());
        let done = drive(&mut runner, &mut host, ms(1000));
        assert!(matches!(done, Some(ScriptFinished { outcome: ScriptOutcome::Completed, .. })));
        assert_eq!(host.navigations(), ["/"]);
        assert_eq!(host.active_timers(), 0);
    }

    #[test]
    fn waits_for_element_to_mount() {
        let mut host = MemoryHost::new(800.0, 600.0);
        host.insert_on_route("/new", "#form", rect());
        let mut runner = ScriptRunner::new();
        let step = scripted(
            StepScript::new()
                .then(ScriptAction::wait_for("#form"))
                .then(ScriptAction::type_into("#form", "1143")),
        );
        assert_eq!(runner.on_step(&mut host, 0, Some(&step)), None);
        assert_eq!(drive(&mut runner, &mut host, ms(250)), None);
        host.set_route("/new");
        let done = drive(&mut runner, &mut host, ms(1000));
        assert!(done.is_some());
        // not an input, so set_value is refused and the script aborts
        assert!(matches!(
            done.map(|d| d.outcome),
            Some(ScriptOutcome::Aborted(HostError::NotApplicable { .. }))
        ));
        assert_eq!(host.active_timers(), 0);
    }

    #[test]
    fn type_into_focuses_and_sets_value() {
        let mut host = MemoryHost::new(800.0, 600.0);
        let input = host.insert("#search", rect());
        host.make_input(input, "");
        let mut runner = ScriptRunner::new();
        let step = scripted(StepScript::new().then(ScriptAction::type_into("#search", "5008 Queensbury")));
        assert!(runner.on_step(&mut host, 0, Some(&step)).is_some());
        assert_eq!(host.focused(), Some(input));
        assert_eq!(host.value(input).as_deref(), Some("5008 Queensbury"));
    }

    #[test]
    fn missing_element_times_out_and_continues() {
        let mut host = MemoryHost::new(800.0, 600.0);
        let mut runner = ScriptRunner::new();
        let step = scripted(
            StepScript::new()
                .then(ScriptAction::wait_for("#never"))
                .then(ScriptAction::navigate("/after")),
        );
        runner.on_step(&mut host, 0, Some(&step));
        assert_eq!(drive(&mut runner, &mut host, DEFAULT_WAIT_TIMEOUT - ms(100)), None);
        assert!(host.navigations().is_empty());
        let done = drive(&mut runner, &mut host, DEFAULT_WAIT_TIMEOUT + ms(100));
        assert!(matches!(done, Some(ScriptFinished { outcome: ScriptOutcome::Completed, .. })));
        assert_eq!(host.navigations(), ["/after"]);
    }

    #[test]
    fn click_matching_prefers_text() {
        let mut host = MemoryHost::new(800.0, 600.0);
        let first = host.insert(".result", rect());
        let second = host.insert(".result", rect());
        host.set_text(first, "1200 Main St");
        host.set_text(second, "1143 Queensbury Ave");
        let mut runner = ScriptRunner::new();
        let step = scripted(StepScript::new().then(ScriptAction::ClickMatching {
            selector: ".result".into(),
            text: "queensbury".into(),
            timeout: DEFAULT_WAIT_TIMEOUT,
        }));
        runner.on_step(&mut host, 0, Some(&step));
        assert_eq!(host.clicks(), [second]);
    }

    #[test]
    fn click_effect_navigates() {
        let mut host = MemoryHost::new(800.0, 600.0);
        host.insert("#new", rect());
        host.on_click("#new", ClickEffect::Navigate("/violation/new".into()));
        let mut runner = ScriptRunner::new();
        let step = scripted(StepScript::new().then(ScriptAction::click("#new")));
        runner.on_step(&mut host, 0, Some(&step));
        assert_eq!(host.current_route().as_deref(), Some("/violation/new"));
    }

    #[test]
    fn runs_once_per_visit_and_again_after_going_back() {
        let mut host = MemoryHost::new(800.0, 600.0);
        let mut runner = ScriptRunner::new();
        let a = scripted(StepScript::new().then(ScriptAction::navigate("/a")));
        let b = scripted(StepScript::new().then(ScriptAction::navigate("/b")));
        runner.on_step(&mut host, 0, Some(&a));
        runner.on_step(&mut host, 1, Some(&b));
        runner.on_step(&mut host, 1, Some(&b));
        assert_eq!(host.navigations(), ["/a", "/b"]);
        runner.on_step(&mut host, 0, Some(&a));
        assert!(!runner.has_executed(1));
        runner.on_step(&mut host, 1, Some(&b));
        assert_eq!(host.navigations(), ["/a", "/b", "/a", "/b"]);
    }

    #[test]
    fn changing_step_cancels_running_script() {
        let mut host = MemoryHost::new(800.0, 600.0);
        let mut runner = ScriptRunner::new();
        let slow = scripted(
            StepScript::new()
                .then(ScriptAction::pause_ms(500))
                .then(ScriptAction::navigate("/late")),
        );
        runner.on_step(&mut host, 0, Some(&slow));
        assert!(runner.is_running());
        runner.on_step(&mut host, 1, None);
        assert!(!runner.is_running());
        assert_eq!(host.active_timers(), 0);
        assert_eq!(drive(&mut runner, &mut host, ms(2000)), None);
        assert!(host.navigations().is_empty());
    }

    #[test]
    fn step_change_leaves_prepare_running() {
        let mut host = MemoryHost::new(800.0, 600.0);
        let mut runner = ScriptRunner::new();
        let prepare = StepScript::new()
            .then(ScriptAction::pause_ms(450))
            .then(ScriptAction::navigate("/next"));
        assert_eq!(runner.run_prepare(&mut host, &prepare), None);

        let step = scripted(StepScript::new().then(ScriptAction::navigate("/step")));
        assert_eq!(runner.on_step(&mut host, 1, Some(&step)), None);
        assert_eq!(runner.running_slot(), Some(ScriptSlot::Prepare));
        assert!(!runner.has_executed(1));

        let done = drive(&mut runner, &mut host, ms(1000));
        assert_eq!(
            done,
            Some(ScriptFinished {
                slot: ScriptSlot::Prepare,
                outcome: ScriptOutcome::Completed
            })
        );
        assert_eq!(host.navigations(), ["/next"]);
        assert_eq!(host.active_timers(), 0);
    }

    #[test]
    fn reset_forgets_everything() {
        let mut host = MemoryHost::new(800.0, 600.0);
        let mut runner = ScriptRunner::new();
        let a = scripted(StepScript::new().then(ScriptAction::pause_ms(100)));
        runner.on_step(&mut host, 0, Some(&a));
        runner.reset(&mut host);
        assert!(!runner.is_running());
        assert!(!runner.has_executed(0));
        assert_eq!(host.active_timers(), 0);
    }

    #[test]
    fn skip_if_current_avoids_navigation() {
        let mut host = MemoryHost::new(800.0, 600.0);
        host.set_route("/");
        let mut runner = ScriptRunner::new();
        let script = StepScript::new().then(ScriptAction::Navigate {
            route: "/".into(),
            skip_if_current: true,
        });
        runner.run_prepare(&mut host, &script);
        assert!(host.navigations().is_empty());
    }
}
