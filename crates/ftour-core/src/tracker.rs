#![forbid(unsafe_code)]

//! Live bounding-rect tracking for a step target.
//!
//! While active, a [`TargetTracker`] holds exactly three host registrations:
//! one interval timer (targets that move without firing events, such as CSS
//! transitions), one window `resize` listener, and one capture-phase `scroll`
//! listener (so scrolling inner containers is seen as well). Every
//! registration is released before a new set is attached, and deactivating
//! releases everything, so the host's timer and listener counts return to
//! their pre-activation baseline.
//!
//! A target that does not resolve yields `None`; the tracker keeps polling so
//! a target that mounts later is picked up on the next tick.

use core::time::Duration;

use crate::event::HostEvent;
use crate::geometry::Rect;
use crate::host::{Host, ListenerId, ListenerKind, TimerId};
use crate::target::Target;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Registration {
    timer: TimerId,
    resize: ListenerId,
    scroll: ListenerId,
}

/// Tracks the padded viewport rect of one target.
#[derive(Debug)]
pub struct TargetTracker {
    target: Target,
    padding: f64,
    poll_interval: Duration,
    registration: Option<Registration>,
    rect: Option<Rect>,
}

impl TargetTracker {
    /// Create an inactive tracker with no target.
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            target: Target::None,
            padding: 0.0,
            poll_interval,
            registration: None,
            rect: None,
        }
    }

    /// Latest measured rect, padding included. Always `None` while inactive.
    #[inline]
    pub fn rect(&self) -> Option<Rect> {
        self.rect
    }

    /// Whether host registrations are currently held.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.registration.is_some()
    }

    /// The tracked target.
    #[inline]
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Padding applied around the measured box.
    #[inline]
    pub fn padding(&self) -> f64 {
        self.padding
    }

    /// Activate or suspend tracking.
    ///
    /// Activating resolves the target immediately. Suspending tears down all
    /// registrations; suspending an inactive tracker does nothing.
    pub fn set_active(&mut self, host: &mut dyn Host, active: bool) {
        match (active, self.is_active()) {
            (true, false) => {
                self.attach(host);
                self.refresh(&*host);
            }
            (false, true) => self.teardown(host),
            _ => {}
        }
    }

    /// Point the tracker at a new target.
    ///
    /// A different target while active tears down the old registrations before
    /// attaching new ones. A padding-only change just re-measures.
    pub fn set_target(&mut self, host: &mut dyn Host, target: Target, padding: f64) {
        let target_changed = !self.target.same_as(&target);
        let padding_changed = self.padding != padding;
        self.target = target;
        self.padding = padding;

        if !self.is_active() {
            return;
        }
        if target_changed {
            self.teardown(host);
            self.attach(host);
            self.refresh(&*host);
        } else if padding_changed {
            self.refresh(&*host);
        }
    }

    /// React to a host event. Returns `true` when the rect changed.
    ///
    /// Only this tracker's own timer, `resize`, and `scroll` trigger a
    /// re-measure; everything else is ignored, as is any event while inactive.
    pub fn handle_event(&mut self, host: &dyn Host, event: &HostEvent) -> bool {
        let Some(registration) = self.registration else {
            return false;
        };
        match event {
            HostEvent::Timer(id) if *id == registration.timer => self.refresh(host),
            HostEvent::Resize { .. } | HostEvent::Scroll => self.refresh(host),
            _ => false,
        }
    }

    /// Resolve and measure now. Returns `true` when the rect changed.
    pub fn refresh(&mut self, host: &dyn Host) -> bool {
        if !self.is_active() {
            return false;
        }
        let next = self
            .target
            .resolve(host)
            .and_then(|element| host.bounding_client_rect(element))
            .filter(Rect::is_finite)
            .map(|bounds| bounds.expand(self.padding));

        if next.is_none() && self.rect.is_some() && cfg!(debug_assertions) {
            crate::debug!(
                selector = self.target.as_selector().unwrap_or("<non-selector>"),
                "tour target lost"
            );
        }
        if next.is_none() && self.rect.is_none() && cfg!(debug_assertions) {
            crate::trace!(
                selector = self.target.as_selector().unwrap_or("<non-selector>"),
                "tour target not found"
            );
        }

        let changed = next != self.rect;
        self.rect = next;
        changed
    }

    /// Release every host registration and forget the rect.
    ///
    /// Safe to call repeatedly.
    pub fn teardown(&mut self, host: &mut dyn Host) {
        if let Some(registration) = self.registration.take() {
            host.clear_interval(registration.timer);
            host.remove_listener(registration.resize);
            host.remove_listener(registration.scroll);
            crate::trace!(timer = registration.timer.get(), "tracker detached");
        }
        self.rect = None;
    }

    fn attach(&mut self, host: &mut dyn Host) {
        debug_assert!(self.registration.is_none(), "attach over live registration");
        let registration = Registration {
            timer: host.set_interval(self.poll_interval),
            resize: host.add_listener(ListenerKind::Resize),
            scroll: host.add_listener(ListenerKind::Scroll { capture: true }),
        };
        crate::trace!(timer = registration.timer.get(), "tracker attached");
        self.registration = Some(registration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::memory_host::MemoryHost;

    const TARGET: &str = "[data-tour-id=\"comment-form\"]";

    fn host_with_target() -> MemoryHost {
        let mut host = MemoryHost::new(1280.0, 720.0);
        host.insert(TARGET, Rect::new(50.0, 100.0, 200.0, 40.0));
        host
    }

    #[test]
    fn inactive_tracker_does_no_dom_work() {
        let mut host = host_with_target();
        let mut tracker = TargetTracker::new(Duration::from_millis(100));
        tracker.set_target(&mut host, Target::from(TARGET), 12.0);
        assert_eq!(tracker.rect(), None);
        assert_eq!(host.active_timers(), 0);
        assert_eq!(host.active_listeners(), 0);
        assert_eq!(host.query_count(), 0);
    }

    #[test]
    fn activation_measures_with_padding() {
        let mut host = host_with_target();
        let mut tracker = TargetTracker::new(Duration::from_millis(100));
        tracker.set_target(&mut host, Target::from(TARGET), 12.0);
        tracker.set_active(&mut host, true);
        assert_eq!(tracker.rect(), Some(Rect::new(38.0, 88.0, 224.0, 64.0)));
        assert_eq!(host.active_timers(), 1);
        assert_eq!(host.active_listeners(), 2);
        assert!(host.has_listener(ListenerKind::Scroll { capture: true }));
        assert!(host.has_listener(ListenerKind::Resize));
    }

    #[test]
    fn missing_target_emits_none_and_keeps_polling() {
        let mut host = MemoryHost::new(800.0, 600.0);
        let mut tracker = TargetTracker::new(Duration::from_millis(100));
        tracker.set_target(&mut host, Target::from(TARGET), 12.0);
        tracker.set_active(&mut host, true);
        assert_eq!(tracker.rect(), None);

        host.insert(TARGET, Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut changed = false;
        for event in host.advance(Duration::from_millis(100)) {
            changed |= tracker.handle_event(&host, &event);
        }
        assert!(changed);
        assert_eq!(tracker.rect(), Some(Rect::new(-12.0, -12.0, 34.0, 34.0)));
    }

    #[test]
    fn poll_picks_up_moves_without_events() {
        let mut host = host_with_target();
        let mut tracker = TargetTracker::new(Duration::from_millis(100));
        tracker.set_target(&mut host, Target::from(TARGET), 0.0);
        tracker.set_active(&mut host, true);

        host.move_element(TARGET, Rect::new(60.0, 100.0, 200.0, 40.0));
        assert_eq!(tracker.rect(), Some(Rect::new(50.0, 100.0, 200.0, 40.0)));

        for event in host.advance(Duration::from_millis(99)) {
            tracker.handle_event(&host, &event);
        }
        assert_eq!(tracker.rect(), Some(Rect::new(50.0, 100.0, 200.0, 40.0)));

        for event in host.advance(Duration::from_millis(1)) {
            tracker.handle_event(&host, &event);
        }
        assert_eq!(tracker.rect(), Some(Rect::new(60.0, 100.0, 200.0, 40.0)));
    }

    #[test]
    fn resize_and_scroll_remeasure_immediately() {
        let mut host = host_with_target();
        let mut tracker = TargetTracker::new(Duration::from_millis(100));
        tracker.set_target(&mut host, Target::from(TARGET), 0.0);
        tracker.set_active(&mut host, true);

        host.move_element(TARGET, Rect::new(50.0, 40.0, 200.0, 40.0));
        assert!(tracker.handle_event(&host, &HostEvent::Scroll));
        assert_eq!(tracker.rect().map(|r| r.top), Some(40.0));

        host.move_element(TARGET, Rect::new(10.0, 40.0, 200.0, 40.0));
        assert!(tracker.handle_event(
            &host,
            &HostEvent::Resize {
                width: 640.0,
                height: 480.0
            }
        ));
        assert_eq!(tracker.rect().map(|r| r.left), Some(10.0));
    }

    #[test]
    fn foreign_timer_is_ignored() {
        let mut host = host_with_target();
        let mut tracker = TargetTracker::new(Duration::from_millis(100));
        tracker.set_target(&mut host, Target::from(TARGET), 0.0);
        tracker.set_active(&mut host, true);
        let other = host.set_interval(Duration::from_millis(5));
        host.move_element(TARGET, Rect::new(0.0, 0.0, 1.0, 1.0));
        assert!(!tracker.handle_event(&host, &HostEvent::Timer(other)));
    }

    #[test]
    fn deactivation_returns_counts_to_baseline() {
        let mut host = host_with_target();
        let baseline_timer = host.set_interval(Duration::from_secs(1));
        let baseline = (host.active_timers(), host.active_listeners());

        let mut tracker = TargetTracker::new(Duration::from_millis(100));
        tracker.set_target(&mut host, Target::from(TARGET), 12.0);
        tracker.set_active(&mut host, true);
        tracker.set_active(&mut host, false);
        assert_eq!((host.active_timers(), host.active_listeners()), baseline);
        assert_eq!(tracker.rect(), None);

        tracker.set_active(&mut host, false);
        tracker.teardown(&mut host);
        assert_eq!((host.active_timers(), host.active_listeners()), baseline);
        host.clear_interval(baseline_timer);
    }

    #[test]
    fn target_change_replaces_registrations() {
        let mut host = host_with_target();
        host.insert("#other", Rect::new(0.0, 0.0, 5.0, 5.0));
        let mut tracker = TargetTracker::new(Duration::from_millis(100));
        tracker.set_target(&mut host, Target::from(TARGET), 0.0);
        tracker.set_active(&mut host, true);

        for _ in 0..5 {
            tracker.set_target(&mut host, Target::from("#other"), 0.0);
            tracker.set_target(&mut host, Target::from(TARGET), 0.0);
        }
        assert_eq!(host.active_timers(), 1);
        assert_eq!(host.active_listeners(), 2);
        assert_eq!(tracker.rect(), Some(Rect::new(50.0, 100.0, 200.0, 40.0)));
    }

    #[test]
    fn padding_change_remeasures_without_reregistering() {
        let mut host = host_with_target();
        let mut tracker = TargetTracker::new(Duration::from_millis(100));
        tracker.set_target(&mut host, Target::from(TARGET), 0.0);
        tracker.set_active(&mut host, true);
        let registrations = host.total_registrations();

        tracker.set_target(&mut host, Target::from(TARGET), 4.0);
        assert_eq!(host.total_registrations(), registrations);
        assert_eq!(tracker.rect(), Some(Rect::new(46.0, 96.0, 208.0, 48.0)));
    }

    #[test]
    fn element_and_resolver_targets() {
        let mut host = host_with_target();
        let id = host.query_selector(TARGET).expect("target");
        let mut tracker = TargetTracker::new(Duration::from_millis(100));
        tracker.set_target(&mut host, Target::Element(id), 0.0);
        tracker.set_active(&mut host, true);
        assert!(tracker.rect().is_some());

        tracker.set_target(&mut host, Target::resolver(|_| None), 0.0);
        assert_eq!(tracker.rect(), None);

        tracker.set_target(
            &mut host,
            Target::resolver(|host| host.query_selector(TARGET)),
            0.0,
        );
        assert!(tracker.rect().is_some());
    }

    #[test]
    fn detached_element_handle_yields_none() {
        let mut host = host_with_target();
        let id = host.query_selector(TARGET).expect("target");
        let mut tracker = TargetTracker::new(Duration::from_millis(100));
        tracker.set_target(&mut host, Target::Element(id), 0.0);
        tracker.set_active(&mut host, true);
        host.remove(TARGET);
        assert!(tracker.refresh(&host));
        assert_eq!(tracker.rect(), None);
    }
}
