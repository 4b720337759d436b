#![forbid(unsafe_code)]

//! Auto-advance signalling.
//!
//! Any part of the application can announce "I completed action X" with
//! [`dispatch_tour_advance`] without holding a reference to a tour. The bus is
//! thread-global and carries nothing but [`AdvanceEvent`]s; every live
//! [`AdvanceSubscription`] on the thread gets its own copy.
//!
//! [`AutoAdvanceListener`] turns those events into controller transitions:
//! the keys it has seen accumulate in a completed set that is never cleared,
//! and whenever the current step's `advance_on` key is in that set the tour
//! moves on. A key seen before its step becomes current is honoured once the
//! step is reached.

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use crate::controller::{TourAdvanceReason, TourController, TourEvent};

/// Name of the DOM custom event the web host forwards into the bus.
pub const TOUR_ADVANCE_EVENT: &str = "app:tour:advance";

/// Payload of one advance signal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AdvanceEvent {
    pub step_id: String,
}

type Inbox = Rc<RefCell<VecDeque<AdvanceEvent>>>;

#[derive(Default)]
struct Bus {
    next_id: u64,
    subscribers: Vec<(u64, Inbox)>,
}

thread_local! {
    static BUS: RefCell<Bus> = RefCell::new(Bus::default());
}

/// Announce a completed action. Empty ids are ignored.
///
/// Returns how many subscriptions received the event.
pub fn dispatch_tour_advance(step_id: &str) -> usize {
    if step_id.is_empty() {
        return 0;
    }
    let event = AdvanceEvent {
        step_id: step_id.to_owned(),
    };
    BUS.with(|bus| {
        let bus = bus.borrow();
        for (_, inbox) in &bus.subscribers {
            inbox.borrow_mut().push_back(event.clone());
        }
        tracing::debug!(step_id, receivers = bus.subscribers.len(), "tour advance dispatched");
        bus.subscribers.len()
    })
}

/// Live subscriptions on this thread.
pub fn subscriber_count() -> usize {
    BUS.with(|bus| bus.borrow().subscribers.len())
}

/// A receiving end of the bus. Unsubscribes on drop.
#[derive(Debug)]
pub struct AdvanceSubscription {
    id: u64,
    inbox: Inbox,
}

impl AdvanceSubscription {
    pub fn subscribe() -> Self {
        let inbox: Inbox = Rc::default();
        let id = BUS.with(|bus| {
            let mut bus = bus.borrow_mut();
            let id = bus.next_id;
            bus.next_id += 1;
            bus.subscribers.push((id, Rc::clone(&inbox)));
            id
        });
        Self { id, inbox }
    }

    /// Take every event received since the last drain, oldest first.
    pub fn drain(&self) -> Vec<AdvanceEvent> {
        self.inbox.borrow_mut().drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.inbox.borrow().len()
    }
}

impl Drop for AdvanceSubscription {
    fn drop(&mut self) {
        let id = self.id;
        // The bus may already be gone during thread teardown.
        let _ = BUS.try_with(|bus| {
            bus.borrow_mut().subscribers.retain(|(sub, _)| *sub != id);
        });
    }
}

/// Advances a controller when its current step's key has been observed.
#[derive(Debug)]
pub struct AutoAdvanceListener {
    subscription: AdvanceSubscription,
    completed: HashSet<String>,
}

impl Default for AutoAdvanceListener {
    fn default() -> Self {
        Self::new()
    }
}

impl AutoAdvanceListener {
    pub fn new() -> Self {
        Self {
            subscription: AdvanceSubscription::subscribe(),
            completed: HashSet::new(),
        }
    }

    /// Move received events into the completed set. Returns `true` when a
    /// key was seen for the first time.
    pub fn pump(&mut self) -> bool {
        let mut fresh = false;
        for event in self.subscription.drain() {
            fresh |= self.completed.insert(event.step_id);
        }
        fresh
    }

    /// Mark a key completed directly.
    pub fn record(&mut self, key: impl Into<String>) -> bool {
        self.completed.insert(key.into())
    }

    pub fn is_completed(&self, key: &str) -> bool {
        self.completed.contains(key)
    }

    /// Advance while the current step's key is completed. Closes the tour
    /// when that step is the last one.
    pub fn sync(&mut self, controller: &mut TourController) -> Vec<TourEvent> {
        let mut events = Vec::new();
        loop {
            let satisfied = controller
                .current_step()
                .and_then(|step| step.advance_key())
                .is_some_and(|key| self.completed.contains(key));
            if !satisfied {
                break;
            }
            match controller.advance(TourAdvanceReason::Auto) {
                Some(event) => {
                    let done = event.is_terminal();
                    events.push(event);
                    if done {
                        break;
                    }
                }
                None => break,
            }
        }
        events
    }

    /// [`Self::pump`] followed by [`Self::sync`].
    pub fn pump_and_sync(&mut self, controller: &mut TourController) -> Vec<TourEvent> {
        self.pump();
        self.sync(controller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::TourStepList;
    use ftour_overlay::step::TourStep;

    fn gated_steps() -> TourStepList {
        vec![
            TourStep::new("#a", "A"),
            TourStep::new("#b", "B").advance_on("commentPosted"),
            TourStep::new("#c", "C"),
        ]
        .into()
    }

    #[test]
    fn empty_ids_are_dropped() {
        let sub = AdvanceSubscription::subscribe();
        assert_eq!(dispatch_tour_advance(""), 0);
        assert_eq!(sub.pending(), 0);
    }

    #[test]
    fn every_subscription_gets_a_copy() {
        let a = AdvanceSubscription::subscribe();
        let b = AdvanceSubscription::subscribe();
        assert_eq!(dispatch_tour_advance("x"), 2);
        assert_eq!(a.drain().len(), 1);
        assert_eq!(b.drain().len(), 1);
        drop(b);
        assert_eq!(dispatch_tour_advance("y"), 1);
        assert_eq!(a.drain()[0].step_id, "y");
    }

    #[test]
    fn matching_key_advances_one_step() {
        let mut listener = AutoAdvanceListener::new();
        let mut c = TourController::new();
        c.open(gated_steps(), 1);
        dispatch_tour_advance("commentPosted");
        let events = listener.pump_and_sync(&mut c);
        assert_eq!(events.len(), 1);
        assert_eq!(c.current_step_index(), 2);
    }

    #[test]
    fn unrelated_key_does_nothing() {
        let mut listener = AutoAdvanceListener::new();
        let mut c = TourController::new();
        c.open(gated_steps(), 1);
        dispatch_tour_advance("somethingElse");
        assert!(listener.pump_and_sync(&mut c).is_empty());
        assert_eq!(c.current_step_index(), 1);
    }

    #[test]
    fn key_on_ungated_step_does_nothing_until_reached() {
        let mut listener = AutoAdvanceListener::new();
        let mut c = TourController::new();
        c.open(gated_steps(), 0);
        dispatch_tour_advance("commentPosted");
        assert!(listener.pump_and_sync(&mut c).is_empty());
        assert_eq!(c.current_step_index(), 0);
        // remembered: reaching B moves straight on to C
        c.next();
        listener.sync(&mut c);
        assert_eq!(c.current_step_index(), 2);
    }

    #[test]
    fn gated_last_step_closes() {
        let steps: TourStepList = vec![
            TourStep::new("#a", "A"),
            TourStep::new("#b", "B").advance_on("done"),
        ]
        .into();
        let mut listener = AutoAdvanceListener::new();
        let mut c = TourController::new();
        c.open(steps, 1);
        listener.record("done");
        assert_eq!(
            listener.sync(&mut c),
            vec![TourEvent::Finished { last_index: 1 }]
        );
        assert!(!c.is_open());
    }

    #[test]
    fn consecutive_satisfied_steps_chain() {
        let steps: TourStepList = vec![
            TourStep::new("#a", "A").advance_on("one"),
            TourStep::new("#b", "B").advance_on("two"),
            TourStep::new("#c", "C"),
        ]
        .into();
        let mut listener = AutoAdvanceListener::new();
        listener.record("one");
        listener.record("two");
        let mut c = TourController::new();
        c.open(steps, 0);
        assert_eq!(listener.sync(&mut c).len(), 2);
        assert_eq!(c.current_step_index(), 2);
    }

    #[test]
    fn dropping_listener_unsubscribes() {
        let before = subscriber_count();
        let listener = AutoAdvanceListener::new();
        assert_eq!(subscriber_count(), before + 1);
        drop(listener);
        assert_eq!(subscriber_count(), before);
    }
}
