#![forbid(unsafe_code)]

//! Shared queue between DOM callbacks and the engine.
//!
//! Timer and listener closures only push [`HostEvent`]s; the engine drains
//! them. After each push the optional waker runs with no borrow held, so a
//! waker that re-enters the queue (or finds the engine busy and returns) is
//! safe. [`HostEventQueue::run_or_defer`] applies the same rule to calls from
//! page code: a call that arrives while the engine is on the stack becomes a
//! queued event for the running drain.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use ftour_core::event::HostEvent;

type Waker = Rc<dyn Fn()>;

#[derive(Default)]
struct Inner {
    events: VecDeque<HostEvent>,
    waker: Option<Waker>,
}

/// Cloneable handle to one event queue.
#[derive(Clone, Default)]
pub struct HostEventQueue {
    inner: Rc<RefCell<Inner>>,
}

impl fmt::Debug for HostEventQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostEventQueue")
            .field("pending", &self.len())
            .finish_non_exhaustive()
    }
}

impl HostEventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `waker` after every push.
    pub fn set_waker(&self, waker: impl Fn() + 'static) {
        self.inner.borrow_mut().waker = Some(Rc::new(waker));
    }

    pub fn clear_waker(&self) {
        self.inner.borrow_mut().waker = None;
    }

    pub fn push(&self, event: HostEvent) {
        let waker = {
            let mut inner = self.inner.borrow_mut();
            inner.events.push_back(event);
            inner.waker.clone()
        };
        if let Some(waker) = waker {
            waker();
        }
    }

    /// Oldest pending event.
    pub fn pop(&self) -> Option<HostEvent> {
        self.inner.borrow_mut().events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop everything pending.
    pub fn clear(&self) {
        self.inner.borrow_mut().events.clear();
    }

    /// Run `f` on `target` if nothing holds it, else queue `deferred` for
    /// whoever does. Returns `None` when deferred.
    pub fn run_or_defer<T, R>(
        &self,
        target: &RefCell<T>,
        deferred: HostEvent,
        f: impl FnOnce(&mut T) -> R,
    ) -> Option<R> {
        match target.try_borrow_mut() {
            Ok(mut target) => Some(f(&mut target)),
            Err(_) => {
                self.push(deferred);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftour_core::host::TimerId;
    use std::cell::Cell;

    #[test]
    fn events_pop_in_push_order() {
        let queue = HostEventQueue::new();
        queue.push(HostEvent::Scroll);
        queue.push(HostEvent::Timer(TimerId(4)));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop(), Some(HostEvent::Scroll));
        assert_eq!(queue.pop(), Some(HostEvent::Timer(TimerId(4))));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn busy_target_defers_instead_of_panicking() {
        let queue = HostEventQueue::new();
        let steps = RefCell::new(Vec::<&str>::new());
        let ran = queue.run_or_defer(&steps, HostEvent::OverlayAction("next".into()), |s| {
            s.push("outer");
            // A page handler calling back in while the outer call runs.
            queue.run_or_defer(&steps, HostEvent::OverlayAction("next".into()), |s| {
                s.push("inner");
            })
        });
        assert_eq!(ran, Some(None));
        assert_eq!(*steps.borrow(), vec!["outer"]);
        assert_eq!(queue.pop(), Some(HostEvent::OverlayAction("next".into())));
        assert!(queue.is_empty());

        let _held = steps.borrow();
        assert_eq!(queue.run_or_defer(&steps, HostEvent::Scroll, |s| s.len()), None);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn waker_runs_after_push_without_a_borrow() {
        let queue = HostEventQueue::new();
        let seen = Rc::new(Cell::new(0));
        let (q, s) = (queue.clone(), Rc::clone(&seen));
        queue.set_waker(move || {
            // Draining from inside the waker must not panic.
            while q.pop().is_some() {
                s.set(s.get() + 1);
            }
        });
        queue.push(HostEvent::Scroll);
        queue.push(HostEvent::Scroll);
        assert_eq!(seen.get(), 2);
        assert!(queue.is_empty());

        queue.clear_waker();
        queue.push(HostEvent::Scroll);
        assert_eq!(seen.get(), 2);
        queue.clear();
        assert!(queue.is_empty());
    }
}
