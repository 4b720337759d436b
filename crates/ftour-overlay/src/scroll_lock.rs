#![forbid(unsafe_code)]

//! Body scroll lock.
//!
//! The lock is a thread-global, reference-counted resource. The first
//! [`acquire`] saves `document.body.style.overflow` and sets it to `hidden`;
//! the last [`ScrollLockToken::release`] restores the saved value. Tokens are
//! consumed on release, so one acquisition can only be released once.

use std::cell::RefCell;

use ftour_core::host::Host;

#[derive(Debug, Default)]
struct LockState {
    count: usize,
    saved: Option<String>,
}

thread_local! {
    static LOCK: RefCell<LockState> = RefCell::new(LockState::default());
}

/// Proof of one outstanding acquisition.
#[must_use = "a scroll lock must be released through ScrollLockToken::release"]
#[derive(Debug)]
pub struct ScrollLockToken {
    _private: (),
}

/// Lock body scrolling, saving the previous overflow on first acquisition.
pub fn acquire(host: &mut dyn Host) -> ScrollLockToken {
    LOCK.with(|lock| {
        let mut state = lock.borrow_mut();
        if state.count == 0 {
            state.saved = host.body_overflow();
            host.set_body_overflow(Some("hidden"));
            tracing::trace!(saved = ?state.saved, "scroll lock engaged");
        }
        state.count += 1;
    });
    ScrollLockToken { _private: () }
}

impl ScrollLockToken {
    /// Release this acquisition; the last release restores the saved overflow.
    pub fn release(self, host: &mut dyn Host) {
        LOCK.with(|lock| {
            let mut state = lock.borrow_mut();
            state.count = state.count.saturating_sub(1);
            if state.count == 0 {
                let saved = state.saved.take();
                host.set_body_overflow(saved.as_deref());
                tracing::trace!(restored = ?saved, "scroll lock released");
            }
        });
    }
}

/// Outstanding acquisitions on this thread.
pub fn lock_count() -> usize {
    LOCK.with(|lock| lock.borrow().count)
}
