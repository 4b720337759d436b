//! Property-based invariant tests for tracker teardown.
//!
//! Any sequence of activate / deactivate / retarget / tick operations leaves
//! exactly one timer and two listeners while active, and nothing once
//! deactivated.

use std::time::Duration;

use ftour_core::geometry::Rect;
use ftour_core::host::Host;
use ftour_core::memory_host::MemoryHost;
use ftour_core::target::Target;
use ftour_core::tracker::TargetTracker;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Activate,
    Deactivate,
    Retarget(u8),
    Tick(u16),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Activate),
        Just(Op::Deactivate),
        (0u8..4).prop_map(Op::Retarget),
        (0u16..400).prop_map(Op::Tick),
    ]
}

proptest! {
    #[test]
    fn registrations_never_leak(ops in proptest::collection::vec(op_strategy(), 0..64)) {
        let mut host = MemoryHost::new(1024.0, 768.0);
        let selectors = ["#a", "#b", "#c", "#missing"];
        host.insert("#a", Rect::new(0.0, 0.0, 10.0, 10.0));
        host.insert("#b", Rect::new(20.0, 0.0, 10.0, 10.0));
        host.insert("#c", Rect::new(40.0, 0.0, 10.0, 10.0));

        let mut tracker = TargetTracker::new(Duration::from_millis(100));
        for op in ops {
            match op {
                Op::Activate => tracker.set_active(&mut host, true),
                Op::Deactivate => tracker.set_active(&mut host, false),
                Op::Retarget(i) => {
                    tracker.set_target(&mut host, Target::from(selectors[i as usize]), 12.0)
                }
                Op::Tick(ms) => {
                    let until = host.now() + Duration::from_millis(u64::from(ms));
                    while let Some(event) = host.poll_timer(until) {
                        tracker.handle_event(&host, &event);
                    }
                }
            }
            let expected = if tracker.is_active() { (1, 2) } else { (0, 0) };
            prop_assert_eq!((host.active_timers(), host.active_listeners()), expected);
            if !tracker.is_active() {
                prop_assert_eq!(tracker.rect(), None);
            }
        }

        tracker.set_active(&mut host, false);
        prop_assert_eq!(host.active_timers(), 0);
        prop_assert_eq!(host.active_listeners(), 0);
    }
}
