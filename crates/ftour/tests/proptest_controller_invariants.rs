//! Property-based invariant tests for tour navigation.
//!
//! Any sequence of open / next / prev / jump / close / key operations keeps
//! the index inside the step list while open and at zero while closed. The
//! provider variant additionally checks that host resources track the open
//! flag exactly.

use std::time::Duration;

use ftour::TourController;
use ftour::TourProvider;
use ftour_core::config::TourConfig;
use ftour_core::event::{KeyCode, KeyEvent};
use ftour_core::geometry::Rect;
use ftour_core::host::Host;
use ftour_core::memory_host::MemoryHost;
use ftour_overlay::TourStep;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Open(usize, usize),
    Next,
    Prev,
    GoTo(isize),
    Close,
    Key(u8),
    Tick(u16),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..6, 0usize..10).prop_map(|(n, start)| Op::Open(n, start)),
        Just(Op::Next),
        Just(Op::Prev),
        (-5isize..12).prop_map(Op::GoTo),
        Just(Op::Close),
        (0u8..4).prop_map(Op::Key),
        (0u16..300).prop_map(Op::Tick),
    ]
}

fn steps(n: usize) -> Vec<TourStep> {
    (0..n)
        .map(|i| TourStep::new(format!("#s{}", i % 3), format!("step {i}")))
        .collect()
}

fn key(code: u8) -> KeyEvent {
    KeyEvent::new(match code {
        0 => KeyCode::Escape,
        1 => KeyCode::Right,
        2 => KeyCode::Left,
        _ => KeyCode::Enter,
    })
}

proptest! {
    #[test]
    fn controller_index_stays_in_range(ops in proptest::collection::vec(op_strategy(), 0..64)) {
        let mut controller = TourController::new();
        for op in ops {
            let before = (controller.is_open(), controller.current_step_index());
            match op {
                Op::Open(n, start) => {
                    let opened = controller.open(steps(n), start);
                    prop_assert_eq!(opened.is_none(), n == 0);
                    if n > 0 {
                        prop_assert_eq!(controller.current_step_index(), start.min(n - 1));
                    }
                }
                Op::Next => { controller.next(); }
                Op::Prev => {
                    let event = controller.prev();
                    if before == (true, 0) {
                        prop_assert!(event.is_none());
                        prop_assert_eq!(controller.current_step_index(), 0);
                    }
                }
                Op::GoTo(i) => { controller.go_to(i); }
                Op::Close => {
                    controller.close();
                    prop_assert!(controller.close().is_none());
                }
                Op::Key(code) => { controller.handle_key(&key(code)); }
                Op::Tick(_) => {}
            }
            if controller.is_open() {
                prop_assert!(controller.current_step_index() < controller.step_count());
                prop_assert!(controller.current_step().is_some());
            } else {
                prop_assert_eq!(controller.current_step_index(), 0);
                prop_assert!(controller.current_step().is_none());
            }
        }
    }

    #[test]
    fn provider_resources_follow_open_flag(ops in proptest::collection::vec(op_strategy(), 0..48)) {
        let mut host = MemoryHost::new(1024.0, 768.0);
        host.insert("#s0", Rect::new(10.0, 10.0, 100.0, 20.0));
        host.insert("#s1", Rect::new(10.0, 200.0, 100.0, 20.0));
        host.set_body_overflow(Some("auto"));

        let mut provider = TourProvider::new(TourConfig::default());
        for op in ops {
            match op {
                Op::Open(n, start) => { let _ = provider.open(&mut host, steps(n), start); }
                Op::Next => { provider.next(&mut host); }
                Op::Prev => { provider.prev(&mut host); }
                Op::GoTo(i) => { provider.go_to(&mut host, i); }
                Op::Close => { provider.close(&mut host); }
                Op::Key(code) => {
                    if let Some(event) = host.key(key(code)) {
                        provider.handle_event(&mut host, &event);
                    }
                }
                Op::Tick(ms) => {
                    let until = host.now() + Duration::from_millis(u64::from(ms));
                    while let Some(event) = host.poll_timer(until) {
                        provider.handle_event(&mut host, &event);
                    }
                }
            }
            if provider.is_open() {
                prop_assert_eq!((host.active_timers(), host.active_listeners()), (1, 3));
                prop_assert_eq!(host.mounted_portals(), 1);
                prop_assert_eq!(host.body_overflow(), Some("hidden".to_owned()));
                prop_assert!(provider.render().is_some());
            } else {
                prop_assert_eq!((host.active_timers(), host.active_listeners()), (0, 0));
                prop_assert_eq!(host.mounted_portals(), 0);
                prop_assert_eq!(host.body_overflow(), Some("auto".to_owned()));
                prop_assert_eq!(provider.current_step_index(), 0);
                prop_assert!(provider.render().is_none());
            }
        }
        provider.destroy(&mut host);
    }
}
