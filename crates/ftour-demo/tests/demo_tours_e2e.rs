//! Demo Tour E2E Tests
//!
//! Plays every built-in tour against the simulated site and checks what a
//! user would have seen.
//!
//! # Running Tests
//!
//! ```sh
//! FTOUR_LOG=debug cargo test -p ftour-demo --test demo_tours_e2e -- --nocapture
//! ```
//!
//! # Invariants
//!
//! 1. **Every tour finishes**: each built-in tour plays from launch to `Finished`
//! 2. **One frame per step**: the player observes each step exactly once
//! 3. **Scripts drive the site**: routes and form values change as the steps say
//! 4. **Clean teardown**: no timers, listeners or portals survive a finished tour

use std::time::Duration;

use ftour::LaunchStatus;
use ftour_core::config::TourConfig;
use ftour_core::host::Host;
use ftour_demo::player::{PlayReport, TourPlayer};
use ftour_demo::site::{self, HELP_COMMENTING, QUICK_ADDRESS_INPUT, address_route, tour_id};
use ftour_demo::tours;
use pretty_assertions::assert_eq;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::try_from_env("FTOUR_LOG").unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();
}

fn play(id: &str, config: TourConfig) -> (TourPlayer, PlayReport) {
    let catalog = tours::builtin_catalog();
    let tour = catalog.get(id).expect("built-in tour");
    let mut player = TourPlayer::new(site::build(), config, Duration::from_millis(300));
    let report = player
        .play(tour, |frame| info!(index = frame.index, label = %frame.label, "frame"))
        .expect("play");
    assert_eq!(report.frames.len(), tour.steps.len(), "one frame per step");
    (player, report)
}

fn assert_torn_down(player: &TourPlayer) {
    assert!(!player.provider().is_open());
    assert_eq!(player.host().active_timers(), 0);
    assert_eq!(player.host().active_listeners(), 0);
    assert_eq!(player.host().mounted_portals(), 0);
}

#[test]
fn violation_entry_walks_both_forms() {
    init_tracing();
    let (player, report) = play("violation-entry", TourConfig::default());
    assert_eq!(report.status, LaunchStatus::Preparing);
    assert!(report.finished());

    // The search result is clicked away by its own step.
    let placeholders: Vec<usize> = report.placeholders().map(|f| f.index).collect();
    assert_eq!(placeholders, vec![1]);

    let host = player.host();
    assert!(host.navigations().contains(&address_route()));
    assert_eq!(host.current_route().as_deref(), Some(site::DASHBOARD));

    let input = host.query_selector(QUICK_ADDRESS_INPUT).expect("quick form mounted");
    assert_eq!(host.value(input).as_deref(), Some(site::DEMO_ADDRESS_ID));
    let deadline = host
        .query_selector(&tour_id("new-violation-deadline"))
        .expect("deadline");
    assert_eq!(host.value(deadline).as_deref(), Some("7 days"));

    let frame = &report.frames[2];
    assert_eq!(frame.step_id.as_deref(), Some("address-violations-tab"));
    assert_eq!(frame.placement, "right");
    assert_eq!(frame.route, Some(address_route()));
    assert_torn_down(&player);
}

#[test]
fn address_overview_reaches_the_comment_form() {
    init_tracing();
    let (player, report) = play("address-overview", TourConfig::default());
    assert!(report.finished());
    assert_eq!(report.placeholders().count(), 0);

    let labels: Vec<&str> = report.frames.iter().map(|f| f.label.as_str()).collect();
    assert_eq!(
        labels,
        [
            "Find an address",
            "Pick the matching record",
            "Review violations",
            "Inspect scheduled work",
            "Open the comments feed",
            "Leave a comment",
        ]
    );
    assert_eq!(report.frames[5].route, Some(address_route()));
    assert_torn_down(&player);
}

#[test]
fn commenting_waits_for_the_posted_comment() {
    init_tracing();
    let (player, report) = play("commenting", TourConfig::default().without_keyboard_navigation());
    assert!(report.finished());
    assert!(report.frames.iter().all(|f| f.route.as_deref() == Some(HELP_COMMENTING)));
    assert_eq!(report.frames[3].highlight, Some([152.0, 492.0, 976.0, 176.0]));
    assert_torn_down(&player);
}
