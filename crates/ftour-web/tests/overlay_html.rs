//! Overlay HTML Tests
//!
//! Renders provider frames against an in-memory page and checks the HTML the
//! browser host would paint into the portal.
//!
//! # Running Tests
//!
//! ```sh
//! cargo test -p ftour-web --test overlay_html
//! ```

use ftour::TourProvider;
use ftour_core::config::TourConfig;
use ftour_core::geometry::Rect;
use ftour_core::memory_host::MemoryHost;
use ftour_overlay::{Placement, TourStep};
use ftour_web::html;
use pretty_assertions::assert_eq;

fn page() -> MemoryHost {
    let mut host = MemoryHost::new(1280.0, 720.0);
    host.insert("#search", Rect::new(50.0, 100.0, 200.0, 40.0));
    host
}

#[test]
fn tracked_step_paints_highlight_and_positioned_tooltip() {
    let mut host = page();
    let mut provider = TourProvider::new(TourConfig::default());
    let steps = vec![
        TourStep::new("#search", "Find an address <fast>.")
            .with_title("Search")
            .with_placement(Placement::Right),
        TourStep::new("#missing", "Not on this page."),
    ];
    provider.open(&mut host, steps, 0).expect("open");

    let markup = html::render(&provider.render().expect("open").root);
    assert!(markup.starts_with(r#"<div class="tour-overlay" role="dialog""#));
    assert!(markup.contains(r#"<div class="tour-highlight""#));
    assert!(markup.contains(r#"data-placement="right""#));
    assert!(markup.contains("left: 278px; top: 120px"));
    assert!(markup.contains("Find an address &lt;fast&gt;."));
    assert!(markup.contains(r#"<h3 class="tour-title">Search</h3>"#));
    assert!(markup.contains("Step 1 of 2"));
    assert!(markup.contains(r#"data-ftour-action="next""#));
    assert!(markup.ends_with("</div>"));

    provider.next(&mut host);
    let markup = html::render(&provider.render().expect("open").root);
    assert!(markup.contains(r#"<div class="tour-placeholder""#));
    assert!(!markup.contains("tour-highlight"));
    assert!(markup.contains("left: 50%; top: 50%; transform: translate(-50%, -50%)"));
    provider.destroy(&mut host);
}

#[test]
fn first_step_back_button_is_disabled_without_action() {
    let mut host = page();
    let mut provider = TourProvider::new(TourConfig::default());
    provider
        .open(&mut host, vec![TourStep::new("#search", "x"), TourStep::new("#search", "y")], 0)
        .expect("open");
    let view = provider.render().expect("open");
    let back = view.root.find_class("tour-back").expect("back button");
    assert_eq!(
        html::render(&back.clone().into()),
        r#"<button class="tour-nav tour-back" type="button" disabled="">Back</button>"#
    );
    provider.destroy(&mut host);
}
