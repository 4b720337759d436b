#![forbid(unsafe_code)]

//! A simulated code-enforcement site on the in-memory host.
//!
//! Three pages: the dashboard (`/`), the workspace for the demo address
//! (`/address/1143`) and the commenting help page (`/help/commenting`).
//! Clicking the controls the tours click mounts the next part of the UI, the
//! same way the real pages open modals and expand forms.

use ftour_core::geometry::Rect;
use ftour_core::memory_host::{ClickEffect, MemoryHost};

pub const DASHBOARD: &str = "/";
pub const DEMO_ADDRESS_ID: &str = "1143";
pub const DEMO_ADDRESS_SEARCH: &str = "5008 Queensbury";
pub const HELP_COMMENTING: &str = "/help/commenting";

/// Route of the demo address workspace.
pub fn address_route() -> String {
    format!("/address/{DEMO_ADDRESS_ID}")
}

/// `[data-tour-id="<id>"]`
pub fn tour_id(id: &str) -> String {
    format!("[data-tour-id=\"{id}\"]")
}

/// `[data-tour="<id>"]`
pub fn data_tour(id: &str) -> String {
    format!("[data-tour=\"{id}\"]")
}

pub const SEARCH_RESULT_ITEMS: &str = "[data-tour-id=\"address-search-results\"] li";
pub const QUICK_ADDRESS_INPUT: &str = "[data-tour-id=\"new-violation-address\"] input";

const VIOLATION_TOGGLE_GROUP: &str = "@violation-toggle";
const VIOLATION_FORM_GROUP: &str = "@violation-form";
const QUICK_ACTION_GROUP: &str = "@quick-action";
const QUICK_FORM_GROUP: &str = "@quick-form";

pub const VIEWPORT: (f64, f64) = (1280.0, 800.0);

/// Build the site with the dashboard as the current route.
pub fn build() -> MemoryHost {
    let mut host = MemoryHost::new(VIEWPORT.0, VIEWPORT.1);
    host.set_route(DASHBOARD);
    chrome(&mut host);
    dashboard(&mut host);
    address_workspace(&mut host);
    commenting_help(&mut host);
    host
}

fn chrome(host: &mut MemoryHost) {
    host.insert(&tour_id("nav-dashboard"), Rect::new(16.0, 96.0, 200.0, 40.0));
    let search = host.insert(&tour_id("address-search-input"), Rect::new(240.0, 16.0, 420.0, 40.0));
    host.alias(search, &tour_id("global-address-search"));
    host.make_input(search, "");
}

fn dashboard(host: &mut MemoryHost) {
    host.insert_on_route(
        DASHBOARD,
        &tour_id("address-search-results"),
        Rect::new(240.0, 60.0, 420.0, 120.0),
    );
    let results = [
        "Town Hall \u{2013} 5008 Queensbury Road",
        "5010 Queensbury Road",
    ];
    for (i, text) in results.iter().enumerate() {
        let top = 68.0 + 48.0 * i as f64;
        let item = host.insert_on_route(DASHBOARD, SEARCH_RESULT_ITEMS, Rect::new(248.0, top, 404.0, 40.0));
        host.set_text(item, text);
        host.alias(item, &tour_id(&format!("address-search-result-{i}")));
    }
    host.on_click(SEARCH_RESULT_ITEMS, ClickEffect::Navigate(address_route()));

    host.insert_on_route(
        DASHBOARD,
        &tour_id("home-quick-actions-toggle"),
        Rect::new(1160.0, 96.0, 96.0, 40.0),
    );
    let quick = host.insert_on_route(
        DASHBOARD,
        &tour_id("home-new-violation-quick-action"),
        Rect::new(960.0, 144.0, 296.0, 48.0),
    );
    host.alias(quick, QUICK_ACTION_GROUP);
    host.remove(QUICK_ACTION_GROUP);
    host.on_click(&tour_id("home-quick-actions-toggle"), ClickEffect::Mount(QUICK_ACTION_GROUP.into()));

    let fields: [(String, Rect, Option<&str>); 8] = [
        (tour_id("new-violation-form"), Rect::new(400.0, 200.0, 560.0, 560.0), None),
        (tour_id("new-violation-address"), Rect::new(420.0, 240.0, 520.0, 56.0), None),
        (QUICK_ADDRESS_INPUT.to_owned(), Rect::new(432.0, 252.0, 496.0, 32.0), Some("")),
        (tour_id("new-violation-type"), Rect::new(420.0, 312.0, 520.0, 40.0), Some("Doorhanger")),
        (tour_id("new-violation-codes"), Rect::new(420.0, 368.0, 520.0, 96.0), None),
        (tour_id("new-violation-deadline"), Rect::new(420.0, 480.0, 520.0, 40.0), Some("14 days")),
        (tour_id("new-violation-attachments"), Rect::new(420.0, 536.0, 520.0, 120.0), None),
        (tour_id("new-violation-submit"), Rect::new(780.0, 680.0, 160.0, 44.0), None),
    ];
    mount_group(host, DASHBOARD, QUICK_FORM_GROUP, &fields);
    host.on_click(&tour_id("home-new-violation-quick-action"), ClickEffect::Mount(QUICK_FORM_GROUP.into()));
}

fn address_workspace(host: &mut MemoryHost) {
    let route = address_route();
    let tabs = [
        ("address-violations-tab", "address-tab-violations", 240.0),
        ("address-inspections-tab", "address-tab-inspections", 480.0),
        ("address-comments-tab", "address-tab-comments", 720.0),
    ];
    for (id, alias, left) in tabs {
        let tab = host.insert_on_route(&route, &tour_id(id), Rect::new(left, 180.0, 220.0, 120.0));
        host.alias(tab, &tour_id(alias));
    }
    host.insert_on_route(&route, &tour_id("address-comment-form"), Rect::new(720.0, 320.0, 400.0, 220.0));

    let toggle = host.insert_on_route(
        &route,
        &tour_id("address-new-violation-button"),
        Rect::new(240.0, 320.0, 180.0, 40.0),
    );
    host.alias(toggle, VIOLATION_TOGGLE_GROUP);
    host.remove(VIOLATION_TOGGLE_GROUP);
    host.on_click(&tour_id("address-violations-tab"), ClickEffect::Mount(VIOLATION_TOGGLE_GROUP.into()));

    let fields: [(String, Rect, Option<&str>); 5] = [
        (tour_id("address-violation-type"), Rect::new(240.0, 380.0, 440.0, 40.0), Some("Doorhanger")),
        (tour_id("address-violation-codes"), Rect::new(240.0, 436.0, 440.0, 96.0), None),
        (tour_id("address-violation-deadline"), Rect::new(240.0, 548.0, 440.0, 40.0), Some("14 days")),
        (tour_id("address-violation-attachments"), Rect::new(240.0, 604.0, 440.0, 100.0), None),
        (tour_id("address-violation-submit"), Rect::new(520.0, 720.0, 160.0, 44.0), None),
    ];
    mount_group(host, &route, VIOLATION_FORM_GROUP, &fields);
    host.on_click(&tour_id("address-new-violation-button"), ClickEffect::Mount(VIOLATION_FORM_GROUP.into()));
}

fn commenting_help(host: &mut MemoryHost) {
    let sections = [
        ("address-search", 120.0, 160.0),
        ("address-result", 300.0, 96.0),
        ("comments-tab", 416.0, 64.0),
        ("comment-editor", 500.0, 160.0),
        ("comment-submit", 676.0, 44.0),
    ];
    for (id, top, height) in sections {
        host.insert_on_route(HELP_COMMENTING, &data_tour(id), Rect::new(160.0, top, 960.0, height));
    }
}

/// Insert `fields` on `route` under a shared group selector, detached until
/// something mounts the group.
fn mount_group(host: &mut MemoryHost, route: &str, group: &str, fields: &[(String, Rect, Option<&str>)]) {
    for (selector, rect, value) in fields {
        let id = host.insert_on_route(route, selector, *rect);
        host.alias(id, group);
        if let Some(value) = value {
            host.make_input(id, value);
        }
    }
    host.remove(group);
}
