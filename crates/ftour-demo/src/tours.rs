#![forbid(unsafe_code)]

//! Built-in tours.
//!
//! `violation-entry` and `address-overview` are declared in Rust with step
//! scripts; `commenting` ships as a JSON descriptor to exercise the loader.

use std::fs;
use std::path::Path;
use std::time::Duration;

use ftour::{TourCatalog, TourDefinition};
use ftour_core::script::{DEFAULT_WAIT_INTERVAL, ScriptAction, StepScript};
use ftour_overlay::{Element, Node, Placement, StepContent, TourStep};

use crate::site::{
    DASHBOARD, DEMO_ADDRESS_ID, DEMO_ADDRESS_SEARCH, QUICK_ADDRESS_INPUT, SEARCH_RESULT_ITEMS, address_route,
    tour_id,
};

const COMMENTING_JSON: &str = include_str!("../tours/commenting.json");

/// Every built-in tour, in help-page order.
pub fn builtin_catalog() -> TourCatalog {
    let mut catalog = TourCatalog::new();
    catalog.register(violation_entry());
    catalog.register(address_overview());
    match catalog.register_json(COMMENTING_JSON) {
        Ok(id) => tracing::debug!(tour = %id, "registered bundled descriptor"),
        Err(err) => tracing::error!(error = %err, "bundled commenting tour is invalid"),
    }
    catalog
}

/// Register every `*.json` file in `dir`. Returns the ids registered; bad
/// files are logged and skipped.
pub fn load_dir(catalog: &mut TourCatalog, dir: &Path) -> std::io::Result<Vec<String>> {
    let mut paths: Vec<_> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut ids = Vec::new();
    for path in paths {
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "unreadable tour file");
                continue;
            }
        };
        match catalog.register_json(&json) {
            Ok(id) => ids.push(id),
            Err(err) => tracing::warn!(path = %path.display(), error = %err, "skipping tour file"),
        }
    }
    Ok(ids)
}

/// Title, description and optional footnote, the layout every
/// violation-entry step uses.
fn card(title: &str, description: &str, footer: Option<&str>) -> StepContent {
    let mut body = Element::new("div")
        .class("tour-content")
        .child(Element::new("h3").class("tour-content-title").child(Node::text(title)))
        .child(Node::paragraph(description));
    if let Some(footer) = footer {
        body = body.child(Element::new("p").class("tour-footnote").child(Node::text(footer)));
    }
    StepContent::from(Node::from(body))
}

fn step(id: &str, description: StepContent) -> TourStep {
    TourStep::new(tour_id(id), description).with_id(id)
}

fn set_value(id: &str, value: &str) -> ScriptAction {
    ScriptAction::SetValue {
        selector: tour_id(id),
        value: value.to_owned(),
    }
}

fn wait_for(id: &str, timeout_ms: u64) -> ScriptAction {
    ScriptAction::WaitForElement {
        selector: tour_id(id),
        timeout: Duration::from_millis(timeout_ms),
        interval: DEFAULT_WAIT_INTERVAL,
    }
}

fn open_then_wait(toggle: &str, settle_ms: u64, next: &str) -> StepScript {
    StepScript::new()
        .then(ScriptAction::ScrollIntoView {
            selector: tour_id(toggle),
        })
        .then(ScriptAction::pause_ms(settle_ms))
        .then(ScriptAction::click(tour_id(toggle)))
        .then(ScriptAction::pause_ms(450))
        .then(wait_for(next, 6000))
}

/// Find an address, file a violation from its workspace, then file another
/// from the dashboard quick action.
pub fn violation_entry() -> TourDefinition {
    let steps = vec![
        step(
            "address-search-input",
            card(
                "Find the property",
                "Use the global search to jump to the address that needs a notice. Type \u{201c}5008 Queensbury\u{201d} to find the Town Hall property used in this example.",
                Some("Tip: You can search by address, owner, or property name."),
            ),
        )
        .with_padding(10.0)
        .with_script(
            StepScript::new()
                .then(ScriptAction::Navigate {
                    route: DASHBOARD.into(),
                    skip_if_current: true,
                })
                .then(ScriptAction::pause_ms(250))
                .then(ScriptAction::type_into(tour_id("address-search-input"), DEMO_ADDRESS_SEARCH))
                .then(wait_for("address-search-results", 5000)),
        ),
        step(
            "address-search-results",
            card(
                "Open the address workspace",
                "Pick the \u{201c}Town Hall \u{2013} 5008 Queensbury Road\u{201d} result from the dropdown. The address page opens with tabs for contacts, inspections, and more.",
                None,
            ),
        )
        .with_script(
            StepScript::new()
                .then(ScriptAction::pause_ms(400))
                .then(ScriptAction::ClickMatching {
                    selector: SEARCH_RESULT_ITEMS.into(),
                    text: DEMO_ADDRESS_SEARCH.into(),
                    timeout: Duration::from_millis(5000),
                })
                .then(ScriptAction::pause_ms(650))
                .then(wait_for("address-violations-tab", 6000)),
        ),
        step(
            "address-violations-tab",
            card(
                "Navigate to Violations",
                "Inside the address workspace, open the Violations card to launch the detailed modal for this property.",
                None,
            ),
        )
        .with_placement(Placement::Right)
        .with_script(open_then_wait("address-violations-tab", 350, "address-new-violation-button")),
        step(
            "address-new-violation-button",
            card(
                "Start a new notice",
                "Use the New Violation button to reveal the form. Keep the modal open while you work through the fields.",
                None,
            ),
        )
        .with_placement(Placement::Right)
        .with_script(open_then_wait("address-new-violation-button", 300, "address-violation-type")),
        step(
            "address-violation-type",
            card(
                "Choose the notice type",
                "Select the template that matches how you are delivering the violation (Doorhanger or Formal Notice).",
                None,
            ),
        )
        .with_padding(8.0)
        .with_script(StepScript::new().then(set_value("address-violation-type", "Formal Notice"))),
        step(
            "address-violation-codes",
            card(
                "Add violation codes",
                "Search and add one or more codes. These drive the language on the notice and the follow-up schedule.",
                None,
            ),
        )
        .with_placement(Placement::Right),
        step(
            "address-violation-deadline",
            card(
                "Set the compliance deadline",
                "Pick the deadline that inspectors should enforce. Adjusting this updates reminders and reporting.",
                None,
            ),
        )
        .with_padding(8.0)
        .with_script(StepScript::new().then(set_value("address-violation-deadline", "7 days"))),
        step(
            "address-violation-attachments",
            card(
                "Attach documentation",
                "Drop photos or PDFs that support the violation. These stay with the record for future inspections.",
                None,
            ),
        )
        .with_placement(Placement::Top)
        .with_padding(8.0),
        step(
            "address-violation-submit",
            card(
                "Submit the violation",
                "When all required fields are complete, submit to log the violation on this property.",
                None,
            ),
        )
        .with_placement(Placement::Top),
        step(
            "nav-dashboard",
            card(
                "Return to the dashboard",
                "You can also add violations without opening an address first. Navigate back to the Dashboard to see the quick action panel.",
                None,
            ),
        )
        .with_placement(Placement::Right)
        .with_padding(8.0)
        .with_script(
            StepScript::new()
                .then(ScriptAction::navigate(DASHBOARD))
                .then(ScriptAction::pause_ms(700)),
        ),
        step(
            "home-quick-actions-toggle",
            card(
                "Open quick actions",
                "Use the quick actions toggle to reveal shortcuts for common forms, including the violation form.",
                None,
            ),
        )
        .with_placement(Placement::Left)
        .with_padding(8.0)
        .with_script(
            StepScript::new()
                .then(ScriptAction::click(tour_id("home-quick-actions-toggle")))
                .then(ScriptAction::pause_ms(450))
                .then(wait_for("home-new-violation-quick-action", 6000)),
        ),
        step(
            "home-new-violation-quick-action",
            card(
                "Launch the quick violation form",
                "The dashboard shortcut opens the same form without leaving your current context. It is ideal for back-to-back notices.",
                None,
            ),
        )
        .with_script(
            StepScript::new()
                .then(ScriptAction::click(tour_id("home-new-violation-quick-action")))
                .then(ScriptAction::pause_ms(500))
                .then(wait_for("new-violation-form", 6000)),
        ),
        step(
            "new-violation-address",
            card(
                "Select the address",
                "Search for the property again from the quick form. The system keeps the violation linked to the correct address.",
                None,
            ),
        )
        .with_padding(8.0)
        .with_script(
            StepScript::new()
                .then(ScriptAction::pause_ms(250))
                .then(ScriptAction::type_into(QUICK_ADDRESS_INPUT, DEMO_ADDRESS_ID))
                .then(ScriptAction::pause_ms(450)),
        ),
        step(
            "new-violation-type",
            card(
                "Set the notice type",
                "Pick the same notice type options here. The quick form mirrors the fields from the address modal.",
                None,
            ),
        )
        .with_padding(8.0)
        .with_script(StepScript::new().then(set_value("new-violation-type", "Formal Notice"))),
        step(
            "new-violation-codes",
            card(
                "Add the violation codes",
                "Search or paste code numbers. You can attach multiple codes at once from the quick form as well.",
                None,
            ),
        )
        .with_placement(Placement::Right),
        step(
            "new-violation-deadline",
            card(
                "Confirm the deadline",
                "Match the compliance deadline to the notice type. Adjust it if the situation requires a shorter window.",
                None,
            ),
        )
        .with_padding(8.0)
        .with_script(StepScript::new().then(set_value("new-violation-deadline", "7 days"))),
        step(
            "new-violation-attachments",
            card(
                "Attach supporting files",
                "Upload photos or other documents directly from the dashboard if you already have them.",
                None,
            ),
        )
        .with_placement(Placement::Top)
        .with_padding(8.0),
        step(
            "new-violation-submit",
            card(
                "Submit from anywhere",
                "Save the violation to route it to inspectors. The quick form and address modal both create the same record.",
                Some("All done! You can rerun this tour anytime from the Help page."),
            ),
        )
        .with_placement(Placement::Top),
    ];

    TourDefinition::new("violation-entry", "Entering a violation notice", steps)
        .with_description(
            "Walk through finding an address, recording the violation within the property workspace, and using the dashboard quick action.",
        )
        .with_estimated_time("\u{2248}3 minutes")
        .with_launch_tour_id("help-tour-violation-entry")
        .with_prepare(
            StepScript::new()
                .then(ScriptAction::navigate(DASHBOARD))
                .then(ScriptAction::pause_ms(450))
                .then(ScriptAction::ScrollToTop),
        )
}

/// The address overview: search, then each section card of the workspace.
pub fn address_overview() -> TourDefinition {
    let last_step_content = StepContent::render(|ctx| {
        let mut body = Element::new("div")
            .class("tour-content")
            .child(Node::paragraph(
                "Draft your note, mention teammates with @Name, and add files before posting. Comments instantly notify anyone you mention.",
            ));
        if ctx.is_last() {
            body = body.child(
                Element::new("p")
                    .class("tour-footnote")
                    .child(Node::text("Give it a try when you're ready!")),
            );
        }
        Node::from(body)
    });

    let steps = vec![
        TourStep::new(
            tour_id("global-address-search"),
            "Use the global search to find any property. We'll search for 5008 Queensbury so you can follow along.",
        )
        .with_id("search-address")
        .with_title("Find an address")
        .with_script(
            StepScript::new()
                .then(ScriptAction::pause_ms(250))
                .then(ScriptAction::type_into(tour_id("global-address-search"), DEMO_ADDRESS_SEARCH)),
        ),
        TourStep::new(
            tour_id("address-search-result-0"),
            "The best match appears at the top of the list. Select it to jump to the address overview.",
        )
        .with_id("search-results")
        .with_title("Pick the matching record"),
        TourStep::new(
            tour_id("address-tab-violations"),
            "Every section card opens a modal with richer detail. Start with Violations to see enforcement history and add new cases.",
        )
        .with_id("violations-card")
        .with_title("Review violations")
        .with_placement(Placement::Top)
        .with_script(
            StepScript::new()
                .then(ScriptAction::Navigate {
                    route: address_route(),
                    skip_if_current: true,
                })
                .then(wait_for("address-tab-violations", 5000)),
        ),
        TourStep::new(
            tour_id("address-tab-inspections"),
            "Use Inspections to review upcoming visits or schedule a new one directly from this address record.",
        )
        .with_id("inspections-card")
        .with_title("Inspect scheduled work")
        .with_placement(Placement::Top),
        TourStep::new(
            tour_id("address-tab-comments"),
            "The Comments card opens the running timeline of internal notes, attachments, and mentions for this address.",
        )
        .with_id("comments-card")
        .with_title("Open the comments feed")
        .with_placement(Placement::Top),
        TourStep::new(tour_id("address-comment-form"), last_step_content)
            .with_id("add-comment")
            .with_title("Leave a comment")
            .with_placement(Placement::Left),
    ];

    TourDefinition::new("address-overview", "Tour the address overview", steps)
        .with_description("Search for a property and walk the section cards of its address workspace.")
        .with_estimated_time("\u{2248}1 minute")
        .with_launch_tour_id("help-tour-address-overview")
        .with_prepare(StepScript::new().then(ScriptAction::Navigate {
            route: DASHBOARD.into(),
            skip_if_current: true,
        }))
}
