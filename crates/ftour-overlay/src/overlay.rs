#![forbid(unsafe_code)]

//! Overlay rendering.
//!
//! [`OverlayRenderer::render`] turns the current step and tracked rect into a
//! markup tree: a full-viewport backdrop, a highlight box cut out around the
//! target (or a centred placeholder when the target is missing), and a
//! positioned tooltip with progress, body and navigation controls.

use ftour_core::config::TourConfig;
use ftour_core::geometry::Rect;

use crate::action::OverlayAction;
use crate::markup::{Element, Node};
use crate::placement::{TooltipPosition, compute_tooltip_position};
use crate::step::{StepContext, TourStep};

/// Above everything a page can reasonably stack.
pub const OVERLAY_Z_INDEX: &str = "2147483647";

const MASK_SHADOW: &str = "0 0 0 9999px rgba(15, 23, 42, 0.6)";

/// Everything needed to render one frame of the overlay.
#[derive(Debug, Clone, Copy)]
pub struct OverlayState<'a> {
    pub step: &'a TourStep,
    pub step_index: usize,
    pub step_count: usize,
    /// Padded target rect; `None` when the target is not mounted.
    pub rect: Option<Rect>,
    pub config: &'a TourConfig,
}

/// A rendered frame.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayView {
    pub root: Node,
    pub tooltip: TooltipPosition,
    /// Highlight geometry, absent when the placeholder is shown.
    pub highlight: Option<Rect>,
}

impl OverlayView {
    /// Whether the centred placeholder stands in for a missing target.
    pub fn is_placeholder(&self) -> bool {
        self.highlight.is_none()
    }
}

/// Stateless overlay renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlayRenderer;

impl OverlayRenderer {
    pub fn render(&self, state: &OverlayState<'_>) -> OverlayView {
        let step = state.step;
        let offset = step.offset.unwrap_or(state.config.default_offset);
        let tooltip = compute_tooltip_position(state.rect, step.placement, offset);

        let mut backdrop = Element::new("div")
            .class("tour-backdrop")
            .attr("aria-hidden", "true");
        if !state.config.disable_close_on_click_outside {
            backdrop = backdrop.action(OverlayAction::Close);
        }

        let spotlight = match state.rect {
            Some(rect) => highlight(rect, state.config),
            None => placeholder(),
        };

        let root = Element::new("div")
            .class("tour-overlay")
            .attr("role", "dialog")
            .attr("aria-modal", "true")
            .attr("aria-label", "Application walkthrough")
            .style("position", "fixed")
            .style("inset", "0")
            .style("z-index", OVERLAY_Z_INDEX)
            .child(backdrop)
            .child(spotlight)
            .child(tooltip_panel(state, &tooltip))
            .into();

        OverlayView {
            root,
            tooltip,
            highlight: state.rect,
        }
    }
}

fn highlight(rect: Rect, config: &TourConfig) -> Element {
    Element::new("div")
        .class("tour-highlight")
        .attr("aria-hidden", "true")
        .style("position", "fixed")
        .style("left", format!("{}px", rect.left))
        .style("top", format!("{}px", rect.top))
        .style("width", format!("{}px", rect.width))
        .style("height", format!("{}px", rect.height))
        .style("border", format!("2px solid {}", config.accent_color))
        .style("border-radius", format!("{}px", config.rounded))
        .style("box-shadow", MASK_SHADOW)
        .style("pointer-events", "none")
}

fn placeholder() -> Element {
    Element::new("div")
        .class("tour-placeholder")
        .attr("aria-hidden", "true")
        .style("position", "fixed")
        .style("left", "50%")
        .style("top", "50%")
        .style("transform", "translate(-50%, -50%)")
        .style("pointer-events", "none")
}

fn tooltip_panel(state: &OverlayState<'_>, pos: &TooltipPosition) -> Element {
    let step = state.step;
    let ctx = StepContext {
        step_index: state.step_index,
        total: state.step_count,
        in_dom: state.rect.is_some(),
        title: step.title.as_deref(),
    };

    let header = Element::new("div")
        .class("tour-header")
        .child(
            Element::new("span")
                .class("tour-progress")
                .child(Node::text(format!(
                    "Step {} of {}",
                    state.step_index + 1,
                    state.step_count
                ))),
        )
        .child(
            Element::new("button")
                .class("tour-close")
                .attr("type", "button")
                .attr("aria-label", "Close tour")
                .action(OverlayAction::Close)
                .child(Node::text("\u{00d7}")),
        );

    let mut panel = Element::new("div")
        .class("tour-tooltip")
        .attr("data-placement", pos.placement.as_str())
        .style("position", "fixed")
        .style("left", pos.left.to_string())
        .style("top", pos.top.to_string())
        .style("transform", pos.transform.to_string())
        .child(header);
    if let Some(title) = ctx.title {
        panel = panel.child(
            Element::new("h3")
                .class("tour-title")
                .child(Node::text(title)),
        );
    }
    panel
        .child(
            Element::new("div")
                .class("tour-body")
                .child(step.content.build(&ctx)),
        )
        .child(footer(&ctx))
}

fn footer(ctx: &StepContext<'_>) -> Element {
    let dots = (0..ctx.total).map(|index| {
        let mut dot = Element::new("button")
            .class("tour-dot")
            .attr("type", "button")
            .attr("aria-label", format!("Go to step {}", index + 1))
            .action(OverlayAction::GoTo(index));
        if index == ctx.step_index {
            dot = dot.class("is-active").attr("aria-current", "step");
        }
        Node::from(dot)
    });

    let mut back = Element::new("button")
        .class("tour-nav tour-back")
        .attr("type", "button")
        .child(Node::text("Back"));
    back = if ctx.is_first() {
        back.attr("disabled", "")
    } else {
        back.action(OverlayAction::Prev)
    };

    let next = Element::new("button")
        .class("tour-nav tour-nav-primary")
        .attr("type", "button")
        .action(OverlayAction::Next)
        .child(Node::text(if ctx.is_last() { "Finish" } else { "Next" }));

    Element::new("div")
        .class("tour-footer")
        .child(Element::new("div").class("tour-dots").children(dots))
        .child(
            Element::new("div")
                .class("tour-actions")
                .child(
                    Element::new("button")
                        .class("tour-skip")
                        .attr("type", "button")
                        .action(OverlayAction::Close)
                        .child(Node::text("Skip tour")),
                )
                .child(back)
                .child(next),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Placement;

    fn render(step: &TourStep, index: usize, count: usize, rect: Option<Rect>) -> OverlayView {
        render_with(step, index, count, rect, &TourConfig::default())
    }

    fn render_with(
        step: &TourStep,
        index: usize,
        count: usize,
        rect: Option<Rect>,
        config: &TourConfig,
    ) -> OverlayView {
        OverlayRenderer.render(&OverlayState {
            step,
            step_index: index,
            step_count: count,
            rect,
            config,
        })
    }

    fn button_with_class<'a>(view: &'a OverlayView, class: &str) -> &'a Element {
        view.root
            .find_class(class)
            .unwrap_or_else(|| panic!("no element with class {class}"))
    }

    #[test]
    fn highlight_follows_rect() {
        let step = TourStep::new("#a", "Body").with_placement(Placement::Right);
        let rect = Rect::new(38.0, 88.0, 224.0, 64.0);
        let view = render(&step, 0, 3, Some(rect));
        assert!(!view.is_placeholder());
        let hl = button_with_class(&view, "tour-highlight");
        assert_eq!(hl.get_style("left"), Some("38px"));
        assert_eq!(hl.get_style("width"), Some("224px"));
        assert_eq!(hl.get_style("border"), Some("2px solid #4f46e5"));
        assert!(view.root.find_class("tour-placeholder").is_none());
        let tip = button_with_class(&view, "tour-tooltip");
        assert_eq!(tip.get_attr("data-placement"), Some("right"));
    }

    #[test]
    fn missing_rect_shows_placeholder_and_centres_tooltip() {
        let step = TourStep::new("#missing", "Body").with_placement(Placement::Left);
        let view = render(&step, 0, 1, None);
        assert!(view.is_placeholder());
        assert!(view.root.find_class("tour-placeholder").is_some());
        assert!(view.root.find_class("tour-highlight").is_none());
        assert_eq!(view.tooltip, TooltipPosition::CENTERED);
        let tip = button_with_class(&view, "tour-tooltip");
        assert_eq!(tip.get_style("left"), Some("50%"));
        assert_eq!(tip.get_style("transform"), Some("translate(-50%, -50%)"));
    }

    #[test]
    fn first_step_back_is_disabled() {
        let step = TourStep::new("#a", "Body");
        let view = render(&step, 0, 3, None);
        let back = button_with_class(&view, "tour-back");
        assert!(back.is_disabled());
        assert_eq!(back.action_binding(), None);
        assert_eq!(
            button_with_class(&view, "tour-nav-primary").text_content(),
            "Next"
        );
    }

    #[test]
    fn last_step_says_finish() {
        let step = TourStep::new("#a", "Body");
        let view = render(&step, 2, 3, None);
        let back = button_with_class(&view, "tour-back");
        assert!(!back.is_disabled());
        assert_eq!(back.action_binding(), Some(OverlayAction::Prev));
        let next = button_with_class(&view, "tour-nav-primary");
        assert_eq!(next.text_content(), "Finish");
        assert_eq!(next.action_binding(), Some(OverlayAction::Next));
    }

    #[test]
    fn progress_text_and_dots() {
        let step = TourStep::new("#a", "Body").with_title("Start here");
        let view = render(&step, 1, 4, None);
        assert_eq!(
            button_with_class(&view, "tour-progress").text_content(),
            "Step 2 of 4"
        );
        assert_eq!(
            button_with_class(&view, "tour-title").text_content(),
            "Start here"
        );
        let dots = view.root.find_all(&|el| el.has_class("tour-dot"));
        assert_eq!(dots.len(), 4);
        assert_eq!(dots[3].action_binding(), Some(OverlayAction::GoTo(3)));
        assert!(dots[1].has_class("is-active"));
        assert!(!dots[0].has_class("is-active"));
    }

    #[test]
    fn exits_always_present() {
        let step = TourStep::new("#a", "Body");
        let view = render(&step, 0, 2, None);
        let closes = view
            .root
            .actions()
            .into_iter()
            .filter(|a| *a == OverlayAction::Close)
            .count();
        // backdrop, header ×, skip
        assert_eq!(closes, 3);
    }

    #[test]
    fn outside_click_can_be_disabled() {
        let step = TourStep::new("#a", "Body");
        let config = TourConfig::default().without_close_on_click_outside();
        let view = render_with(&step, 0, 2, None, &config);
        let backdrop = button_with_class(&view, "tour-backdrop");
        assert_eq!(backdrop.action_binding(), None);
        assert_eq!(
            button_with_class(&view, "tour-skip").action_binding(),
            Some(OverlayAction::Close)
        );
    }

    #[test]
    fn step_offset_overrides_default() {
        let step = TourStep::new("#a", "Body")
            .with_placement(Placement::Bottom)
            .with_offset(4.0);
        let rect = Rect::new(0.0, 0.0, 100.0, 20.0);
        let view = render(&step, 0, 1, Some(rect));
        assert_eq!(view.tooltip.top, crate::placement::Coord::Px(24.0));
    }

    #[test]
    fn render_fn_sees_in_dom_flag() {
        let step = TourStep::new(
            "#a",
            crate::step::StepContent::render(|ctx| {
                Node::text(if ctx.in_dom { "found" } else { "missing" })
            }),
        );
        let missing = render(&step, 0, 1, None);
        let found = render(&step, 0, 1, Some(Rect::new(0.0, 0.0, 1.0, 1.0)));
        assert_eq!(
            button_with_class(&missing, "tour-body").text_content(),
            "missing"
        );
        assert_eq!(
            button_with_class(&found, "tour-body").text_content(),
            "found"
        );
    }

    #[test]
    fn overlay_sits_on_top() {
        let step = TourStep::new("#a", "Body");
        let view = render(&step, 0, 1, None);
        let root = view.root.as_element().expect("root element");
        assert_eq!(root.get_style("z-index"), Some(OVERLAY_Z_INDEX));
        assert_eq!(root.get_attr("role"), Some("dialog"));
    }
}
