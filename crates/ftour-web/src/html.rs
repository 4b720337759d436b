#![forbid(unsafe_code)]

//! HTML serialization of overlay markup.
//!
//! The overlay is repainted by replacing the portal's `innerHTML` with
//! [`render`]. Text and attribute values are escaped; tags and attribute
//! names come from the renderer and are trusted. [`PaintCache`] skips the
//! replacement when the frame has not changed, so buttons under the pointer
//! and focused controls survive timer ticks.

use std::fmt::Write as _;

use ftour_core::host::PortalId;
use ftour_overlay::OverlayView;
use ftour_overlay::markup::{Element, Node};

/// Base styles injected once per document. Inline styles on the overlay carry
/// geometry; these carry appearance.
pub const STYLESHEET: &str = r#".tour-backdrop{position:absolute;inset:0;}
.tour-highlight{position:fixed;pointer-events:none;transition:all .2s ease;}
.tour-placeholder{position:fixed;left:50%;top:50%;width:0;height:0;box-shadow:0 0 0 9999px rgba(15,23,42,.6);}
.tour-tooltip{position:fixed;max-width:360px;min-width:260px;background:#fff;color:#0f172a;border-radius:12px;box-shadow:0 20px 45px rgba(15,23,42,.25);padding:16px 18px;font:14px/1.5 system-ui,sans-serif;}
.tour-header{display:flex;justify-content:space-between;align-items:center;margin-bottom:8px;}
.tour-progress{font-size:12px;color:#64748b;text-transform:uppercase;letter-spacing:.04em;}
.tour-close{border:0;background:none;font-size:18px;cursor:pointer;color:#64748b;}
.tour-title{margin:0 0 6px;font-size:16px;}
.tour-body p{margin:0 0 8px;}
.tour-footer{display:flex;justify-content:space-between;align-items:center;margin-top:12px;gap:8px;}
.tour-dots{display:flex;gap:4px;}
.tour-dot{width:8px;height:8px;border-radius:50%;border:0;padding:0;background:#cbd5e1;cursor:pointer;}
.tour-dot.is-active{background:var(--ftour-accent,#4f46e5);}
.tour-actions{display:flex;gap:6px;}
.tour-skip{border:0;background:none;color:#64748b;cursor:pointer;}
.tour-nav{border:1px solid #cbd5e1;background:#fff;border-radius:6px;padding:4px 10px;cursor:pointer;}
.tour-nav[disabled]{opacity:.4;cursor:default;}
.tour-nav-primary{background:var(--ftour-accent,#4f46e5);border-color:transparent;color:#fff;}
"#;

const VOID_TAGS: [&str; 4] = ["br", "hr", "img", "input"];

/// Serialize a node tree to an HTML string.
pub fn render(node: &Node) -> String {
    let mut out = String::with_capacity(1024);
    write_node(&mut out, node);
    out
}

/// The last frame painted into a portal.
#[derive(Debug, Default)]
pub struct PaintCache {
    last: Option<(PortalId, OverlayView)>,
}

impl PaintCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Markup for `view` if it differs from what `portal` already shows.
    pub fn update(&mut self, portal: PortalId, view: OverlayView) -> Option<String> {
        if let Some((painted, last)) = &self.last {
            if *painted == portal && *last == view {
                return None;
            }
        }
        let markup = render(&view.root);
        self.last = Some((portal, view));
        Some(markup)
    }

    /// Forget the painted frame; the next update always paints.
    pub fn clear(&mut self) {
        self.last = None;
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_none()
    }
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Text(text) => escape_into(out, text, false),
        Node::Element(el) => write_element(out, el),
    }
}

fn write_element(out: &mut String, el: &Element) {
    out.push('<');
    out.push_str(el.tag);
    if !el.classes.is_empty() {
        out.push_str(" class=\"");
        escape_into(out, &el.classes.join(" "), true);
        out.push('"');
    }
    for (name, value) in &el.attrs {
        let _ = write!(out, " {name}=\"");
        escape_into(out, value, true);
        out.push('"');
    }
    if !el.style.is_empty() {
        out.push_str(" style=\"");
        let css = el
            .style
            .iter()
            .map(|(prop, value)| format!("{prop}: {value}"))
            .collect::<Vec<_>>()
            .join("; ");
        escape_into(out, &css, true);
        out.push('"');
    }
    out.push('>');
    if VOID_TAGS.contains(&el.tag) {
        return;
    }
    for child in &el.children {
        write_node(out, child);
    }
    let _ = write!(out, "</{}>", el.tag);
}

fn escape_into(out: &mut String, text: &str, attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\'' if attribute => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}
