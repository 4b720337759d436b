#![forbid(unsafe_code)]

//! [`Host`] over the browser DOM.
//!
//! Elements are interned into [`ElementId`] handles on first sight; handles
//! of elements that left the document are dropped as the tour moves. Every
//! timer and listener closure is kept alive in a table keyed by its handle
//! and dropped when the registration is cleared, so nothing outlives the
//! engine's own bookkeeping.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use ftour_core::event::{HostEvent, KeyEvent, KeyEventKind, Modifiers};
use ftour_core::geometry::{Rect, Size};
use ftour_core::host::{ElementId, Host, HostError, ListenerId, ListenerKind, PortalId, TimerId};
use ftour_overlay::action::ACTION_ATTR;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, EventInit, HtmlElement, HtmlInputElement, HtmlSelectElement,
    HtmlTextAreaElement, KeyboardEvent, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition, Window,
};
use web_time::Instant;

use crate::handles::HandleTable;
use crate::queue::HostEventQueue;

const STYLE_ID: &str = "ftour-styles";

fn dom_err(err: JsValue) -> HostError {
    HostError::Dom(format!("{err:?}"))
}

fn is_attached(element: &Element) -> bool {
    element.is_connected()
}

struct Timer {
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

struct Listener {
    event: &'static str,
    capture: bool,
    callback: Closure<dyn FnMut(Event)>,
}

struct Portal {
    element: Element,
    on_click: Closure<dyn FnMut(Event)>,
}

/// The live document as a [`Host`].
pub struct DomHost {
    window: Window,
    document: Document,
    queue: HostEventQueue,
    started: Instant,
    elements: RefCell<HandleTable<Element>>,
    timers: HashMap<TimerId, Timer>,
    listeners: HashMap<ListenerId, Listener>,
    portals: HashMap<PortalId, Portal>,
    next_id: u64,
}

impl std::fmt::Debug for DomHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomHost")
            .field("elements", &self.elements.borrow().len())
            .field("timers", &self.timers.len())
            .field("listeners", &self.listeners.len())
            .field("portals", &self.portals.len())
            .finish_non_exhaustive()
    }
}

impl DomHost {
    /// Bind to the global window. Fails outside a browser main thread.
    pub fn new(queue: HostEventQueue) -> Result<Self, HostError> {
        let window = web_sys::window().ok_or(HostError::Unsupported("window"))?;
        let document = window.document().ok_or(HostError::Unsupported("document"))?;
        Ok(Self {
            window,
            document,
            queue,
            started: Instant::now(),
            elements: RefCell::default(),
            timers: HashMap::new(),
            listeners: HashMap::new(),
            portals: HashMap::new(),
            next_id: 1,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// The mounted element behind `id`. Clones the JS handle.
    fn element(&self, id: ElementId) -> Result<Element, HostError> {
        self.elements
            .borrow()
            .get(id.get())
            .filter(|el| is_attached(el))
            .cloned()
            .ok_or(HostError::Detached(id))
    }

    /// Forget handles whose elements have left the document.
    pub fn prune_detached(&mut self) -> usize {
        self.elements.get_mut().prune(is_attached)
    }

    /// Add the overlay stylesheet to `<head>` unless already present.
    pub fn install_stylesheet(&self, css: &str) -> Result<(), HostError> {
        if self.document.get_element_by_id(STYLE_ID).is_some() {
            return Ok(());
        }
        let style = self.document.create_element("style").map_err(dom_err)?;
        style.set_id(STYLE_ID);
        style.set_text_content(Some(css));
        let head = self.document.head().ok_or(HostError::Unsupported("head"))?;
        head.append_child(&style).map_err(dom_err)?;
        Ok(())
    }

    /// Replace the portal contents and set its accent color.
    pub fn paint_portal(&self, portal: PortalId, html: &str, accent: &str) {
        let Some(portal) = self.portals.get(&portal) else {
            return;
        };
        portal.element.set_inner_html(html);
        if let Some(el) = portal.element.dyn_ref::<HtmlElement>() {
            let _ = el.style().set_property("--ftour-accent", accent);
        }
    }

    fn dispatch(&self, element: &Element, name: &str) -> Result<(), HostError> {
        let init = EventInit::new();
        init.set_bubbles(true);
        let event = Event::new_with_event_init_dict(name, &init).map_err(dom_err)?;
        element.dispatch_event(&event).map_err(dom_err)?;
        Ok(())
    }
}

fn key_event(event: &KeyboardEvent) -> KeyEvent {
    let mut modifiers = Modifiers::NONE;
    if event.shift_key() {
        modifiers |= Modifiers::SHIFT;
    }
    if event.alt_key() {
        modifiers |= Modifiers::ALT;
    }
    if event.ctrl_key() {
        modifiers |= Modifiers::CTRL;
    }
    if event.meta_key() {
        modifiers |= Modifiers::META;
    }
    let kind = if event.repeat() {
        KeyEventKind::Repeat
    } else {
        KeyEventKind::Press
    };
    KeyEvent::from_dom_key(&event.key())
        .with_modifiers(modifiers)
        .with_kind(kind)
}

impl Host for DomHost {
    fn query_selector(&self, selector: &str) -> Option<ElementId> {
        let found = self.document.query_selector(selector).ok().flatten()?;
        Some(ElementId(self.elements.borrow_mut().intern(found, is_attached)))
    }

    fn query_selector_all(&self, selector: &str) -> Vec<ElementId> {
        let Ok(list) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };
        let mut table = self.elements.borrow_mut();
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|el| ElementId(table.intern(el, is_attached)))
            .collect()
    }

    fn bounding_client_rect(&self, element: ElementId) -> Option<Rect> {
        let rect = self.element(element).ok()?.get_bounding_client_rect();
        Some(Rect::new(rect.left(), rect.top(), rect.width(), rect.height()))
    }

    fn text_content(&self, element: ElementId) -> Option<String> {
        self.element(element).ok()?.text_content()
    }

    fn viewport(&self) -> Size {
        let width = self.window.inner_width().ok().and_then(|v| v.as_f64());
        let height = self.window.inner_height().ok().and_then(|v| v.as_f64());
        Size::new(width.unwrap_or(0.0), height.unwrap_or(0.0))
    }

    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    fn set_interval(&mut self, period: Duration) -> TimerId {
        let id = TimerId(self.next_id());
        let queue = self.queue.clone();
        let callback = Closure::<dyn FnMut()>::new(move || queue.push(HostEvent::Timer(id)));
        let ms = i32::try_from(period.as_millis()).unwrap_or(i32::MAX);
        match self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(callback.as_ref().unchecked_ref(), ms)
        {
            Ok(handle) => {
                self.timers.insert(
                    id,
                    Timer {
                        handle,
                        _callback: callback,
                    },
                );
            }
            Err(err) => tracing::warn!(error = ?err, "setInterval failed"),
        }
        id
    }

    fn clear_interval(&mut self, timer: TimerId) {
        if let Some(timer) = self.timers.remove(&timer) {
            self.window.clear_interval_with_handle(timer.handle);
        }
    }

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId {
        let id = ListenerId(self.next_id());
        let queue = self.queue.clone();
        let (event, capture, callback): (&'static str, bool, Closure<dyn FnMut(Event)>) = match kind {
            ListenerKind::Resize => {
                let window = self.window.clone();
                let callback = Closure::new(move |_: Event| {
                    let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
                    let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
                    queue.push(HostEvent::Resize { width, height });
                });
                ("resize", false, callback)
            }
            ListenerKind::Scroll { capture } => {
                let callback = Closure::new(move |_: Event| queue.push(HostEvent::Scroll));
                ("scroll", capture, callback)
            }
            ListenerKind::KeyDown => {
                let callback = Closure::new(move |event: Event| {
                    if let Some(key) = event.dyn_ref::<KeyboardEvent>() {
                        let key = key_event(key);
                        // The listener only exists while a tour is open.
                        if key.is_tour_navigation() {
                            event.prevent_default();
                        }
                        queue.push(HostEvent::Key(key));
                    }
                });
                ("keydown", false, callback)
            }
        };
        if let Err(err) = self.window.add_event_listener_with_callback_and_bool(
            event,
            callback.as_ref().unchecked_ref(),
            capture,
        ) {
            tracing::warn!(error = ?err, event, "addEventListener failed");
        }
        self.listeners.insert(
            id,
            Listener {
                event,
                capture,
                callback,
            },
        );
        id
    }

    fn remove_listener(&mut self, listener: ListenerId) {
        if let Some(listener) = self.listeners.remove(&listener) {
            let _ = self.window.remove_event_listener_with_callback_and_bool(
                listener.event,
                listener.callback.as_ref().unchecked_ref(),
                listener.capture,
            );
        }
    }

    fn body_overflow(&self) -> Option<String> {
        let body = self.document.body()?;
        let value = body.style().get_property_value("overflow").ok()?;
        (!value.is_empty()).then_some(value)
    }

    fn set_body_overflow(&mut self, value: Option<&str>) {
        let Some(body) = self.document.body() else {
            return;
        };
        let style = body.style();
        let result = match value {
            Some(value) => style.set_property("overflow", value),
            None => style.remove_property("overflow").map(|_| ()),
        };
        if let Err(err) = result {
            tracing::warn!(error = ?err, "failed to set body overflow");
        }
    }

    fn mount_portal(&mut self) -> Result<PortalId, HostError> {
        let body = self.document.body().ok_or(HostError::Unsupported("body"))?;
        let element = self.document.create_element("div").map_err(dom_err)?;
        element.set_attribute("data-ftour-portal", "").map_err(dom_err)?;

        let queue = self.queue.clone();
        let selector = format!("[{ACTION_ATTR}]");
        let on_click = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            let Ok(Some(control)) = target.closest(&selector) else {
                return;
            };
            if control.has_attribute("disabled") {
                return;
            }
            if let Some(action) = control.get_attribute(ACTION_ATTR) {
                event.stop_propagation();
                queue.push(HostEvent::OverlayAction(action));
            }
        });
        element
            .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
            .map_err(dom_err)?;
        body.append_child(&element).map_err(dom_err)?;

        let id = PortalId(self.next_id());
        self.portals.insert(id, Portal { element, on_click });
        Ok(id)
    }

    fn unmount_portal(&mut self, portal: PortalId) {
        if let Some(portal) = self.portals.remove(&portal) {
            let _ = portal
                .element
                .remove_event_listener_with_callback("click", portal.on_click.as_ref().unchecked_ref());
            portal.element.remove();
        }
    }

    fn current_route(&self) -> Option<String> {
        self.window.location().pathname().ok()
    }

    fn navigate(&mut self, route: &str) -> Result<(), HostError> {
        let history = self.window.history().map_err(dom_err)?;
        history
            .push_state_with_url(&JsValue::NULL, "", Some(route))
            .map_err(dom_err)?;
        // Client-side routers listen for popstate.
        let event = Event::new("popstate").map_err(dom_err)?;
        self.window.dispatch_event(&event).map_err(dom_err)?;
        Ok(())
    }

    fn focus(&mut self, element: ElementId) -> Result<(), HostError> {
        let el = self.element(element)?;
        let el = el.dyn_ref::<HtmlElement>().ok_or(HostError::NotApplicable {
            element,
            operation: "focus",
        })?;
        el.focus().map_err(dom_err)
    }

    fn set_value(&mut self, element: ElementId, value: &str) -> Result<(), HostError> {
        let el = self.element(element)?;
        if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
            area.set_value(value);
        } else if let Some(select) = el.dyn_ref::<HtmlSelectElement>() {
            select.set_value(value);
        } else {
            return Err(HostError::NotApplicable {
                element,
                operation: "set_value",
            });
        }
        self.dispatch(&el, "input")?;
        self.dispatch(&el, "change")
    }

    fn value(&self, element: ElementId) -> Option<String> {
        let el = self.element(element).ok()?;
        if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            Some(input.value())
        } else if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
            Some(area.value())
        } else {
            el.dyn_ref::<HtmlSelectElement>().map(HtmlSelectElement::value)
        }
    }

    fn click(&mut self, element: ElementId) -> Result<(), HostError> {
        let el = self.element(element)?;
        match el.dyn_ref::<HtmlElement>() {
            Some(el) => {
                el.click();
                Ok(())
            }
            None => self.dispatch(&el, "click"),
        }
    }

    fn scroll_into_view(&mut self, element: ElementId) -> Result<(), HostError> {
        let el = self.element(element)?;
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Center);
        el.scroll_into_view_with_scroll_into_view_options(&options);
        Ok(())
    }

    fn scroll_to_top(&mut self) -> Result<(), HostError> {
        self.window.scroll_to_with_x_and_y(0.0, 0.0);
        Ok(())
    }
}
