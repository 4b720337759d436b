#![forbid(unsafe_code)]

//! In-memory [`Host`] for tests and headless runs.
//!
//! Elements are registered against exact selector strings (no CSS engine);
//! an element can answer to several selectors. Elements may be bound to a
//! route, in which case they are only mounted while that route is current.
//! Time only moves when the caller advances the clock, and timer firings come
//! out one at a time through [`MemoryHost::poll_timer`] so that handlers can
//! clear or register timers between firings.
//!
//! Every registration is counted, which is what the teardown tests assert on.

use core::time::Duration;
use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};

use crate::event::{HostEvent, KeyEvent};
use crate::geometry::{Rect, Size};
use crate::host::{ElementId, Host, HostError, ListenerId, ListenerKind, PortalId, TimerId};

/// Side effect triggered by clicking an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickEffect {
    /// Navigate to a route.
    Navigate(String),
    /// Re-attach every element answering to the selector.
    Mount(String),
    /// Detach every element answering to the selector.
    Unmount(String),
}

#[derive(Debug, Clone)]
struct MemElement {
    selectors: Vec<String>,
    rect: Rect,
    text: String,
    value: Option<String>,
    route: Option<String>,
    attached: bool,
}

#[derive(Debug, Clone, Copy)]
struct TimerState {
    period: Duration,
    next_due: Duration,
}

/// Deterministic DOM stand-in.
#[derive(Debug)]
pub struct MemoryHost {
    viewport: Size,
    now: Duration,
    next_id: u64,
    elements: BTreeMap<ElementId, MemElement>,
    timers: BTreeMap<TimerId, TimerState>,
    listeners: BTreeMap<ListenerId, ListenerKind>,
    portals: Vec<PortalId>,
    overflow: Option<String>,
    overflow_writes: usize,
    route: Option<String>,
    click_effects: HashMap<String, Vec<ClickEffect>>,
    queries: Cell<usize>,
    registrations: usize,
    navigations: Vec<String>,
    clicks: Vec<ElementId>,
    focused: Option<ElementId>,
    scroll_requests: usize,
}

impl MemoryHost {
    /// Empty document with the given viewport.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            viewport: Size::new(width, height),
            now: Duration::ZERO,
            next_id: 1,
            elements: BTreeMap::new(),
            timers: BTreeMap::new(),
            listeners: BTreeMap::new(),
            portals: Vec::new(),
            overflow: None,
            overflow_writes: 0,
            route: None,
            click_effects: HashMap::new(),
            queries: Cell::new(0),
            registrations: 0,
            navigations: Vec::new(),
            clicks: Vec::new(),
            focused: None,
            scroll_requests: 0,
        }
    }

    fn alloc(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // ── Document ────────────────────────────────────────────────────────

    /// Add a mounted element on every route.
    pub fn insert(&mut self, selector: &str, rect: Rect) -> ElementId {
        self.insert_element(selector, rect, None)
    }

    /// Add an element that is only mounted while `route` is current.
    pub fn insert_on_route(&mut self, route: &str, selector: &str, rect: Rect) -> ElementId {
        self.insert_element(selector, rect, Some(route.to_owned()))
    }

    fn insert_element(&mut self, selector: &str, rect: Rect, route: Option<String>) -> ElementId {
        let id = ElementId(self.alloc());
        self.elements.insert(
            id,
            MemElement {
                selectors: vec![selector.trim().to_owned()],
                rect,
                text: String::new(),
                value: None,
                route,
                attached: true,
            },
        );
        id
    }

    /// Make an element answer to an additional selector.
    pub fn alias(&mut self, element: ElementId, selector: &str) {
        if let Some(el) = self.elements.get_mut(&element) {
            el.selectors.push(selector.trim().to_owned());
        }
    }

    /// Set text content.
    pub fn set_text(&mut self, element: ElementId, text: &str) {
        if let Some(el) = self.elements.get_mut(&element) {
            el.text = text.to_owned();
        }
    }

    /// Mark an element as a form control with an initial value.
    pub fn make_input(&mut self, element: ElementId, value: &str) {
        if let Some(el) = self.elements.get_mut(&element) {
            el.value = Some(value.to_owned());
        }
    }

    /// Move every element answering to `selector`.
    pub fn move_element(&mut self, selector: &str, rect: Rect) {
        for el in self.matching_mut(selector) {
            el.rect = rect;
        }
    }

    /// Detach every element answering to `selector`.
    pub fn remove(&mut self, selector: &str) {
        for el in self.matching_mut(selector) {
            el.attached = false;
        }
    }

    /// Re-attach every element answering to `selector`.
    pub fn restore(&mut self, selector: &str) {
        for el in self.matching_mut(selector) {
            el.attached = true;
        }
    }

    /// Register a side effect for clicks on elements answering to `selector`.
    pub fn on_click(&mut self, selector: &str, effect: ClickEffect) {
        self.click_effects
            .entry(selector.trim().to_owned())
            .or_default()
            .push(effect);
    }

    fn matching_mut<'a>(&'a mut self, selector: &'a str) -> impl Iterator<Item = &'a mut MemElement> {
        let selector = selector.trim();
        self.elements
            .values_mut()
            .filter(move |el| el.selectors.iter().any(|s| s == selector))
    }

    fn is_mounted(&self, el: &MemElement) -> bool {
        el.attached
            && match &el.route {
                None => true,
                Some(route) => self.route.as_deref() == Some(route.as_str()),
            }
    }

    fn mounted(&self, element: ElementId) -> Option<&MemElement> {
        self.elements.get(&element).filter(|el| self.is_mounted(el))
    }

    // ── Clock ───────────────────────────────────────────────────────────

    /// Fire the earliest timer due at or before `until`, moving the clock to
    /// its due time. When nothing is due, the clock moves to `until` and
    /// `None` is returned.
    pub fn poll_timer(&mut self, until: Duration) -> Option<HostEvent> {
        let due = self
            .timers
            .iter()
            .filter(|(_, timer)| timer.next_due <= until)
            .min_by_key(|(id, timer)| (timer.next_due, **id))
            .map(|(id, timer)| (*id, timer.next_due));

        match due {
            Some((id, at)) => {
                self.now = self.now.max(at);
                if let Some(timer) = self.timers.get_mut(&id) {
                    timer.next_due = at.saturating_add(timer.period);
                }
                Some(HostEvent::Timer(id))
            }
            None => {
                self.now = self.now.max(until);
                None
            }
        }
    }

    /// Advance by `dt`, collecting every timer firing in order.
    ///
    /// Handlers cannot influence the batch; use [`Self::poll_timer`] when they
    /// register or clear timers.
    pub fn advance(&mut self, dt: Duration) -> Vec<HostEvent> {
        let until = self.now.saturating_add(dt);
        let mut events = Vec::new();
        while let Some(event) = self.poll_timer(until) {
            events.push(event);
        }
        events
    }

    // ── Input ───────────────────────────────────────────────────────────

    /// Resize the viewport; returns the event a `resize` listener would see.
    pub fn resize(&mut self, width: f64, height: f64) -> Option<HostEvent> {
        self.viewport = Size::new(width, height);
        self.has_listener(ListenerKind::Resize)
            .then_some(HostEvent::Resize { width, height })
    }

    /// Scroll the page by `dy`, moving every element.
    pub fn scroll_by(&mut self, dy: f64) -> Option<HostEvent> {
        for el in self.elements.values_mut() {
            el.rect.top -= dy;
        }
        let listening = self
            .listeners
            .values()
            .any(|kind| matches!(kind, ListenerKind::Scroll { .. }));
        listening.then_some(HostEvent::Scroll)
    }

    /// Press a key; `None` unless a key-down listener is registered.
    pub fn key(&mut self, key: KeyEvent) -> Option<HostEvent> {
        self.has_listener(ListenerKind::KeyDown)
            .then_some(HostEvent::Key(key))
    }

    // ── Observation ─────────────────────────────────────────────────────

    /// Live interval timers.
    pub fn active_timers(&self) -> usize {
        self.timers.len()
    }

    /// Live listeners.
    pub fn active_listeners(&self) -> usize {
        self.listeners.len()
    }

    /// Whether a listener of `kind` is registered.
    pub fn has_listener(&self, kind: ListenerKind) -> bool {
        self.listeners.values().any(|k| *k == kind)
    }

    /// Mounted portal containers.
    pub fn mounted_portals(&self) -> usize {
        self.portals.len()
    }

    /// Number of `set_body_overflow` calls so far.
    pub fn overflow_writes(&self) -> usize {
        self.overflow_writes
    }

    /// Selector queries served so far.
    pub fn query_count(&self) -> usize {
        self.queries.get()
    }

    /// Timers and listeners ever registered.
    pub fn total_registrations(&self) -> usize {
        self.registrations
    }

    /// Routes navigated to, in order.
    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    /// Elements clicked, in order.
    pub fn clicks(&self) -> &[ElementId] {
        &self.clicks
    }

    /// Currently focused element.
    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    /// `scroll_into_view` / `scroll_to_top` calls so far.
    pub fn scroll_requests(&self) -> usize {
        self.scroll_requests
    }

    /// Set the current route without recording a navigation.
    pub fn set_route(&mut self, route: &str) {
        self.route = Some(route.to_owned());
    }
}

impl Host for MemoryHost {
    fn query_selector(&self, selector: &str) -> Option<ElementId> {
        self.query_selector_all(selector).into_iter().next()
    }

    fn query_selector_all(&self, selector: &str) -> Vec<ElementId> {
        self.queries.set(self.queries.get() + 1);
        let selector = selector.trim();
        self.elements
            .iter()
            .filter(|(_, el)| self.is_mounted(el) && el.selectors.iter().any(|s| s == selector))
            .map(|(id, _)| *id)
            .collect()
    }

    fn bounding_client_rect(&self, element: ElementId) -> Option<Rect> {
        self.mounted(element).map(|el| el.rect)
    }

    fn text_content(&self, element: ElementId) -> Option<String> {
        self.mounted(element).map(|el| el.text.clone())
    }

    fn viewport(&self) -> Size {
        self.viewport
    }

    fn now(&self) -> Duration {
        self.now
    }

    fn set_interval(&mut self, period: Duration) -> TimerId {
        let id = TimerId(self.alloc());
        let period = period.max(Duration::from_millis(1));
        self.timers.insert(
            id,
            TimerState {
                period,
                next_due: self.now.saturating_add(period),
            },
        );
        self.registrations += 1;
        id
    }

    fn clear_interval(&mut self, timer: TimerId) {
        self.timers.remove(&timer);
    }

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId {
        let id = ListenerId(self.alloc());
        self.listeners.insert(id, kind);
        self.registrations += 1;
        id
    }

    fn remove_listener(&mut self, listener: ListenerId) {
        self.listeners.remove(&listener);
    }

    fn body_overflow(&self) -> Option<String> {
        self.overflow.clone()
    }

    fn set_body_overflow(&mut self, value: Option<&str>) {
        self.overflow_writes += 1;
        self.overflow = value.map(str::to_owned);
    }

    fn mount_portal(&mut self) -> Result<PortalId, HostError> {
        let id = PortalId(self.alloc());
        self.portals.push(id);
        Ok(id)
    }

    fn unmount_portal(&mut self, portal: PortalId) {
        self.portals.retain(|p| *p != portal);
    }

    fn current_route(&self) -> Option<String> {
        self.route.clone()
    }

    fn navigate(&mut self, route: &str) -> Result<(), HostError> {
        self.route = Some(route.to_owned());
        self.navigations.push(route.to_owned());
        Ok(())
    }

    fn focus(&mut self, element: ElementId) -> Result<(), HostError> {
        self.mounted(element).ok_or(HostError::Detached(element))?;
        self.focused = Some(element);
        Ok(())
    }

    fn set_value(&mut self, element: ElementId, value: &str) -> Result<(), HostError> {
        let mounted = self.mounted(element).is_some();
        let el = self
            .elements
            .get_mut(&element)
            .filter(|_| mounted)
            .ok_or(HostError::Detached(element))?;
        match el.value.as_mut() {
            Some(current) => {
                *current = value.to_owned();
                Ok(())
            }
            None => Err(HostError::NotApplicable {
                element,
                operation: "set_value",
            }),
        }
    }

    fn value(&self, element: ElementId) -> Option<String> {
        self.mounted(element).and_then(|el| el.value.clone())
    }

    fn click(&mut self, element: ElementId) -> Result<(), HostError> {
        let selectors = self
            .mounted(element)
            .map(|el| el.selectors.clone())
            .ok_or(HostError::Detached(element))?;
        self.clicks.push(element);

        let effects: Vec<ClickEffect> = selectors
            .iter()
            .filter_map(|s| self.click_effects.get(s))
            .flatten()
            .cloned()
            .collect();
        for effect in effects {
            match effect {
                ClickEffect::Navigate(route) => self.navigate(&route)?,
                ClickEffect::Mount(selector) => self.restore(&selector),
                ClickEffect::Unmount(selector) => self.remove(&selector),
            }
        }
        Ok(())
    }

    fn scroll_into_view(&mut self, element: ElementId) -> Result<(), HostError> {
        self.mounted(element).ok_or(HostError::Detached(element))?;
        self.scroll_requests += 1;
        Ok(())
    }

    fn scroll_to_top(&mut self) -> Result<(), HostError> {
        self.scroll_requests += 1;
        Ok(())
    }
}
