#![forbid(unsafe_code)]

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use ftour::{
    LaunchStatus, TOUR_ADVANCE_EVENT, TourCatalog, TourEvent, TourProvider, dispatch_tour_advance,
};
use ftour_core::config::TourConfig;
use ftour_core::event::HostEvent;
use ftour_core::host::Host;
use ftour_overlay::OverlayAction;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CustomEvent, Event};

use crate::dom::DomHost;
use crate::html::{self, PaintCache};
use crate::queue::HostEventQueue;

fn js_err(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

struct Engine {
    host: DomHost,
    provider: TourProvider,
    catalog: TourCatalog,
    queue: HostEventQueue,
    painted: PaintCache,
    /// The tour moved since handles were last pruned.
    moved: bool,
}

impl Engine {
    fn record(&mut self, events: Vec<TourEvent>) {
        if !events.is_empty() {
            tracing::debug!(?events, "tour events");
            self.moved = true;
        }
    }

    /// Feed queued events and advance keys until both run dry, then repaint.
    fn drain(&mut self) {
        loop {
            while let Some(event) = self.queue.pop() {
                let events = self.provider.handle_event(&mut self.host, &event);
                self.record(events);
            }
            let events = self.provider.pump(&mut self.host);
            let idle = events.is_empty();
            self.record(events);
            if idle && self.queue.is_empty() {
                break;
            }
        }
        if std::mem::take(&mut self.moved) {
            let dropped = self.host.prune_detached();
            if dropped > 0 {
                tracing::trace!(dropped, "detached element handles dropped");
            }
        }
        self.paint();
    }

    fn paint(&mut self) {
        let (Some(view), Some(portal)) = (self.provider.render(), self.provider.portal()) else {
            self.painted.clear();
            return;
        };
        if let Some(markup) = self.painted.update(portal, view) {
            self.host
                .paint_portal(portal, &markup, &self.provider.config().accent_color);
        }
    }
}

/// Run queued work unless the engine is already on the stack; in that case
/// the outer drain loop picks the events up.
fn wake(engine: &Weak<RefCell<Engine>>) {
    let Some(engine) = engine.upgrade() else {
        return;
    };
    if let Ok(mut engine) = engine.try_borrow_mut() {
        engine.drain();
    }
}

fn busy() -> JsValue {
    JsValue::from_str("ftour is busy handling another call")
}

/// Browser entry point.
#[wasm_bindgen]
pub struct FtourWeb {
    engine: Rc<RefCell<Engine>>,
    queue: HostEventQueue,
    advance: Option<Closure<dyn FnMut(Event)>>,
}

#[wasm_bindgen]
impl FtourWeb {
    /// Bind to the page. Options: `keyboard` and `closeOnClickOutside`
    /// (booleans), `accentColor` (CSS color).
    #[wasm_bindgen(constructor)]
    pub fn new(options: Option<js_sys::Object>) -> Result<FtourWeb, JsValue> {
        let config = config_from_options(options.as_ref());
        let queue = HostEventQueue::new();
        let host = DomHost::new(queue.clone()).map_err(js_err)?;
        host.install_stylesheet(html::STYLESHEET).map_err(js_err)?;

        let engine = Rc::new(RefCell::new(Engine {
            host,
            provider: TourProvider::new(config),
            catalog: TourCatalog::new(),
            queue: queue.clone(),
            painted: PaintCache::new(),
            moved: false,
        }));
        let weak = Rc::downgrade(&engine);
        queue.set_waker(move || wake(&weak));

        // Page code announces completed actions with a window CustomEvent.
        let weak = Rc::downgrade(&engine);
        let advance = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let step_id = event
                .dyn_ref::<CustomEvent>()
                .map(CustomEvent::detail)
                .and_then(|detail| js_sys::Reflect::get(&detail, &JsValue::from_str("stepId")).ok())
                .and_then(|id| id.as_string());
            if let Some(step_id) = step_id {
                dispatch_tour_advance(&step_id);
                wake(&weak);
            }
        });
        engine
            .borrow()
            .host
            .window()
            .add_event_listener_with_callback(TOUR_ADVANCE_EVENT, advance.as_ref().unchecked_ref())?;

        tracing::info!("ftour attached");
        Ok(FtourWeb {
            engine,
            queue,
            advance: Some(advance),
        })
    }

    /// Register a tour from its JSON descriptor. Returns the tour id.
    #[wasm_bindgen(js_name = registerTour)]
    pub fn register_tour(&self, json: &str) -> Result<String, JsValue> {
        let mut engine = self.engine.try_borrow_mut().map_err(|_| busy())?;
        engine.catalog.register_json(json).map_err(js_err)
    }

    /// JSON listing of registered tours.
    pub fn tours(&self) -> Result<String, JsValue> {
        let engine = self.engine.try_borrow().map_err(|_| busy())?;
        Ok(engine.catalog.summaries_json())
    }

    /// Start a registered tour. Resolves to `opened`, `preparing`, `busy`,
    /// `empty` or `aborted`. Fails when called from inside another ftour
    /// call.
    pub fn launch(&self, id: &str) -> Result<String, JsValue> {
        let status = {
            let mut guard = self.engine.try_borrow_mut().map_err(|_| busy())?;
            let engine = &mut *guard;
            let tour = engine.catalog.get(id).map_err(js_err)?.clone();
            let status = engine.provider.launch(&mut engine.host, &tour).map_err(js_err)?;
            engine.moved = true;
            engine.drain();
            status
        };
        Ok(match status {
            LaunchStatus::Opened => "opened",
            LaunchStatus::Preparing => "preparing",
            LaunchStatus::Busy => "busy",
            LaunchStatus::Empty => "empty",
            LaunchStatus::Aborted => "aborted",
        }
        .to_owned())
    }

    pub fn next(&self) {
        self.act(OverlayAction::Next);
    }

    pub fn prev(&self) {
        self.act(OverlayAction::Prev);
    }

    /// Jump to `index`; negative indices go to the first step.
    #[wasm_bindgen(js_name = goTo)]
    pub fn go_to(&self, index: i32) {
        self.act(OverlayAction::GoTo(usize::try_from(index).unwrap_or(0)));
    }

    pub fn close(&self) {
        self.act(OverlayAction::Close);
    }

    /// Reads from inside another ftour call see a closed tour.
    #[wasm_bindgen(js_name = isOpen)]
    pub fn is_open(&self) -> bool {
        self.engine
            .try_borrow()
            .map(|e| e.provider.is_open())
            .unwrap_or(false)
    }

    #[wasm_bindgen(js_name = currentStep)]
    pub fn current_step(&self) -> usize {
        self.engine
            .try_borrow()
            .map(|e| e.provider.current_step_index())
            .unwrap_or(0)
    }

    /// Id of the catalog tour currently shown, if any.
    #[wasm_bindgen(js_name = activeTour)]
    pub fn active_tour(&self) -> Option<String> {
        let engine = self.engine.try_borrow().ok()?;
        engine.provider.active_tour().map(str::to_owned)
    }

    /// Announce a completed action by advance key.
    #[wasm_bindgen(js_name = dispatchAdvance)]
    pub fn dispatch_advance(&self, step_id: &str) -> usize {
        let delivered = dispatch_tour_advance(step_id);
        self.pump();
        delivered
    }

    /// Process anything queued since the last call. A no-op from inside
    /// another ftour call; the running call drains before it returns.
    pub fn pump(&self) {
        if let Ok(mut engine) = self.engine.try_borrow_mut() {
            engine.drain();
        }
    }

    /// Close the tour and release every registration on the page.
    pub fn destroy(&mut self) -> Result<(), JsValue> {
        let mut engine = self.engine.try_borrow_mut().map_err(|_| busy())?;
        engine.queue.clear_waker();
        let engine = &mut *engine;
        engine.provider.destroy(&mut engine.host);
        engine.queue.clear();
        engine.painted.clear();
        if let Some(advance) = self.advance.take() {
            let _ = engine
                .host
                .window()
                .remove_event_listener_with_callback(TOUR_ADVANCE_EVENT, advance.as_ref().unchecked_ref());
        }
        engine.host.prune_detached();
        if engine.host.body_overflow().as_deref() == Some("hidden") {
            tracing::warn!("body overflow still hidden after destroy");
        }
        Ok(())
    }
}

impl FtourWeb {
    /// Apply `action` now, or hand it to the drain already running.
    fn act(&self, action: OverlayAction) {
        let deferred = HostEvent::OverlayAction(action.to_string());
        self.queue.run_or_defer(&*self.engine, deferred, |engine| {
            let events = engine.provider.apply_action(&mut engine.host, action);
            engine.record(events);
            engine.drain();
        });
    }
}

fn config_from_options(options: Option<&js_sys::Object>) -> TourConfig {
    let mut config = TourConfig::default();
    let Some(options) = options else {
        return config;
    };
    let get = |key: &str| js_sys::Reflect::get(options, &JsValue::from_str(key)).ok();
    if get("keyboard").and_then(|v| v.as_bool()) == Some(false) {
        config = config.without_keyboard_navigation();
    }
    if get("closeOnClickOutside").and_then(|v| v.as_bool()) == Some(false) {
        config = config.without_close_on_click_outside();
    }
    if let Some(color) = get("accentColor").and_then(|v| v.as_string()) {
        config = config.with_accent_color(color);
    }
    config
}
