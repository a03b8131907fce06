//! Embeddable chatbot widget.
//!
//! The widget is a small state machine (`state`) driven by an async
//! controller (`controller`) that talks to the chatbot server through a
//! `WidgetApi` and draws through a `ViewBinding`. Everything but the
//! browser glue builds and tests natively; the `hydrate` feature adds the
//! DOM binding, the gloo-net client and the `mount` entry point for WASM.

pub mod controller;
pub mod error;
pub mod net;
pub mod render;
pub mod session;
pub mod state;
pub mod storage;
pub mod validate;

#[cfg(feature = "hydrate")]
pub mod dom;

#[cfg(feature = "hydrate")]
pub use hydrate::{WidgetHandle, mount};

#[cfg(feature = "hydrate")]
mod hydrate {
    use std::rc::{Rc, Weak};
    use std::sync::Once;

    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;

    use crate::controller::Widget;
    use crate::dom::{DomView, Gesture};
    use crate::net::HttpApi;
    use crate::session::SessionId;
    use crate::state::{Phase, WidgetCore};
    use crate::storage::LocalStorageIdentity;

    type BrowserWidget = Widget<HttpApi, LocalStorageIdentity, Rc<DomView>>;

    static LOGGER: Once = Once::new();

    /// Handle returned to the host page.
    #[wasm_bindgen]
    pub struct WidgetHandle {
        widget: Rc<BrowserWidget>,
    }

    #[wasm_bindgen]
    impl WidgetHandle {
        /// Remove the widget and its listeners from the page.
        pub fn teardown(&self) {
            self.widget.teardown();
        }
    }

    /// Mount the widget into the element matching `selector`, talking to
    /// the chatbot server at `api_base` (empty for same origin).
    #[wasm_bindgen]
    pub fn mount(selector: &str, api_base: &str) -> Result<WidgetHandle, JsValue> {
        console_error_panic_hook::set_once();
        LOGGER.call_once(|| {
            if let Err(e) = console_log::init_with_level(log::Level::Info) {
                web_sys::console::warn_1(&JsValue::from_str(&e.to_string()));
            }
        });

        let page_url = web_sys::window().map(|w| w.location().href().unwrap_or_default()).unwrap_or_default();
        let view = Rc::new(DomView::mount(selector).map_err(|e| JsValue::from_str(&e.to_string()))?);
        let widget = Rc::new(Widget::new(
            HttpApi::new(api_base),
            LocalStorageIdentity,
            view.clone(),
            SessionId::generate(),
            &page_url,
        ));

        wire_gestures(&view, &widget).map_err(|e| JsValue::from_str(&e.to_string()))?;

        let booting = widget.clone();
        spawn_local(async move { booting.init().await });
        Ok(WidgetHandle { widget })
    }

    /// Listeners hold weak references so teardown can drop the widget.
    fn wire_gestures(view: &Rc<DomView>, widget: &Rc<BrowserWidget>) -> Result<(), crate::error::WidgetError> {
        let weak = Rc::downgrade(widget);

        view.set_on_alert_expired(with(&weak, |w| w.dismiss_alert()));
        view.on(Gesture::Toggle, with(&weak, |w| w.toggle()))?;
        view.on(Gesture::Start, with(&weak, |w| w.start_conversation()))?;
        view.on(Gesture::Back, with(&weak, |w| spawn_local(async move { w.back().await })))?;

        let form_view = Rc::downgrade(view);
        view.on(
            Gesture::Submit,
            with(&weak, move |w| {
                let Some(view) = form_view.upgrade() else { return };
                if w.with_core(WidgetCore::phase) == Phase::LeadForm {
                    let form = view.lead_form();
                    spawn_local(async move { w.submit_lead(form).await });
                } else {
                    let text = view.message_text();
                    spawn_local(async move { w.submit_message(&text).await });
                }
            }),
        )?;

        let quick = weak.clone();
        view.on_quick_reply(move |index| {
            if let Some(w) = quick.upgrade() {
                spawn_local(async move { w.quick_reply(index).await });
            }
        })
    }

    fn with(weak: &Weak<BrowserWidget>, f: impl Fn(Rc<BrowserWidget>) + 'static) -> impl Fn() + 'static {
        let weak = weak.clone();
        move || {
            if let Some(widget) = weak.upgrade() {
                f(widget);
            }
        }
    }
}
