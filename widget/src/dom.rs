//! Browser view binding.
//!
//! DESIGN
//! ======
//! `DomView` injects the widget markup into a host element once and
//! resolves every handle up front, so `render` is a straight diff-free
//! repaint of the `ViewModel`. Message text goes through `textContent`,
//! never `innerHTML`; links in bot replies arrive as parsed segments and
//! become anchors built node by node.
//!
//! Transient alerts hide themselves after `ALERT_HIDE_MS`. The timer calls
//! back into the widget through `on_alert_expired`, so the core and the
//! page agree on whether an alert is showing.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Document, Element, Event, HtmlAnchorElement, HtmlButtonElement, HtmlElement, HtmlImageElement,
    HtmlInputElement, HtmlTextAreaElement,
};

use crate::controller::ViewBinding;
use crate::error::WidgetError;
use crate::render::{DEFAULT_BOT_AVATAR, MessageView, Segment, ViewModel};
use crate::state::Alert;
use crate::validate::LeadForm;
use wire::Role;

const ALERT_HIDE_MS: u32 = 3_500;
const COPY_FEEDBACK_MS: u32 = 1_500;
const AVATAR_PX: u32 = 30;
const COPY_LABEL: &str = "Copy";

const MARKUP: &str = r#"
<div class="custom-chatbot__image" data-role="launcher" style="display:none">
  <img src="" alt="Chat" width="60" height="60">
</div>
<div class="custom-chatbot" style="display:none">
  <div class="chat">
    <div class="chat__header">
      <div class="chat__header-name">
        <span class="chat__title"></span>
        <span class="chat__status"><span class="chat__status-dot"></span> <em class="chat__status-label"></em></span>
      </div>
      <div class="chat__header-back" style="display:none">
        <button type="button" class="back-btn">&larr;</button>
        <span>Leave your details</span>
      </div>
      <button type="button" class="chat__close">&times;</button>
    </div>
    <div class="chat__loading">Loading...</div>
    <div class="chat__messages"></div>
    <div class="startup-btns"></div>
    <div class="chatbot-popup" style="display:none"><p class="chatbot-popup__text"></p></div>
    <form class="chat__form">
      <div class="lead-fields" style="display:none">
        <input type="text" name="name" placeholder="Name">
        <input type="email" name="email" placeholder="Email">
        <input type="tel" name="phone" placeholder="Phone">
      </div>
      <div class="msg-input" style="display:none">
        <textarea name="message" placeholder="Type your message..."></textarea>
      </div>
      <div class="button-start"><button type="button" class="start-btn">Start a conversation</button></div>
      <div class="button-submit">
        <button type="submit" class="submit-btn"><span class="submit-label"></span><i class="submit-icon">&#10148;</i></button>
      </div>
    </form>
  </div>
</div>
"#;

/// A user gesture the host wires to a widget method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gesture {
    Toggle,
    Start,
    Back,
    Submit,
}

pub struct DomView {
    document: Document,
    root: Element,
    launcher: HtmlElement,
    launcher_img: HtmlImageElement,
    window: HtmlElement,
    title: HtmlElement,
    status_dot: HtmlElement,
    status_label: HtmlElement,
    header_name: HtmlElement,
    header_back: HtmlElement,
    back_button: HtmlButtonElement,
    close_button: HtmlButtonElement,
    loading: HtmlElement,
    messages: HtmlElement,
    quick_row: HtmlElement,
    popup: HtmlElement,
    popup_text: HtmlElement,
    form: HtmlElement,
    lead_fields: HtmlElement,
    name: HtmlInputElement,
    email: HtmlInputElement,
    phone: HtmlInputElement,
    message_row: HtmlElement,
    message: HtmlTextAreaElement,
    start_row: HtmlElement,
    start_button: HtmlButtonElement,
    submit_button: HtmlButtonElement,
    submit_label: HtmlElement,
    shown_alert: RefCell<Option<Alert>>,
    alert_epoch: Rc<Cell<u32>>,
    on_alert_expired: RefCell<Option<Rc<dyn Fn()>>>,
    listeners: RefCell<Vec<(Element, &'static str, Closure<dyn FnMut(Event)>)>>,
}

impl DomView {
    /// Inject the widget into the element matching `selector`.
    pub fn mount(selector: &str) -> Result<Self, WidgetError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| WidgetError::Dom("no document".into()))?;
        let root = document
            .query_selector(selector)
            .map_err(js_error)?
            .ok_or_else(|| WidgetError::Dom(format!("no element matches {selector}")))?;
        root.set_inner_html(MARKUP);

        let view = Self {
            launcher: find(&root, "[data-role=launcher]")?,
            launcher_img: find(&root, "[data-role=launcher] img")?,
            window: find(&root, ".custom-chatbot")?,
            title: find(&root, ".chat__title")?,
            status_dot: find(&root, ".chat__status-dot")?,
            status_label: find(&root, ".chat__status-label")?,
            header_name: find(&root, ".chat__header-name")?,
            header_back: find(&root, ".chat__header-back")?,
            back_button: find(&root, ".back-btn")?,
            close_button: find(&root, ".chat__close")?,
            loading: find(&root, ".chat__loading")?,
            messages: find(&root, ".chat__messages")?,
            quick_row: find(&root, ".startup-btns")?,
            popup: find(&root, ".chatbot-popup")?,
            popup_text: find(&root, ".chatbot-popup__text")?,
            form: find(&root, ".chat__form")?,
            lead_fields: find(&root, ".lead-fields")?,
            name: find(&root, "input[name=name]")?,
            email: find(&root, "input[name=email]")?,
            phone: find(&root, "input[name=phone]")?,
            message_row: find(&root, ".msg-input")?,
            message: find(&root, "textarea[name=message]")?,
            start_row: find(&root, ".button-start")?,
            start_button: find(&root, ".start-btn")?,
            submit_button: find(&root, ".submit-btn")?,
            submit_label: find(&root, ".submit-label")?,
            shown_alert: RefCell::new(None),
            alert_epoch: Rc::new(Cell::new(0)),
            on_alert_expired: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            document,
            root,
        };
        view.launcher_img.set_src(DEFAULT_BOT_AVATAR);
        view.listen(view.messages.clone().into(), "click", copy_on_click)?;
        Ok(view)
    }

    /// Called when a transient alert's timer runs out.
    pub fn set_on_alert_expired(&self, hook: impl Fn() + 'static) {
        *self.on_alert_expired.borrow_mut() = Some(Rc::new(hook));
    }

    /// Route a gesture to `handler`. Submit suppresses the form's default.
    pub fn on(&self, gesture: Gesture, handler: impl Fn() + 'static) -> Result<(), WidgetError> {
        let targets: Vec<(Element, &'static str)> = match gesture {
            Gesture::Toggle => {
                vec![(self.launcher.clone().into(), "click"), (self.close_button.clone().into(), "click")]
            }
            Gesture::Start => vec![(self.start_button.clone().into(), "click")],
            Gesture::Back => vec![(self.back_button.clone().into(), "click")],
            Gesture::Submit => vec![(self.form.clone().into(), "submit")],
        };
        let handler = Rc::new(handler);
        for (target, event) in targets {
            let handler = handler.clone();
            self.listen(target, event, move |ev: Event| {
                if gesture == Gesture::Submit {
                    ev.prevent_default();
                }
                handler();
            })?;
        }
        Ok(())
    }

    /// Route quick-reply clicks to `handler` with the button's index.
    pub fn on_quick_reply(&self, handler: impl Fn(usize) + 'static) -> Result<(), WidgetError> {
        self.listen(self.quick_row.clone().into(), "click", move |ev: Event| {
            let raw = ev
                .target()
                .and_then(|t| t.dyn_ref::<Element>().and_then(|el| el.closest("[data-index]").unwrap_or_default()))
                .and_then(|el| el.get_attribute("data-index"));
            if let Some(Ok(index)) = raw.map(|r| r.parse::<usize>()) {
                handler(index);
            }
        })
    }

    /// Current lead form values.
    #[must_use]
    pub fn lead_form(&self) -> LeadForm {
        LeadForm::new(&self.name.value(), &self.email.value(), &self.phone.value(), &self.message.value())
    }

    #[must_use]
    pub fn message_text(&self) -> String {
        self.message.value()
    }

    fn listen(
        &self,
        target: Element,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), WidgetError> {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(js_error)?;
        self.listeners.borrow_mut().push((target, event, closure));
        Ok(())
    }

    fn render_messages(&self, view: &ViewModel) {
        self.messages.set_inner_html("");
        for message in &view.messages {
            match self.message_node(message) {
                Ok(node) => warn_on_err(self.messages.append_child(&node), "append message"),
                Err(e) => log::warn!("{e}"),
            }
        }
        if view.typing_indicator {
            match self.element::<HtmlElement>("p") {
                Ok(dots) => {
                    dots.set_class_name("chat__message chat__message--typing");
                    dots.set_text_content(Some("..."));
                    warn_on_err(self.messages.append_child(&dots), "append typing indicator");
                }
                Err(e) => log::warn!("{e}"),
            }
        }
        self.messages.set_scroll_top(self.messages.scroll_height());
    }

    fn message_node(&self, message: &MessageView) -> Result<HtmlElement, WidgetError> {
        let row: HtmlElement = self.element("div")?;
        let side = if message.role == Role::Model { "bot" } else { "user" };
        row.set_class_name(&format!("chat__message chat__message--{side}"));

        let avatar: HtmlImageElement = self.element("img")?;
        avatar.set_src(&message.avatar_url);
        avatar.set_alt(side);
        avatar.set_width(AVATAR_PX);
        avatar.set_height(AVATAR_PX);

        let text: HtmlElement = self.element("p")?;
        for segment in &message.segments {
            match segment {
                Segment::Text(run) => {
                    let node = self.document.create_text_node(run);
                    text.append_child(&node).map_err(js_error)?;
                }
                Segment::Link { href, label } => {
                    let anchor: HtmlAnchorElement = self.element("a")?;
                    anchor.set_href(href);
                    anchor.set_target("_blank");
                    anchor.set_rel("noopener noreferrer");
                    anchor.set_text_content(Some(label));
                    text.append_child(&anchor).map_err(js_error)?;
                }
            }
        }
        if message.copyable {
            let copy: HtmlButtonElement = self.element("button")?;
            copy.set_type("button");
            copy.set_class_name("copy-text");
            copy.set_title(COPY_LABEL);
            copy.set_text_content(Some(COPY_LABEL));
            copy.set_attribute("data-copy", &message.text).map_err(js_error)?;
            text.append_child(&copy).map_err(js_error)?;
        }

        row.append_child(&avatar).map_err(js_error)?;
        row.append_child(&text).map_err(js_error)?;
        Ok(row)
    }

    fn render_quick_replies(&self, view: &ViewModel) {
        self.quick_row.set_inner_html("");
        for (index, reply) in view.quick_replies.iter().enumerate() {
            match self.element::<HtmlButtonElement>("button") {
                Ok(button) => {
                    button.set_type("button");
                    button.set_class_name("startup-btn");
                    button.set_text_content(Some(&reply.text));
                    warn_on_err(button.set_attribute("data-index", &index.to_string()), "index quick reply");
                    warn_on_err(self.quick_row.append_child(&button), "append quick reply");
                }
                Err(e) => log::warn!("{e}"),
            }
        }
        show(&self.quick_row, !view.quick_replies.is_empty());
    }

    fn render_alert(&self, alert: Option<&Alert>) {
        if self.shown_alert.borrow().as_ref() == alert {
            return;
        }
        *self.shown_alert.borrow_mut() = alert.cloned();

        let Some(alert) = alert else {
            show(&self.popup, false);
            return;
        };
        self.popup_text.set_text_content(Some(&alert.text));
        set_style(&self.popup, "background-color", if alert.persistent { "#991a1a" } else { "#333" });
        show(&self.popup, true);

        let epoch = self.alert_epoch.get().wrapping_add(1);
        self.alert_epoch.set(epoch);
        if alert.persistent {
            return;
        }
        let current = self.alert_epoch.clone();
        let popup = self.popup.clone();
        let hook = self.on_alert_expired.borrow().clone();
        gloo_timers::callback::Timeout::new(ALERT_HIDE_MS, move || {
            if current.get() != epoch {
                return;
            }
            show(&popup, false);
            if let Some(hook) = hook {
                hook();
            }
        })
        .forget();
    }

    fn element<T: JsCast>(&self, tag: &str) -> Result<T, WidgetError> {
        self.document
            .create_element(tag)
            .map_err(js_error)?
            .dyn_into::<T>()
            .map_err(|_| WidgetError::Dom(format!("<{tag}> has an unexpected type")))
    }
}

impl ViewBinding for Rc<DomView> {
    fn render(&self, view: &ViewModel) {
        show(&self.launcher, view.launcher_visible);
        show(&self.window, view.window_visible);
        if let Some(first) = view.messages.iter().find(|m| m.role == Role::Model) {
            self.launcher_img.set_src(&first.avatar_url);
        }

        self.title.set_text_content(Some(&view.header_title));
        set_style(&self.status_dot, "background-color", view.status.color());
        self.status_label.set_text_content(Some(view.status.label()));
        show(&self.header_name, !view.show_back);
        show(&self.header_back, view.show_back);
        show(&self.loading, view.loading);

        if let Some(px) = view.font_size_px {
            set_style(&self.messages, "font-size", &format!("{px}px"));
        }
        self.render_messages(view);
        self.render_quick_replies(view);

        show(&self.start_row, view.start_button_visible);
        show(&self.lead_fields, view.lead_fields_visible);
        show(&self.message_row, view.message_input_visible);
        show(&self.submit_button, view.message_input_visible);

        self.message.set_disabled(view.input_locked);
        self.submit_button.set_disabled(view.input_locked);
        self.start_button.set_disabled(view.input_locked);
        self.submit_label.set_text_content(view.submit_label);

        self.render_alert(view.alert.as_ref());
    }

    fn clear_message_input(&self) {
        self.message.set_value("");
    }

    fn set_message_input(&self, text: &str) {
        self.message.set_value(text);
    }

    fn focus_message_input(&self) {
        warn_on_err(self.message.focus(), "focus message input");
    }

    fn reset_lead_form(&self) {
        for input in [&self.name, &self.email, &self.phone] {
            input.set_value("");
        }
        self.message.set_value("");
    }

    fn teardown(&self) {
        for (target, event, closure) in self.listeners.borrow_mut().drain(..) {
            warn_on_err(
                target.remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref()),
                "remove listener",
            );
        }
        self.on_alert_expired.borrow_mut().take();
        self.alert_epoch.set(self.alert_epoch.get().wrapping_add(1));
        self.root.set_inner_html("");
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn find<T: JsCast>(root: &Element, selector: &str) -> Result<T, WidgetError> {
    root.query_selector(selector)
        .map_err(js_error)?
        .ok_or_else(|| WidgetError::Dom(format!("missing {selector}")))?
        .dyn_into::<T>()
        .map_err(|_| WidgetError::Dom(format!("{selector} has an unexpected type")))
}

/// Delegated click handler on the message list: copies a bot reply.
fn copy_on_click(ev: Event) {
    let Some(button) = ev
        .target()
        .and_then(|t| t.dyn_ref::<Element>().and_then(|el| el.closest("[data-copy]").unwrap_or_default()))
    else {
        return;
    };
    let (Some(text), Some(clipboard)) =
        (button.get_attribute("data-copy"), web_sys::window().and_then(|w| w.navigator().clipboard()))
    else {
        return;
    };
    let promise = clipboard.write_text(&text);
    wasm_bindgen_futures::spawn_local(async move {
        match JsFuture::from(promise).await {
            Ok(_) => flash(&button, "Copied"),
            Err(e) => {
                log::warn!("copy failed: {e:?}");
                flash(&button, "Could not copy text.");
            }
        }
    });
}

/// Show `label` on the copy button briefly. The node may be gone by then.
fn flash(button: &Element, label: &str) {
    button.set_text_content(Some(label));
    let button = button.clone();
    gloo_timers::callback::Timeout::new(COPY_FEEDBACK_MS, move || button.set_text_content(Some(COPY_LABEL))).forget();
}

fn show(el: &HtmlElement, visible: bool) {
    set_style(el, "display", if visible { "" } else { "none" });
}

fn set_style(el: &HtmlElement, property: &str, value: &str) {
    warn_on_err(el.style().set_property(property, value), property);
}

fn warn_on_err<T>(result: Result<T, JsValue>, what: &str) {
    if let Err(e) = result {
        log::warn!("{what} failed: {e:?}");
    }
}

fn js_error(e: JsValue) -> WidgetError {
    WidgetError::Dom(format!("{e:?}"))
}
