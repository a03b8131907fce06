//! Async driver for the widget state machine.
//!
//! DESIGN
//! ======
//! `Widget` owns the core, the network API, the identity store and the
//! view binding. Every public method runs a state transition, carries out
//! the returned effects in order, and re-renders. Network results are fed
//! back into the core, which may produce further effects (a created lead
//! immediately sends the visitor's first message).
//!
//! The core lives in a `RefCell` and is only borrowed inside synchronous
//! statements, never across an `.await`, so browser event handlers can
//! call back in while a request is pending. Those calls see
//! `is_fetching` and are dropped by the core.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use crate::net::WidgetApi;
use crate::render::{ViewModel, project};
use crate::session::{SessionId, now_ms};
use crate::state::{Effect, WidgetCore};
use crate::storage::IdentityStore;
use crate::validate::LeadForm;

/// Where the widget draws itself.
pub trait ViewBinding {
    fn render(&self, view: &ViewModel);
    fn clear_message_input(&self);
    fn set_message_input(&self, text: &str);
    fn focus_message_input(&self);
    fn reset_lead_form(&self);

    /// Release listeners and remove the widget from the page.
    fn teardown(&self) {}
}

pub struct Widget<A, S, V> {
    core: RefCell<WidgetCore>,
    api: A,
    identity: S,
    view: V,
    active: Cell<bool>,
}

impl<A, S, V> Widget<A, S, V>
where
    A: WidgetApi,
    S: IdentityStore,
    V: ViewBinding,
{
    /// Build the widget, reading the remembered identity once.
    pub fn new(api: A, identity: S, view: V, session_id: SessionId, page_url: &str) -> Self {
        let remembered = identity.load();
        let core = WidgetCore::new(session_id, page_url, remembered.as_ref());
        Self { core: RefCell::new(core), api, identity, view, active: Cell::new(false) }
    }

    /// Load configuration and draw the first frame.
    pub async fn init(&self) {
        self.active.set(true);
        self.core.borrow_mut().begin_config_load();
        self.render();

        let outcome = self.api.fetch_config().await;
        match outcome {
            Ok(config) => self.core.borrow_mut().config_loaded(config, now_ms()),
            Err(err) => {
                log::error!("failed to load bot configuration: {err}");
                self.core.borrow_mut().config_failed();
            }
        }
        self.render();
    }

    /// Stop rendering. In-flight requests still complete into the core.
    pub fn teardown(&self) {
        if self.active.replace(false) {
            self.view.teardown();
        }
    }

    /// Current projection, for hosts that poll instead of being pushed.
    pub fn view_model(&self) -> ViewModel {
        project(&self.core.borrow())
    }

    /// Read-only access to the core for hosts and tests.
    pub fn with_core<R>(&self, f: impl FnOnce(&WidgetCore) -> R) -> R {
        f(&self.core.borrow())
    }

    pub fn toggle(&self) {
        self.core.borrow_mut().toggle();
        self.render();
    }

    pub fn open(&self) {
        self.core.borrow_mut().open();
        self.render();
    }

    pub fn close(&self) {
        self.core.borrow_mut().close();
        self.render();
    }

    pub fn start_conversation(&self) {
        self.core.borrow_mut().start_conversation();
        self.render();
    }

    pub async fn back(&self) {
        let effects = self.core.borrow_mut().back();
        self.run(effects).await;
    }

    pub fn dismiss_alert(&self) {
        self.core.borrow_mut().dismiss_alert();
        self.render();
    }

    pub async fn submit_lead(&self, form: LeadForm) {
        let effects = self.core.borrow_mut().submit_lead(&form);
        self.run(effects).await;
    }

    pub async fn submit_message(&self, text: &str) {
        let effects = self.core.borrow_mut().submit_message(text, now_ms());
        self.run(effects).await;
    }

    pub async fn quick_reply(&self, index: usize) {
        let effects = self.core.borrow_mut().quick_reply(index, now_ms());
        self.run(effects).await;
    }

    /// Carry out effects in order, feeding network results back in.
    async fn run(&self, effects: Vec<Effect>) {
        let mut queue: VecDeque<Effect> = effects.into();
        self.render();

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::CreateLead(req) => {
                    let outcome = self.api.create_lead(&req).await;
                    match outcome {
                        Ok(lead_id) => {
                            log::info!("lead {lead_id} captured for session {}", req.lead_id);
                            let more = self.core.borrow_mut().lead_created(now_ms());
                            queue.extend(more);
                        }
                        Err(err) => {
                            log::error!("lead capture failed: {err}");
                            self.core.borrow_mut().lead_failed(&err);
                        }
                    }
                }
                Effect::SendChat(req) => {
                    // Render first so the visitor sees their turn and the typing indicator.
                    self.render();
                    let outcome = self.api.send_chat(&req).await;
                    let more = self.core.borrow_mut().chat_finished(outcome, now_ms());
                    queue.extend(more);
                }
                Effect::RememberLead(identity) => {
                    if let Err(err) = self.identity.save(&identity) {
                        log::warn!("could not remember lead identity: {err}");
                    }
                }
                Effect::ClearMessageInput => self.view.clear_message_input(),
                Effect::FocusMessageInput => self.view.focus_message_input(),
                Effect::FillMessageInput(text) => self.view.set_message_input(&text),
                Effect::ResetLeadForm => self.view.reset_lead_form(),
            }
            self.render();
        }
    }

    fn render(&self) {
        if !self.active.get() {
            return;
        }
        let view = project(&self.core.borrow());
        self.view.render(&view);
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
