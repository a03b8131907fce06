//! Widget state machine.
//!
//! DESIGN
//! ======
//! `WidgetCore` owns every piece of widget state and performs no I/O.
//! Each input method mutates state and returns the [`Effect`]s the host
//! must carry out (network calls, storage writes, input focus). The async
//! driver in `controller` feeds results back in through the `*_finished`
//! style methods, so the whole flow is testable without a browser.
//!
//! STATES
//! ======
//! `Launcher` when the window is closed; otherwise one of `PreCapture`,
//! `LeadForm` or `Chat`. Opening and closing never changes the stage or
//! the captured-lead flag.

use wire::{BotConfig, ChatRequest, CreateLeadRequest, QuickReply, Role, Turn};

use crate::error::{CONFIG_LOAD_FAILED, WidgetError};
use crate::session::SessionId;
use crate::storage::LeadIdentity;
use crate::validate::{LeadForm, validate_lead};

/// Work the host performs on behalf of the core.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    CreateLead(CreateLeadRequest),
    SendChat(ChatRequest),
    RememberLead(LeadIdentity),
    ClearMessageInput,
    FocusMessageInput,
    /// Put text into the message field without sending it.
    FillMessageInput(String),
    /// Discard in-progress lead form edits.
    ResetLeadForm,
}

/// Observable widget state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Launcher,
    PreCapture,
    LeadForm,
    Chat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    PreCapture,
    LeadForm,
    Chat,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigStatus {
    Loading,
    Ready(BotConfig),
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    pub text: String,
    /// Persistent alerts stay until reload; transient ones auto-hide.
    pub persistent: bool,
}

#[allow(clippy::struct_excessive_bools)]
pub struct WidgetCore {
    session_id: SessionId,
    page_url: String,
    open: bool,
    stage: Stage,
    lead_captured: bool,
    is_fetching: bool,
    submitting_lead: bool,
    pending_lead: Option<LeadForm>,
    config: ConfigStatus,
    transcript: Vec<Turn>,
    quick_replies: Vec<QuickReply>,
    quick_replies_used: bool,
    alert: Option<Alert>,
}

impl WidgetCore {
    /// A remembered identity starts the widget ready to chat.
    #[must_use]
    pub fn new(session_id: SessionId, page_url: impl Into<String>, remembered: Option<&LeadIdentity>) -> Self {
        let lead_captured = remembered.is_some();
        Self {
            session_id,
            page_url: page_url.into(),
            open: false,
            stage: if lead_captured { Stage::Chat } else { Stage::PreCapture },
            lead_captured,
            is_fetching: false,
            submitting_lead: false,
            pending_lead: None,
            config: ConfigStatus::Loading,
            transcript: Vec::new(),
            quick_replies: Vec::new(),
            quick_replies_used: false,
            alert: None,
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn phase(&self) -> Phase {
        if !self.open {
            return Phase::Launcher;
        }
        match self.stage {
            Stage::PreCapture => Phase::PreCapture,
            Stage::LeadForm => Phase::LeadForm,
            Stage::Chat => Phase::Chat,
        }
    }

    /// Stage the window shows when open, regardless of visibility.
    #[must_use]
    pub fn open_phase(&self) -> Phase {
        match self.stage {
            Stage::PreCapture => Phase::PreCapture,
            Stage::LeadForm => Phase::LeadForm,
            Stage::Chat => Phase::Chat,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    #[must_use]
    pub fn lead_captured(&self) -> bool {
        self.lead_captured
    }

    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.is_fetching
    }

    #[must_use]
    pub fn submitting_lead(&self) -> bool {
        self.submitting_lead
    }

    #[must_use]
    pub fn config_status(&self) -> &ConfigStatus {
        &self.config
    }

    #[must_use]
    pub fn config(&self) -> Option<&BotConfig> {
        match &self.config {
            ConfigStatus::Ready(config) => Some(config),
            _ => None,
        }
    }

    #[must_use]
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    #[must_use]
    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    /// Quick replies currently offered; empty once one has been used.
    #[must_use]
    pub fn visible_quick_replies(&self) -> &[QuickReply] {
        if self.quick_replies_used || self.config().is_none() {
            return &[];
        }
        &self.quick_replies
    }

    /// Configuration loaded and the bot switched on.
    #[must_use]
    pub fn accepting_input(&self) -> bool {
        self.config().is_some_and(|c| c.enabled)
    }

    // --- Configuration bootstrap ---

    /// Config fetch started: clear the transcript and any offered buttons.
    pub fn begin_config_load(&mut self) {
        self.config = ConfigStatus::Loading;
        self.transcript.clear();
        self.quick_replies.clear();
    }

    pub fn config_loaded(&mut self, config: BotConfig, now: i64) {
        let startup = config.startup_message.trim();
        if !startup.is_empty() {
            self.transcript.push(Turn::new(Role::Model, startup, now));
        }
        self.quick_replies = if self.lead_captured { Vec::new() } else { config.quick_replies() };
        self.config = ConfigStatus::Ready(config);
    }

    /// Fatal for the session: input stays locked until reload.
    pub fn config_failed(&mut self) {
        self.config = ConfigStatus::Failed;
        self.alert = Some(Alert { text: CONFIG_LOAD_FAILED.to_string(), persistent: true });
    }

    // --- Visibility ---

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Hide a transient alert. Persistent alerts stay.
    pub fn dismiss_alert(&mut self) {
        if self.alert.as_ref().is_some_and(|a| !a.persistent) {
            self.alert = None;
        }
    }

    // --- Lead capture ---

    /// "Start conversation": show the lead form.
    pub fn start_conversation(&mut self) {
        if self.stage == Stage::PreCapture {
            self.stage = Stage::LeadForm;
        }
    }

    /// Leave the lead form without submitting.
    pub fn back(&mut self) -> Vec<Effect> {
        if self.stage != Stage::LeadForm || self.submitting_lead {
            return Vec::new();
        }
        self.stage = Stage::PreCapture;
        vec![Effect::ResetLeadForm]
    }

    /// Validate and request lead creation. Invalid input raises an alert
    /// and produces no effects.
    pub fn submit_lead(&mut self, form: &LeadForm) -> Vec<Effect> {
        if self.stage != Stage::LeadForm || self.submitting_lead || !self.accepting_input() {
            return Vec::new();
        }
        self.dismiss_alert();

        let form = match validate_lead(form) {
            Ok(form) => form,
            Err(message) => {
                self.alert = Some(Alert { text: message.to_string(), persistent: false });
                return Vec::new();
            }
        };

        self.submitting_lead = true;
        let request = CreateLeadRequest {
            name: form.name.clone(),
            email: form.email.clone(),
            phone: form.phone.clone(),
            query: form.query.clone(),
            current_page_url: self.page_url.clone(),
            lead_id: self.session_id.to_string(),
        };
        self.pending_lead = Some(form);
        vec![Effect::CreateLead(request)]
    }

    /// Lead saved: switch to chat, remember the visitor, send their query.
    pub fn lead_created(&mut self, now: i64) -> Vec<Effect> {
        let Some(form) = self.pending_lead.take() else {
            return Vec::new();
        };
        self.submitting_lead = false;
        self.lead_captured = true;
        self.stage = Stage::Chat;

        let identity = LeadIdentity { name: form.name, email: form.email, phone: form.phone };
        let mut effects = vec![Effect::RememberLead(identity)];
        effects.extend(self.send(&form.query, now));
        effects
    }

    /// Lead rejected or unreachable: stay on the form with an alert.
    pub fn lead_failed(&mut self, err: &WidgetError) {
        if self.pending_lead.take().is_none() {
            return;
        }
        self.submitting_lead = false;
        self.alert = Some(Alert { text: err.lead_alert(), persistent: false });
    }

    // --- Chat ---

    /// Send a typed message. Ignored outside chat, while a request is in
    /// flight, or when the message is blank.
    pub fn submit_message(&mut self, text: &str, now: i64) -> Vec<Effect> {
        if self.stage != Stage::Chat {
            return Vec::new();
        }
        self.send(text, now)
    }

    /// Click a quick reply. In chat it sends the prompt; before capture it
    /// opens the lead form with the prompt as the visitor's query. Either
    /// way the row is hidden for the rest of the session.
    pub fn quick_reply(&mut self, index: usize, now: i64) -> Vec<Effect> {
        if !self.accepting_input() {
            return Vec::new();
        }
        let Some(prompt) = self.visible_quick_replies().get(index).map(|q| q.prompt.clone()) else {
            return Vec::new();
        };

        match self.stage {
            // The row goes away on any click, even one that cannot send yet.
            Stage::Chat => {
                self.quick_replies_used = true;
                self.send(&prompt, now)
            }
            Stage::PreCapture | Stage::LeadForm => {
                if self.submitting_lead {
                    return Vec::new();
                }
                self.quick_replies_used = true;
                self.stage = Stage::LeadForm;
                vec![Effect::FillMessageInput(prompt)]
            }
        }
    }

    /// Record the outcome of the in-flight chat request. Always appends
    /// exactly one `model` turn.
    pub fn chat_finished(&mut self, outcome: Result<String, WidgetError>, now: i64) -> Vec<Effect> {
        if !self.is_fetching {
            return Vec::new();
        }
        let text = match outcome {
            Ok(text) => text,
            Err(err) => {
                log::warn!("chat request failed: {err}");
                err.chat_fallback()
            }
        };
        self.transcript.push(Turn::new(Role::Model, text, now));
        self.is_fetching = false;
        vec![Effect::FocusMessageInput]
    }

    fn send(&mut self, text: &str, now: i64) -> Vec<Effect> {
        let text = text.trim();
        if self.is_fetching || text.is_empty() || !self.accepting_input() {
            return Vec::new();
        }

        let history = self.transcript.iter().map(Turn::to_history).collect();
        self.transcript.push(Turn::new(Role::User, text, now));
        self.is_fetching = true;

        let request = ChatRequest {
            last_prompt: text.to_string(),
            conversation_history: history,
            session_id: self.session_id.to_string(),
        };
        vec![Effect::ClearMessageInput, Effect::SendChat(request)]
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
