//! Pure projection from widget state to what the page should show.

use std::sync::LazyLock;

use regex::Regex;
use wire::{QuickReply, Role};

use crate::state::{Alert, ConfigStatus, Phase, WidgetCore};

pub const DEFAULT_USER_AVATAR: &str = "assets/images/user-avatar.png";
pub const DEFAULT_BOT_AVATAR: &str = "assets/images/bot-logo.png";
pub const DEFAULT_HEADER_TITLE: &str = "AI Chatbot";
pub const BUSY_LABEL: &str = "Sending...";
pub const OFFLINE_LABEL: &str = "Bot Offline";

/// Header status dot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Loading,
    Online,
    Offline,
    Error,
}

impl Status {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Loading => "Loading",
            Self::Online => "Online",
            Self::Offline => "Offline",
            Self::Error => "Error",
        }
    }

    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Loading | Self::Offline => "#acacac",
            Self::Online => "#68D391",
            Self::Error => "#ff0000",
        }
    }
}

/// `<a href='...'>label</a>` as the relay asks the model to write links.
static LINK_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*['"]([^'"]*)['"][^>]*>(.*?)</a\s*>"#));

/// A run of plain text, or a link the page renders as an anchor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Link { href: String, label: String },
}

impl Segment {
    /// What the visitor reads.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Link { label, .. } => label,
        }
    }
}

/// Split a bot reply into text and links. Only http(s) links survive;
/// any other anchor collapses to its label.
#[must_use]
pub fn segments(reply: &str) -> Vec<Segment> {
    let re = match &*LINK_RE {
        Ok(re) => re,
        Err(e) => {
            log::error!("link pattern failed to compile: {e}");
            return vec![Segment::Text(reply.to_string())];
        }
    };

    let mut out = Vec::new();
    let mut rest = 0;
    for caps in re.captures_iter(reply) {
        let (Some(whole), Some(href), Some(label)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        push_text(&mut out, &reply[rest..whole.start()]);
        rest = whole.end();

        let href = href.as_str().trim();
        let label = label.as_str().trim();
        if is_web_url(href) {
            let label = if label.is_empty() { href } else { label };
            out.push(Segment::Link { href: href.to_string(), label: label.to_string() });
        } else {
            push_text(&mut out, label);
        }
    }
    push_text(&mut out, &reply[rest..]);
    out
}

fn push_text(out: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Segment::Text(last)) = out.last_mut() {
        last.push_str(text);
    } else {
        out.push(Segment::Text(text.to_string()));
    }
}

fn is_web_url(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    (lower.starts_with("https://") || lower.starts_with("http://")) && !href.contains(char::is_whitespace)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageView {
    pub role: Role,
    /// Visible text with links reduced to their labels. This is what a copy puts on the clipboard.
    pub text: String,
    pub segments: Vec<Segment>,
    pub avatar_url: String,
    /// Non-empty bot messages carry a copy button.
    pub copyable: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ViewModel {
    pub phase: Phase,
    pub launcher_visible: bool,
    pub window_visible: bool,
    pub header_title: String,
    /// Back arrow and lead header replace the normal header on the form.
    pub show_back: bool,
    pub status: Status,
    pub loading: bool,
    pub start_button_visible: bool,
    pub lead_fields_visible: bool,
    pub message_input_visible: bool,
    pub input_locked: bool,
    /// Text on the submit button while it is disabled.
    pub submit_label: Option<&'static str>,
    pub font_size_px: Option<u32>,
    pub messages: Vec<MessageView>,
    pub typing_indicator: bool,
    pub quick_replies: Vec<QuickReply>,
    pub alert: Option<Alert>,
}

#[must_use]
pub fn project(core: &WidgetCore) -> ViewModel {
    let phase = core.phase();
    let open_phase = core.open_phase();
    let config = core.config();

    let status = match core.config_status() {
        ConfigStatus::Loading => Status::Loading,
        ConfigStatus::Failed => Status::Error,
        ConfigStatus::Ready(c) if c.enabled => Status::Online,
        ConfigStatus::Ready(_) => Status::Offline,
    };

    let busy = core.is_fetching() || core.submitting_lead();
    let submit_label = if busy {
        Some(BUSY_LABEL)
    } else if status == Status::Offline {
        Some(OFFLINE_LABEL)
    } else {
        None
    };

    let (user_avatar, bot_avatar) = match config {
        Some(c) => (
            or_default(&c.user_avatar_url, DEFAULT_USER_AVATAR),
            or_default(&c.bot_avatar_url, DEFAULT_BOT_AVATAR),
        ),
        None => (DEFAULT_USER_AVATAR.to_string(), DEFAULT_BOT_AVATAR.to_string()),
    };

    let messages = core
        .transcript()
        .iter()
        .map(|turn| {
            let is_bot = turn.role == Role::Model;
            // Visitor text is never parsed for markup.
            let segments =
                if is_bot { segments(turn.text()) } else { vec![Segment::Text(turn.text().to_string())] };
            let text: String = segments.iter().map(Segment::label).collect();
            MessageView {
                role: turn.role,
                copyable: is_bot && !text.trim().is_empty(),
                text,
                segments,
                avatar_url: if is_bot { bot_avatar.clone() } else { user_avatar.clone() },
            }
        })
        .collect();

    ViewModel {
        phase,
        launcher_visible: phase == Phase::Launcher,
        window_visible: phase != Phase::Launcher,
        header_title: config
            .map(|c| c.header_title.trim())
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_HEADER_TITLE)
            .to_string(),
        show_back: open_phase == Phase::LeadForm,
        status,
        loading: status == Status::Loading,
        start_button_visible: open_phase == Phase::PreCapture,
        lead_fields_visible: open_phase == Phase::LeadForm,
        message_input_visible: matches!(open_phase, Phase::LeadForm | Phase::Chat),
        input_locked: busy || !core.accepting_input(),
        submit_label,
        font_size_px: config.and_then(wire::BotConfig::font_size_px),
        messages,
        typing_indicator: core.is_fetching(),
        quick_replies: core.visible_quick_replies().to_vec(),
        alert: core.alert().cloned(),
    }
}

fn or_default(url: &str, default: &str) -> String {
    let url = url.trim();
    if url.is_empty() { default.to_string() } else { url.to_string() }
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
