//! Line-oriented view binding. Each render prints only what changed since
//! the previous frame: new transcript lines, phase and status changes,
//! a fresh alert, a new set of quick replies.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use widget::controller::ViewBinding;
use widget::render::{MessageView, Segment, Status, ViewModel};
use widget::state::{Alert, Phase};
use wire::{QuickReply, Role};

#[derive(Default)]
struct Seen {
    messages: usize,
    phase: Option<Phase>,
    status: Option<Status>,
    alert: Option<Alert>,
    quick_replies: Vec<QuickReply>,
    typing: bool,
}

pub struct TerminalView<W: Write> {
    out: RefCell<W>,
    seen: RefCell<Seen>,
    draft: RefCell<String>,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: RefCell::new(out),
            seen: RefCell::new(Seen::default()),
            draft: RefCell::new(String::new()),
        }
    }

    /// Text waiting in the message field, e.g. a quick-reply prompt.
    pub fn draft(&self) -> String {
        self.draft.borrow().clone()
    }

    /// A line from the REPL itself rather than the widget.
    pub fn note(&self, text: &str) {
        self.write(&format!("[{text}]\n"));
    }

    /// Ask for one lead form field, showing any prefilled value.
    pub fn prompt(&self, label: &str, prefill: &str) {
        if prefill.is_empty() {
            self.write(&format!("{label}: "));
        } else {
            self.write(&format!("{label} [{prefill}]: "));
        }
    }

    fn write(&self, text: &str) {
        let mut out = self.out.borrow_mut();
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
            eprintln!("terminal write failed: {e}");
        }
    }
}

#[cfg(test)]
impl TerminalView<Vec<u8>> {
    pub(crate) fn written(&self) -> String {
        String::from_utf8_lossy(&self.out.borrow()).into_owned()
    }
}

impl<W: Write> ViewBinding for Rc<TerminalView<W>> {
    fn render(&self, view: &ViewModel) {
        let mut text = String::new();
        let mut seen = self.seen.borrow_mut();

        if seen.status != Some(view.status) {
            if !view.loading {
                text.push_str(&format!("[{}: {}]\n", view.header_title, view.status.label()));
            }
            seen.status = Some(view.status);
        }

        if seen.phase != Some(view.phase) {
            text.push_str(phase_hint(view.phase));
            seen.phase = Some(view.phase);
        }

        // The transcript restarts when configuration reloads.
        if view.messages.len() < seen.messages {
            seen.messages = 0;
        }
        if view.window_visible {
            for message in &view.messages[seen.messages..] {
                let who = if message.role == Role::Model { "bot" } else { "you" };
                text.push_str(&format!("{who}> {}\n", plain_text(message)));
            }
            seen.messages = view.messages.len();

            if view.typing_indicator && !seen.typing {
                text.push_str("bot is typing...\n");
            }
            seen.typing = view.typing_indicator;

            if view.quick_replies != seen.quick_replies {
                if !view.quick_replies.is_empty() {
                    text.push_str(&quick_reply_menu(&view.quick_replies));
                }
                seen.quick_replies.clone_from(&view.quick_replies);
            }
        }

        if view.alert != seen.alert {
            if let Some(alert) = &view.alert {
                text.push_str(&format!("! {}\n", alert.text));
            }
            seen.alert.clone_from(&view.alert);
        }

        drop(seen);
        if !text.is_empty() {
            self.write(&text);
        }
    }

    fn clear_message_input(&self) {
        self.draft.borrow_mut().clear();
    }

    fn set_message_input(&self, text: &str) {
        *self.draft.borrow_mut() = text.to_owned();
    }

    /// The REPL prompt already has focus.
    fn focus_message_input(&self) {}

    fn reset_lead_form(&self) {
        self.draft.borrow_mut().clear();
    }

    fn teardown(&self) {
        self.write("[bye]\n");
    }
}

fn phase_hint(phase: Phase) -> &'static str {
    match phase {
        Phase::Launcher => "[chat closed; /open to reopen]\n",
        Phase::PreCapture => "[/start to leave your details and begin]\n",
        Phase::LeadForm => "[lead form: answer each field, /back to cancel]\n",
        Phase::Chat => "[type a message; /help lists commands]\n",
    }
}

/// Links print as `label <url>`; a bare url prints once.
fn plain_text(message: &MessageView) -> String {
    message
        .segments
        .iter()
        .map(|segment| match segment {
            Segment::Text(text) => text.clone(),
            Segment::Link { href, label } if href == label => href.clone(),
            Segment::Link { href, label } => format!("{label} <{href}>"),
        })
        .collect()
}

fn quick_reply_menu(replies: &[QuickReply]) -> String {
    let items: Vec<String> = replies.iter().enumerate().map(|(i, q)| format!("{}) {}", i + 1, q.text)).collect();
    format!("quick replies (/quick N): {}\n", items.join("  "))
}

#[cfg(test)]
#[path = "terminal_test.rs"]
mod tests;
