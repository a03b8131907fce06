//! Interactive chat loop. Slash commands map onto widget gestures; plain
//! lines are chat messages, or lead form answers while the form is open.

use std::io::Write;
use std::rc::Rc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use widget::controller::Widget;
use widget::net::WidgetApi;
use widget::state::{Phase, WidgetCore};
use widget::storage::IdentityStore;
use widget::validate::LeadForm;

use crate::CliError;
use crate::terminal::TerminalView;

const LEAD_FIELDS: [&str; 4] = ["Name", "Email", "Phone", "Message"];

const HELP: &str = "/open  /close  /start  /back  /quick N  /help  /quit";

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Open,
    Close,
    Start,
    Back,
    /// Zero-based quick reply index.
    Quick(usize),
    Help,
    Quit,
    Message(String),
    Unknown(String),
}

pub fn parse_line(line: &str) -> Input {
    let line = line.trim();
    let Some(command) = line.strip_prefix('/') else {
        return Input::Message(line.to_owned());
    };
    let mut words = command.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some("open"), None, _) => Input::Open,
        (Some("close"), None, _) => Input::Close,
        (Some("start"), None, _) => Input::Start,
        (Some("back"), None, _) => Input::Back,
        (Some("help"), None, _) => Input::Help,
        (Some("quit" | "exit"), None, _) => Input::Quit,
        (Some("quick"), Some(n), None) => match n.parse::<usize>() {
            Ok(n) if n >= 1 => Input::Quick(n - 1),
            _ => Input::Unknown(line.to_owned()),
        },
        _ => Input::Unknown(line.to_owned()),
    }
}

/// Drive `widget` from `input` until `/quit` or end of input.
pub async fn run<A, S, W, R>(
    widget: &Widget<A, S, Rc<TerminalView<W>>>,
    view: &TerminalView<W>,
    input: R,
) -> Result<(), CliError>
where
    A: WidgetApi,
    S: IdentityStore,
    W: Write,
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut answers: Vec<String> = Vec::new();
    prompt_next_field(widget, view, &answers);

    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Input::Quit => break,
            Input::Help => view.note(HELP),
            Input::Open => widget.open(),
            Input::Close => widget.close(),
            Input::Start => widget.start_conversation(),
            Input::Back => {
                answers.clear();
                widget.back().await;
            }
            Input::Quick(index) => widget.quick_reply(index).await,
            Input::Unknown(command) => view.note(&format!("unknown command {command}; /help lists commands")),
            Input::Message(text) => match widget.with_core(WidgetCore::phase) {
                Phase::LeadForm => {
                    answers.push(text);
                    if answers.len() == LEAD_FIELDS.len() {
                        let form = lead_form(&answers, &view.draft());
                        answers.clear();
                        widget.submit_lead(form).await;
                    }
                }
                Phase::Chat => widget.submit_message(&text).await,
                Phase::PreCapture => view.note("/start to leave your details first"),
                Phase::Launcher => view.note("the chat is closed; /open to reopen"),
            },
        }
        prompt_next_field(widget, view, &answers);
    }
    Ok(())
}

fn prompt_next_field<A, S, W>(widget: &Widget<A, S, Rc<TerminalView<W>>>, view: &TerminalView<W>, answers: &[String])
where
    A: WidgetApi,
    S: IdentityStore,
    W: Write,
{
    if widget.with_core(WidgetCore::phase) != Phase::LeadForm {
        return;
    }
    let Some(label) = LEAD_FIELDS.get(answers.len()) else {
        return;
    };
    let prefill = if answers.len() == LEAD_FIELDS.len() - 1 { view.draft() } else { String::new() };
    view.prompt(label, &prefill);
}

/// A blank message answer takes the prefilled draft.
fn lead_form(answers: &[String], draft: &str) -> LeadForm {
    let field = |i: usize| answers.get(i).map_or("", String::as_str);
    let query = if field(3).trim().is_empty() { draft } else { field(3) };
    LeadForm::new(field(0), field(1), field(2), query)
}

#[cfg(test)]
#[path = "repl_test.rs"]
mod tests;
