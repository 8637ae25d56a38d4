//! Terminal rendering of engine views

use chatlite_core::view::{ChatView, MessageView, SessionView};
use chatlite_core::{MessageStatus, Role, LOADING_TEXT};
use console::style;

/// Tracks what has already been printed so each published view only
/// prints the rows that changed.
#[derive(Debug, Default)]
pub struct Transcript {
    shown: Vec<MessageView>,
    session: Option<String>,
}

/// Rows to print for one view update
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Changes {
    /// The conversation was swapped or shrank; print it from the top
    pub reset: bool,
    /// `(1-based position, row)` pairs
    pub rows: Vec<(usize, MessageView)>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, chat: &ChatView) -> Changes {
        // A brand new conversation getting its session token is not a swap.
        let swapped = chat.active_session_id != self.session
            && !(self.session.is_none() && self.shown.is_empty());
        let reset = swapped || chat.messages.len() < self.shown.len();

        let rows = chat
            .messages
            .iter()
            .enumerate()
            .filter(|(i, row)| {
                reset
                    || self
                        .shown
                        .get(*i)
                        .map_or(true, |prev| prev.text != row.text || prev.role != row.role)
            })
            .map(|(i, row)| (i + 1, row.clone()))
            .collect();

        self.shown = chat.messages.clone();
        self.session = chat.active_session_id.clone();
        Changes { reset, rows }
    }
}

pub fn print_changes(changes: &Changes) {
    if changes.reset {
        println!("{}", style("--- conversation ---").dim());
    }
    for (position, row) in &changes.rows {
        println!("{}", format_message(*position, row));
    }
}

pub fn format_message(position: usize, row: &MessageView) -> String {
    let index = style(format!("[{position}]")).dim();
    match row.role {
        Role::User => format!("{} {} {}", index, style("you:").bold().cyan(), row.text),
        Role::Assistant => {
            let text = match row.status {
                MessageStatus::Failed => style(row.text.as_str()).red().to_string(),
                MessageStatus::Provisional if row.text == LOADING_TEXT => {
                    style(row.text.as_str()).dim().to_string()
                }
                _ => row.text.clone(),
            };
            format!("{} {} {}", index, style("bot:").bold().green(), text)
        }
    }
}

pub fn print_messages(messages: &[MessageView]) {
    if messages.is_empty() {
        println!("{}", style("(no messages)").dim());
    }
    for (i, row) in messages.iter().enumerate() {
        println!("{}", format_message(i + 1, row));
    }
}

pub fn print_sessions(sessions: &[SessionView]) {
    if sessions.is_empty() {
        println!("{}", style("(no sessions)").dim());
        return;
    }
    for (i, session) in sessions.iter().enumerate() {
        let marker = if session.active { "*" } else { " " };
        println!(
            "{} {:>3}. {}  {}",
            style(marker).green().bold(),
            i + 1,
            session.label,
            style(&session.id).dim()
        );
    }
}
