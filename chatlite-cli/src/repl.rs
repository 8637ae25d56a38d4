//! Interactive chat loop

use crate::render::{print_changes, print_messages, print_sessions, Transcript};
use anyhow::Result;
use chatlite_core::view::ChatView;
use chatlite_core::MessageId;
use chatlite_engine::ChatEngine;
use console::style;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

/// A line typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Send(String),
    New,
    Sessions,
    Switch(String),
    Delete(usize),
    Rename { target: String, name: String },
    History,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return ReplCommand::Empty;
        }
        // Messages go out exactly as typed.
        let Some(command) = trimmed.strip_prefix('/') else {
            return ReplCommand::Send(line.to_string());
        };

        let (name, rest) = match command.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (command, ""),
        };

        match name {
            "new" => ReplCommand::New,
            "sessions" => ReplCommand::Sessions,
            "history" => ReplCommand::History,
            "help" => ReplCommand::Help,
            "quit" | "exit" => ReplCommand::Quit,
            "switch" if !rest.is_empty() => ReplCommand::Switch(rest.to_string()),
            "delete" => match rest.parse::<usize>() {
                Ok(n) if n > 0 => ReplCommand::Delete(n),
                _ => ReplCommand::Invalid("usage: /delete N".to_string()),
            },
            "rename" => match rest.split_once(char::is_whitespace) {
                Some((target, name)) => ReplCommand::Rename {
                    target: target.to_string(),
                    name: name.trim().to_string(),
                },
                None => ReplCommand::Invalid("usage: /rename N NAME".to_string()),
            },
            "switch" => ReplCommand::Invalid("usage: /switch N|ID".to_string()),
            other => ReplCommand::Invalid(format!("unknown command /{other}")),
        }
    }
}

/// Resolve a 1-based position in the session list, or a literal session id
pub fn resolve_session(chat: &ChatView, target: &str) -> Option<String> {
    if let Ok(n) = target.parse::<usize>() {
        if let Some(session) = n.checked_sub(1).and_then(|i| chat.sessions.get(i)) {
            return Some(session.id.clone());
        }
    }
    chat.sessions
        .iter()
        .find(|s| s.id == target)
        .map(|s| s.id.clone())
}

fn print_help() {
    println!("{}", style("Commands:").bold());
    println!("  /new              start a new conversation");
    println!("  /sessions         list sessions");
    println!("  /switch N|ID      open a session");
    println!("  /delete N         delete message N");
    println!("  /rename N NAME    rename session N");
    println!("  /history          print the conversation");
    println!("  /help             show this help");
    println!("  /quit             leave");
}

fn print_error(error: impl std::fmt::Display) {
    println!("{} {}", style("error:").red().bold(), error);
}

/// Run the chat loop until `/quit` or end of input
pub async fn run(engine: Arc<ChatEngine>) -> Result<()> {
    let mut views = engine.subscribe();
    let mut transcript = Transcript::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!(
        "{} {}",
        style("chatlite").bold().cyan(),
        style("(/help for commands)").dim()
    );
    print_changes(&transcript.update(&engine.view().chat));

    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let chat = views.borrow_and_update().chat.clone();
                print_changes(&transcript.update(&chat));
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("Input closed");
                    break;
                };
                if !handle(&engine, ReplCommand::parse(&line)).await {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Apply one command; returns false when the loop should stop
async fn handle(engine: &Arc<ChatEngine>, command: ReplCommand) -> bool {
    match command {
        ReplCommand::Empty => {}
        ReplCommand::Quit => return false,
        ReplCommand::Help => print_help(),
        ReplCommand::Invalid(message) => print_error(message),
        ReplCommand::Send(text) => {
            // Sends run in the background so several can be in flight.
            let engine = engine.clone();
            tokio::spawn(async move {
                let outcome = engine.send_message(&text).await;
                debug!("Send finished: {:?}", outcome);
            });
        }
        ReplCommand::New => engine.new_chat(),
        ReplCommand::Sessions => {
            if let Err(e) = engine.refresh_sessions().await {
                print_error(e);
            }
            print_sessions(&engine.view().chat.sessions);
        }
        ReplCommand::History => print_messages(&engine.view().chat.messages),
        ReplCommand::Switch(target) => {
            let Some(session_id) = resolve_session(&engine.view().chat, &target) else {
                print_error(format!("no session {target}, try /sessions"));
                return true;
            };
            if let Err(e) = engine.switch_session(&session_id).await {
                print_error(e);
            }
        }
        ReplCommand::Delete(position) => {
            let row = engine.view().chat.messages.get(position - 1).cloned();
            let Some(row) = row else {
                print_error(format!("no message {position}"));
                return true;
            };
            if let Err(e) = engine.delete_message(&MessageId::parse(&row.id)).await {
                print_error(e);
            }
        }
        ReplCommand::Rename { target, name } => {
            let Some(session_id) = resolve_session(&engine.view().chat, &target) else {
                print_error(format!("no session {target}, try /sessions"));
                return true;
            };
            if !engine.begin_rename(&session_id) {
                warn!("Session {} vanished before rename", session_id);
                return true;
            }
            engine.set_rename_text(name);
            match engine.commit_rename().await {
                Ok(()) => print_sessions(&engine.view().chat.sessions),
                Err(e) => {
                    engine.cancel_rename();
                    print_error(e);
                }
            }
        }
    }
    true
}
