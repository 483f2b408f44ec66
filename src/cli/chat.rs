// src/cli/chat.rs — Interactive REPL

use crate::core::controller::ChatController;
use crate::core::persist::SharedStore;

/// Mutable session state that slash commands can modify.
struct ChatState {
    /// Active model selector; `None` means the gateway's primary.
    selector: Option<String>,
}

/// Run the interactive chat REPL.
pub async fn run_chat(controller: ChatController, model: Option<String>) -> anyhow::Result<()> {
    let mut state = ChatState { selector: model };

    eprintln!(
        "chatx v{} | model: {} | {} session(s)\n",
        env!("CARGO_PKG_VERSION"),
        state
            .selector
            .as_deref()
            .unwrap_or_else(|| controller.gateway().primary()),
        controller.store().sessions().len(),
    );

    while let Some(input) = read_input() {
        let trimmed = input.trim();

        // Handle quit
        if trimmed == "quit" || trimmed == "exit" || trimmed == "/quit" {
            break;
        }

        // Handle slash commands
        if trimmed.starts_with('/') {
            handle_slash_command(trimmed, &mut state, &controller);
            continue;
        }

        // Empty input
        if trimmed.is_empty() {
            continue;
        }

        match controller.submit(trimmed, state.selector.as_deref()).await {
            Ok(turn) => {
                println!("{}", turn.assistant.content);
            }
            Err(e) => {
                eprintln!("[error] {}", e);
            }
        }
    }

    let messages = controller
        .store()
        .current_session()
        .map(|s| s.messages.len())
        .unwrap_or(0);
    eprintln!(
        "\nSession saved: {} message(s) across {} session(s).",
        messages,
        controller.store().sessions().len(),
    );
    Ok(())
}

fn read_input() -> Option<String> {
    use std::io::{self, BufRead, Write};

    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();
    let mut line = String::new();
    match stdin.lock().read_line(&mut line) {
        Ok(0) => None, // EOF
        Ok(_) => Some(line),
        Err(_) => None,
    }
}

fn handle_slash_command(input: &str, state: &mut ChatState, controller: &ChatController) {
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    let store = controller.store();

    match cmd {
        "/new" => {
            store.create_session();
            let name = store
                .current_session()
                .map(|s| s.name)
                .unwrap_or_default();
            eprintln!("  Started '{}'", name);
        }

        "/list" => {
            let current = store.current_session_id();
            for (i, s) in store.sessions().iter().enumerate() {
                let marker = if Some(s.id.as_str()) == current.as_deref() {
                    " *"
                } else {
                    ""
                };
                eprintln!(
                    "  {}. {} ({} message(s)){}",
                    i + 1,
                    s.name,
                    s.messages.len(),
                    marker,
                );
            }
        }

        "/load" => {
            if arg.is_empty() {
                eprintln!("  Usage: /load <number|id> (see /list)");
            } else if let Some(id) = resolve_session(store, arg) {
                store.load_session(Some(&id));
                let name = store
                    .current_session()
                    .map(|s| s.name)
                    .unwrap_or_default();
                eprintln!("  Switched to '{}'", name);
            } else {
                eprintln!("  No such session: {}", arg);
            }
        }

        "/rename" => {
            if arg.is_empty() {
                eprintln!("  Usage: /rename <new name>");
            } else if let Some(id) = store.current_session_id() {
                store.rename_session(&id, arg);
                eprintln!("  Renamed to '{}'", arg);
            } else {
                eprintln!("  No active session.");
            }
        }

        "/delete" => {
            let id = if arg.is_empty() {
                store.current_session_id()
            } else {
                resolve_session(store, arg)
            };
            match id {
                Some(id) => {
                    store.delete_session(&id);
                    let name = store
                        .current_session()
                        .map(|s| s.name)
                        .unwrap_or_default();
                    eprintln!("  Deleted. Now on '{}'", name);
                }
                None => eprintln!("  No such session: {}", arg),
            }
        }

        "/clear" => {
            store.clear_messages();
            eprintln!("  Cleared current transcript.");
        }

        "/clear-all" => {
            store.delete_all_sessions();
            eprintln!("  Deleted all sessions.");
        }

        "/model" => {
            let gateway = controller.gateway();
            if arg.is_empty() {
                let active = state
                    .selector
                    .as_deref()
                    .unwrap_or_else(|| gateway.primary());
                eprintln!("  Current model: {}", active);
                eprintln!("  Available models:");
                for p in gateway.providers() {
                    let marker = if p.id() == active { " *" } else { "" };
                    eprintln!("    {} ({}){}", p.id(), p.name(), marker);
                }
                eprintln!("  Usage: /model <id>");
            } else if gateway.providers().iter().any(|p| p.id() == arg) {
                state.selector = Some(arg.to_string());
                eprintln!("  Model switched to {}", arg);
            } else {
                let available: Vec<&str> =
                    gateway.providers().iter().map(|p| p.id()).collect();
                eprintln!(
                    "  Unknown model '{}'. Available: {}",
                    arg,
                    available.join(", "),
                );
            }
        }

        "/status" => {
            match store.current_session() {
                Some(s) => {
                    eprintln!("  Session: {} ({} message(s))", s.name, s.messages.len());
                }
                None => eprintln!("  Session: (none active)"),
            }
            eprintln!("  Sessions: {}", store.sessions().len());
            eprintln!(
                "  Model: {}",
                state
                    .selector
                    .as_deref()
                    .unwrap_or_else(|| controller.gateway().primary()),
            );
            if let Some(error) = store.error() {
                eprintln!("  Last error: {}", error);
            }
        }

        "/help" => {
            eprintln!("Slash commands:");
            eprintln!("  /new               Start a new session");
            eprintln!("  /list              List sessions");
            eprintln!("  /load <n|id>       Switch to a session");
            eprintln!("  /rename <name>     Rename the current session");
            eprintln!("  /delete [n|id]     Delete a session (current if omitted)");
            eprintln!("  /clear             Clear the current transcript");
            eprintln!("  /clear-all         Delete all sessions");
            eprintln!("  /model [id]        Show or switch the active model");
            eprintln!("  /status            Show session status");
            eprintln!("  /help              Show this help");
            eprintln!("  /quit, quit, exit  End session");
        }

        _ => {
            eprintln!("Unknown command: {}. Type /help for commands.", cmd);
        }
    }
}

/// Resolve a `/list` number or a session id to a concrete session id.
fn resolve_session(store: &SharedStore, arg: &str) -> Option<String> {
    let sessions = store.sessions();
    if let Ok(n) = arg.parse::<usize>() {
        if n >= 1 && n <= sessions.len() {
            return Some(sessions[n - 1].id.clone());
        }
    }
    sessions.iter().find(|s| s.id == arg).map(|s| s.id.clone())
}
