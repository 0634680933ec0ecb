//! The interactive chat loop.
//!
//! Reads lines with `rustyline_async`, routes slash commands locally, and
//! sends everything else through the chat session one turn at a time.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use curdmate_core::chat::SessionError;
use curdmate_infra::secret::secret_from_env;
use curdmate_types::conversation::Trigger;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::ChatRenderer;
use crate::state::{AppState, Session};

/// Run a chat session until the user exits or the session expires.
///
/// `token_env` names an environment variable whose token replaces the
/// configured one for this session.
pub async fn run_chat_loop(state: &AppState, token_env: Option<&str>) -> anyhow::Result<()> {
    let token = match token_env {
        Some(var) => {
            let token = secret_from_env(var);
            if token.is_none() {
                anyhow::bail!("environment variable {var} is not set");
            }
            token
        }
        None => None,
    };

    let mut session = state.new_session(token);
    let renderer = ChatRenderer::new();

    let nlp_model = state.resolver.is_configured().then(|| state.resolver.model());
    print_welcome_banner(
        &state.config.record_api.base_url,
        nlp_model,
        &session.id().to_string(),
    );
    tracing::debug!(session.id = %session.id(), "chat session started");

    if let Some(welcome) = session.transcript().last() {
        println!("{}", renderer.render_message(welcome));
    }

    let (mut chat_input, _writer) = ChatInput::new(prompt_for(&session))
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        let event = chat_input.read_line().await;
        match event {
            InputEvent::Eof => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!(
                    "\n  {}",
                    style("Press Ctrl+D to exit, or /cancel to abandon the current step.").dim()
                );
                continue;
            }
            InputEvent::Message(text) => {
                let (message, trigger) = match commands::parse(&text) {
                    Some(ChatCommand::Help) => {
                        commands::print_help();
                        continue;
                    }
                    Some(ChatCommand::Clear) => {
                        chat_input.clear();
                        continue;
                    }
                    Some(ChatCommand::Exit) => {
                        println!("\n  {}", style("Session ended.").dim());
                        break;
                    }
                    Some(ChatCommand::Cancel) => {
                        let reply = session.cancel();
                        println!("{}", renderer.render_message(reply));
                        chat_input.update_prompt(&prompt_for(&session));
                        continue;
                    }
                    Some(ChatCommand::History) => {
                        print_history(&session, &renderer);
                        continue;
                    }
                    Some(ChatCommand::Status) => {
                        print_status(&session);
                        continue;
                    }
                    Some(ChatCommand::Unknown(name)) => {
                        println!(
                            "\n  {} Unknown command: {}. Type /help for available commands.\n",
                            style("?").yellow().bold(),
                            style(name).dim()
                        );
                        continue;
                    }
                    Some(ChatCommand::Action(action)) => (action.label().to_string(), Trigger::QuickAction),
                    None => (text, Trigger::FreeText),
                };

                let spinner = thinking_spinner();
                let result = session.submit(&message, trigger).await;
                spinner.finish_and_clear();

                match result {
                    Ok(reply) => {
                        println!("{}", renderer.render_message(reply));
                    }
                    Err(SessionError::EmptyMessage) => continue,
                    Err(SessionError::Expired) => {
                        println!("\n  {}", style("Session expired. Please login again.").red());
                        break;
                    }
                }

                if session.is_expired() {
                    println!(
                        "  {}",
                        style("Set a fresh token and start a new chat to continue.").dim()
                    );
                    break;
                }

                if !session.state().is_idle() {
                    println!("  {}", style(session.input_hint()).dim());
                }
                chat_input.update_prompt(&prompt_for(&session));
            }
        }
    }

    chat_input.flush();
    Ok(())
}

/// Prompt showing the active operation, e.g. `[Creating record - step 2/5] >`.
fn prompt_for(session: &Session) -> String {
    if session.state().is_idle() {
        format!("  {} ", style("You >").green().bold())
    } else {
        format!(
            "  {} {} ",
            style(format!("[{}]", session.status_line())).cyan(),
            style(">").green().bold()
        )
    }
}

fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(spinner_style);
    }
    spinner.set_message("thinking...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

fn print_history(session: &Session, renderer: &ChatRenderer) {
    println!();
    println!(
        "  {} ({} messages)",
        style("Conversation history").bold(),
        session.transcript().len()
    );
    println!();
    for message in session.transcript().messages() {
        println!(
            "  {}",
            style(message.timestamp.format("%H:%M:%S").to_string()).dim()
        );
        println!("{}", renderer.render_message(message));
    }
}

fn print_status(session: &Session) {
    println!();
    println!("  {}  {}", style("Status:").bold(), session.status_line());
    if let Some(progress) = session.progress() {
        let filled = usize::from(progress.percent) / 5;
        println!(
            "  {}  {}{} {}%",
            style("Progress:").bold(),
            style("#".repeat(filled)).cyan(),
            style("-".repeat(20 - filled)).dim(),
            progress.percent
        );
    }
    println!("  {}  {}", style("Hint:").bold(), style(session.input_hint()).dim());
    println!();
}
