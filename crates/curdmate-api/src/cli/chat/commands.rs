//! Slash command parsing for the chat loop.
//!
//! Commands start with `/`. The four quick actions start a guided flow the
//! same way the buttons of a chat UI would.

use console::style;

/// A quick action, delivered to the engine with `Trigger::QuickAction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAction {
    Create,
    Search,
    Update,
    Delete,
}

impl QuickAction {
    /// Button label sent as the message text.
    pub fn label(self) -> &'static str {
        match self {
            QuickAction::Create => "Create Contact",
            QuickAction::Search => "Search Contacts",
            QuickAction::Update => "Update Contact",
            QuickAction::Delete => "Delete Contact",
        }
    }
}

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Clear the terminal screen.
    Clear,
    /// Exit the chat session.
    Exit,
    /// Abandon the active operation.
    Cancel,
    /// Show the transcript so far.
    History,
    /// Show the current mode and progress.
    Status,
    Action(QuickAction),
    /// Unknown command.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let cmd = trimmed
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase();

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/clear" | "/cls" => Some(ChatCommand::Clear),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        "/cancel" | "/c" => Some(ChatCommand::Cancel),
        "/history" => Some(ChatCommand::History),
        "/status" => Some(ChatCommand::Status),
        "/create" | "/add" => Some(ChatCommand::Action(QuickAction::Create)),
        "/search" | "/find" => Some(ChatCommand::Action(QuickAction::Search)),
        "/update" | "/edit" => Some(ChatCommand::Action(QuickAction::Update)),
        "/delete" | "/rm" => Some(ChatCommand::Action(QuickAction::Delete)),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Print the help text listing all available commands.
pub fn print_help() {
    println!();
    println!("  {}", style("Quick actions:").bold());
    println!();
    println!("  {}   {}", style("/create").cyan(), "Add a new contact step by step");
    println!("  {}   {}", style("/search").cyan(), "Find contacts by id, email or name");
    println!("  {}   {}", style("/update").cyan(), "Change one field of a contact");
    println!("  {}   {}", style("/delete").cyan(), "Remove a contact (asks first)");
    println!();
    println!("  {}", style("Session:").bold());
    println!();
    println!("  {}   {}", style("/cancel").cyan(), "Abandon the current operation");
    println!("  {}   {}", style("/status").cyan(), "Show what the assistant is doing");
    println!("  {}  {}", style("/history").cyan(), "Show the conversation so far");
    println!("  {}    {}", style("/clear").cyan(), "Clear the screen");
    println!("  {}     {}", style("/help").cyan(), "Show this help message");
    println!("  {}     {}", style("/exit").cyan(), "End the chat session");
    println!();
    println!(
        "  {}",
        style("Or just type, e.g. \"find john@example.com\" or \"delete contact 507f1f77bcf86cd799439011\"").dim()
    );
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_help() {
        assert_eq!(parse("/help"), Some(ChatCommand::Help));
        assert_eq!(parse("/h"), Some(ChatCommand::Help));
        assert_eq!(parse("/?"), Some(ChatCommand::Help));
    }

    #[test]
    fn test_parse_exit() {
        assert_eq!(parse("/exit"), Some(ChatCommand::Exit));
        assert_eq!(parse("/quit"), Some(ChatCommand::Exit));
        assert_eq!(parse("/q"), Some(ChatCommand::Exit));
    }

    #[test]
    fn test_parse_quick_actions() {
        assert_eq!(parse("/create"), Some(ChatCommand::Action(QuickAction::Create)));
        assert_eq!(parse("/ADD"), Some(ChatCommand::Action(QuickAction::Create)));
        assert_eq!(parse("/find"), Some(ChatCommand::Action(QuickAction::Search)));
        assert_eq!(parse("/edit"), Some(ChatCommand::Action(QuickAction::Update)));
        assert_eq!(parse("/delete now"), Some(ChatCommand::Action(QuickAction::Delete)));
    }

    #[test]
    fn test_parse_session_controls() {
        assert_eq!(parse("/cancel"), Some(ChatCommand::Cancel));
        assert_eq!(parse("  /status  "), Some(ChatCommand::Status));
        assert_eq!(parse("/history"), Some(ChatCommand::History));
        assert_eq!(parse("/cls"), Some(ChatCommand::Clear));
    }

    #[test]
    fn test_parse_not_a_command() {
        assert_eq!(parse("cancel"), None);
        assert_eq!(parse("find john"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(parse("/foo"), Some(ChatCommand::Unknown("/foo".to_string())));
    }

    #[test]
    fn test_quick_action_labels_route_to_their_flows() {
        use curdmate_core::intent::keyword::match_keyword;
        use curdmate_types::conversation::Mode;

        assert_eq!(match_keyword(QuickAction::Create.label()), Some(Mode::Creating));
        assert_eq!(match_keyword(QuickAction::Search.label()), Some(Mode::Searching));
        assert_eq!(match_keyword(QuickAction::Update.label()), Some(Mode::Updating));
        assert_eq!(match_keyword(QuickAction::Delete.label()), Some(Mode::Deleting));
    }
}
