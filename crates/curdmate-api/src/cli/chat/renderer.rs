//! Terminal rendering of bot replies.
//!
//! Replies are short markdown (bold, bullet lists). `termimad` renders them;
//! the leading label is colored by the reply's action tag.

use console::{StyledObject, style};
use termimad::MadSkin;
use termimad::crossterm::style::Color;

use curdmate_types::transcript::{ActionTag, Sender, TranscriptMessage};

/// Terminal markdown renderer for transcript messages.
pub struct ChatRenderer {
    skin: MadSkin,
}

impl Default for ChatRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatRenderer {
    pub fn new() -> Self {
        let mut skin = MadSkin::default_dark();
        skin.bold.set_fg(Color::Cyan);
        skin.inline_code.set_fg(Color::Yellow);
        Self { skin }
    }

    /// Render markdown to a terminal string.
    pub fn render_markdown(&self, markdown: &str) -> String {
        self.skin.term_text(markdown).to_string()
    }

    /// Render a full transcript message with its sender label.
    pub fn render_message(&self, message: &TranscriptMessage) -> String {
        let label = match message.sender {
            Sender::User => style("you".to_string()).dim().bold(),
            Sender::Bot => action_label(message.action),
        };
        format!("  {label}\n{}", self.render_markdown(&message.text))
    }
}

fn action_label(action: Option<ActionTag>) -> StyledObject<String> {
    let text = match action {
        Some(tag) => format!("curdmate ({tag})"),
        None => "curdmate".to_string(),
    };
    let styled = style(text).bold();
    match action {
        Some(ActionTag::Error) => styled.red(),
        Some(ActionTag::Cancel) => styled.yellow(),
        Some(ActionTag::Delete) => styled.magenta(),
        Some(ActionTag::Create | ActionTag::Update) => styled.green(),
        _ => styled.cyan(),
    }
}
