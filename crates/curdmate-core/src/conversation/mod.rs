//! Conversation state machine: guided flows, confirmation, and turn dispatch.

pub mod confirm;
pub mod flow;
pub mod machine;

use curdmate_types::error::RecordApiError;
use curdmate_types::llm::LlmError;

/// A failure inside one turn that the engine converts into an error reply.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error(transparent)]
    Record(#[from] RecordApiError),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

pub const WELCOME_TEXT: &str = "Hi! I'm your contact assistant. I can help you:\n\n\
    • **Create** new contacts\n\
    • **Search** existing contacts\n\
    • **Update** contact details\n\
    • **Delete** contacts\n\n\
    Use the quick actions for step-by-step guidance, or just tell me what you need:\n\
    • \"Add John with email john@example.com and phone 9876543210\"\n\
    • \"Show all contacts\"\n\
    • \"Delete contact 507f1f77bcf86cd799439011\"\n\n\
    What would you like to do?";

pub const HELP_TEXT: &str = "I'm here to help with your contacts! You can:\n\n\
    • Create new contacts\n\
    • Search existing contacts\n\
    • Update contact information\n\
    • Delete contacts\n\n\
    What would you like to do?";

pub const GREETING_TEXT: &str =
    "Hello! I can create, find, update or delete contacts for you. What would you like to do?";

pub const FALLBACK_TEXT: &str = "I'm not sure what you'd like me to do. Try something like \
    \"show all contacts\" or \"add Jane with phone 9876543210\", or use the quick actions.";

pub const CANCELLED_TEXT: &str = "Operation cancelled. What else can I help you with?";

pub const SESSION_EXPIRED_TEXT: &str = "Session expired. Please login again.";

/// Error reply body for a failed turn.
pub fn failure_text(message: &str) -> String {
    format!(
        "Oops! Something went wrong:\n\n{message}\n\nPlease try again, or use the quick actions for step-by-step help."
    )
}
