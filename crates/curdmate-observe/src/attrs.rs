//! Span attribute names recorded by the conversation engine and adapters.
//!
//! Fields declared in `#[tracing::instrument(fields(...))]` use these exact
//! dotted names; code filling them later with `Span::record` refers to the
//! constants.

// --- Conversation ---

/// Mode the turn started in (e.g. "creating").
pub const CONVERSATION_MODE: &str = "conversation.mode";

/// Step index within the active guided flow.
pub const CONVERSATION_STEP: &str = "conversation.step";

/// "quick_action" or "free_text".
pub const CONVERSATION_TRIGGER: &str = "conversation.trigger";

/// Mode the turn ended in.
pub const CONVERSATION_NEXT_MODE: &str = "conversation.next_mode";

// --- Intent resolution ---

/// Action the completion service resolved (e.g. "delete").
pub const INTENT_ACTION: &str = "intent.action";

/// Model used for intent resolution.
pub const NLP_MODEL: &str = "nlp.model";

// --- Record API ---

pub const RECORD_ID: &str = "record.id";

// --- Sessions ---

pub const SESSION_ID: &str = "session.id";
