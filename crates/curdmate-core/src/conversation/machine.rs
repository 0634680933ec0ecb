//! The conversation engine: one `(state, input) -> (state, reply)` step per
//! user message.
//!
//! Handlers return an [`Outcome`] that either replaces the state or leaves it
//! unchanged. Any [`TurnError`] is caught in [`ConversationEngine::step`],
//! turned into an error reply, and forces the state back to idle.

use std::sync::Arc;

use tracing::{debug, warn};

use curdmate_observe::attrs;
use curdmate_types::conversation::{ConversationState, FieldValue, Mode, Reply, Trigger};
use curdmate_types::error::RecordApiError;
use curdmate_types::record::{NewRecord, RecordField, RecordId, RecordPatch};
use curdmate_types::transcript::ActionTag;

use super::confirm::{self, Gate};
use super::flow::{self, KEY_FIELD, KEY_RECORD_ID, StepInput};
use super::{HELP_TEXT, SESSION_EXPIRED_TEXT, TurnError, failure_text};
use crate::executor::{CommandExecutor, Dispatch, ReadQuery};
use crate::intent::keyword::match_keyword;
use crate::intent::nlp::{IntentResolver, detect_direct_lookup};
use crate::record::RecordApi;
use crate::validate;

/// Out-of-band signal raised by a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnSignal {
    /// The record API rejected the session's credential.
    SessionExpired,
}

/// Result of one engine step.
#[derive(Debug)]
pub struct Turn {
    pub state: ConversationState,
    pub reply: Reply,
    pub signal: Option<TurnSignal>,
}

enum Next {
    Unchanged,
    Replace(ConversationState),
}

struct Outcome {
    next: Next,
    reply: Reply,
}

impl Outcome {
    fn stay(reply: Reply) -> Self {
        Self {
            next: Next::Unchanged,
            reply,
        }
    }

    fn to(state: ConversationState, reply: Reply) -> Self {
        Self {
            next: Next::Replace(state),
            reply,
        }
    }

    fn idle(reply: Reply) -> Self {
        Self::to(ConversationState::idle(), reply)
    }
}

fn action_for(mode: Mode) -> ActionTag {
    match mode {
        Mode::Creating => ActionTag::Create,
        Mode::Updating => ActionTag::Update,
        Mode::Deleting => ActionTag::Delete,
        Mode::Searching => ActionTag::Search,
        Mode::Idle | Mode::NlpConfirmation => ActionTag::Response,
    }
}

fn activity(mode: Mode) -> &'static str {
    match mode {
        Mode::Creating => "creating a contact",
        Mode::Updating => "updating a contact",
        Mode::Deleting => "deleting a contact",
        Mode::Searching => "a search",
        Mode::Idle | Mode::NlpConfirmation => "another operation",
    }
}

pub struct ConversationEngine<R> {
    executor: CommandExecutor<R>,
    resolver: Arc<IntentResolver>,
}

impl<R: RecordApi> ConversationEngine<R> {
    pub fn new(executor: CommandExecutor<R>, resolver: Arc<IntentResolver>) -> Self {
        Self { executor, resolver }
    }

    /// Process one user message against `state`.
    ///
    /// Never fails: errors become an error reply plus an idle state.
    #[tracing::instrument(
        name = "conversation.turn",
        skip_all,
        fields(
            conversation.mode = %state.mode,
            conversation.step = state.step,
            conversation.trigger = %trigger,
            intent.action = tracing::field::Empty,
            conversation.next_mode = tracing::field::Empty,
        )
    )]
    pub async fn step(&self, state: &ConversationState, text: &str, trigger: Trigger) -> Turn {
        let turn = match self.dispatch(state, text, trigger).await {
            Ok(Outcome { next, reply }) => Turn {
                state: match next {
                    Next::Unchanged => state.clone(),
                    Next::Replace(s) => s,
                },
                reply,
                signal: None,
            },
            Err(TurnError::Record(RecordApiError::Unauthorized)) => {
                warn!("record API rejected credential, expiring session");
                Turn {
                    state: ConversationState::idle(),
                    reply: Reply::new(SESSION_EXPIRED_TEXT, ActionTag::Error),
                    signal: Some(TurnSignal::SessionExpired),
                }
            }
            Err(e) => {
                warn!(error = %e, "turn failed, resetting to idle");
                Turn {
                    state: ConversationState::idle(),
                    reply: Reply::new(failure_text(&user_message(&e)), ActionTag::Error),
                    signal: None,
                }
            }
        };
        tracing::Span::current().record(
            attrs::CONVERSATION_NEXT_MODE,
            tracing::field::display(turn.state.mode),
        );
        turn
    }

    async fn dispatch(
        &self,
        state: &ConversationState,
        text: &str,
        trigger: Trigger,
    ) -> Result<Outcome, TurnError> {
        match state.mode {
            Mode::Creating | Mode::Updating | Mode::Deleting | Mode::Searching => {
                if trigger == Trigger::QuickAction {
                    return Ok(Outcome::stay(Reply::new(
                        format!(
                            "You're in the middle of {}. Finish it or type **'cancel'** first.\n\n{}",
                            activity(state.mode),
                            flow::prompt_for(state)
                        ),
                        action_for(state.mode),
                    )));
                }
                self.guided(state, text).await
            }
            Mode::NlpConfirmation => self.confirm_pending(state, text).await,
            Mode::Idle => match trigger {
                Trigger::QuickAction => Ok(quick_action(text)),
                Trigger::FreeText => self.free_text(text).await,
            },
        }
    }

    async fn guided(&self, state: &ConversationState, text: &str) -> Result<Outcome, TurnError> {
        let input = text.trim();
        let lowered = input.to_lowercase();
        if lowered == "back" || lowered == "cancel" {
            debug!(mode = %state.mode, "guided flow cancelled");
            return Ok(Outcome::idle(Reply::new(
                flow::cancel_message(state.mode),
                ActionTag::Cancel,
            )));
        }

        let Some(current) = flow::current_step(state) else {
            // Step index past the table: nothing sensible to resume.
            return Ok(Outcome::idle(Reply::new(HELP_TEXT, ActionTag::Help)));
        };

        // Blank input at the confirmation step is a re-prompt, not "required".
        if current.input == StepInput::Confirmation {
            return self.confirm_delete(state, input).await;
        }
        if input.is_empty() || lowered == "skip" {
            return Ok(Outcome::stay(Reply::new(
                flow::required_message(state),
                action_for(state.mode),
            )));
        }

        let tag = action_for(state.mode);
        let reject = |reason: &str| Outcome::stay(Reply::new(flow::rejection_message(reason, state), tag));

        let value = match current.input {
            StepInput::Field(field) => match validate::validate_field(field, input) {
                Ok(v) => v,
                Err(e) => return Ok(reject(&e.reason)),
            },
            StepInput::RecordId => match validate::validate_record_id(input) {
                Ok(id) => FieldValue::Text(id.to_string()),
                Err(e) => return Ok(reject(&e.reason)),
            },
            StepInput::FieldSelection => match lowered.parse::<RecordField>() {
                Ok(field) => FieldValue::Text(field.to_string()),
                Err(_) => {
                    return Ok(reject(
                        "Please choose from: **name**, **email**, **phone**, **age**, or **address**.",
                    ));
                }
            },
            StepInput::NewValue => {
                let field = collected_field(state);
                match field.map(|f| validate::validate_field(f, input)) {
                    Some(Ok(v)) => v,
                    Some(Err(e)) => return Ok(reject(&e.reason)),
                    None => return Ok(Outcome::idle(Reply::new(HELP_TEXT, ActionTag::Help))),
                }
            }
            StepInput::SearchTerm => {
                let reply = self.executor.read(&ReadQuery::from_input(input)).await?;
                return Ok(Outcome::idle(reply));
            }
            StepInput::Confirmation => return self.confirm_delete(state, input).await,
        };

        let mut next = state.clone();
        next.collected.insert(current.key.to_string(), value);
        next.step += 1;

        if next.step < flow::flow_for(next.mode).len() {
            let prompt = flow::prompt_for(&next);
            return Ok(Outcome::to(next, Reply::new(prompt, tag)));
        }

        // Flow complete: exactly one backend call, then idle.
        let reply = match next.mode {
            Mode::Creating => self.executor.create(&new_record(&next)).await?,
            Mode::Updating => match update_args(&next) {
                Some((id, patch)) => self.executor.update(&id, &patch).await?,
                None => Reply::new(HELP_TEXT, ActionTag::Help),
            },
            _ => Reply::new(HELP_TEXT, ActionTag::Help),
        };
        Ok(Outcome::idle(reply))
    }

    async fn confirm_delete(&self, state: &ConversationState, input: &str) -> Result<Outcome, TurnError> {
        let Some(id) = collected_record_id(state) else {
            return Ok(Outcome::idle(Reply::new(HELP_TEXT, ActionTag::Help)));
        };
        match confirm::guided(id, input) {
            Gate::Proceed(confirmed) => {
                let reply = self.executor.delete(confirmed).await?;
                Ok(Outcome::idle(reply))
            }
            Gate::Cancel => Ok(Outcome::idle(Reply::new(
                "Good choice! Contact deletion cancelled. The contact is safe!\n\nWhat else can I help you with?",
                ActionTag::Cancel,
            ))),
            Gate::Reprompt => Ok(Outcome::stay(Reply::new(
                "Please type **'yes'** to confirm deletion or **'no'** to cancel.",
                ActionTag::Delete,
            ))),
        }
    }

    async fn confirm_pending(&self, state: &ConversationState, text: &str) -> Result<Outcome, TurnError> {
        let Some(pending) = state.pending.clone() else {
            return Ok(Outcome::idle(Reply::new(HELP_TEXT, ActionTag::Help)));
        };
        match confirm::free_text(pending, text) {
            Gate::Proceed(confirmed) => {
                let reply = self.executor.dispatch_confirmed(confirmed, text).await?;
                Ok(Outcome::idle(reply))
            }
            Gate::Cancel => Ok(Outcome::idle(Reply::new(
                "Operation cancelled. No problem! What else would you like to do?",
                ActionTag::Cancel,
            ))),
            Gate::Reprompt => Ok(Outcome::stay(Reply::new(
                "I didn't catch that. Reply **'yes'** to go ahead or **'no'** to cancel.",
                ActionTag::Response,
            ))),
        }
    }

    async fn free_text(&self, text: &str) -> Result<Outcome, TurnError> {
        if text.trim().is_empty() {
            return Ok(Outcome::stay(Reply::new(HELP_TEXT, ActionTag::Help)));
        }
        if let Some(id) = detect_direct_lookup(text) {
            debug!(record.id = %id, "direct lookup, skipping completion service");
            let reply = self.executor.read(&ReadQuery::ById(id)).await?;
            return Ok(Outcome::idle(reply));
        }

        let intent = self.resolver.resolve(text).await?;
        tracing::Span::current().record(attrs::INTENT_ACTION, tracing::field::display(intent.action));

        match self.executor.dispatch(&intent, text).await? {
            Dispatch::Done(reply) => Ok(Outcome::idle(reply)),
            Dispatch::NeedsConfirmation { intent, prompt } => Ok(Outcome::to(
                ConversationState::awaiting_confirmation(intent),
                prompt,
            )),
        }
    }
}

/// Idle quick action: keyword routing, help text when nothing matches.
fn quick_action(text: &str) -> Outcome {
    match match_keyword(text) {
        Some(mode) => {
            let state = ConversationState::enter(mode, Trigger::QuickAction);
            let prompt = flow::prompt_for(&state);
            Outcome::to(state, Reply::new(prompt, action_for(mode)))
        }
        None => Outcome::stay(Reply::new(HELP_TEXT, ActionTag::Help)),
    }
}

fn user_message(err: &TurnError) -> String {
    match err {
        TurnError::Record(e) => e.user_message(),
        TurnError::Llm(e) => e.to_string(),
    }
}

fn collected_text<'a>(state: &'a ConversationState, key: &str) -> Option<&'a str> {
    state.collected.get(key).and_then(FieldValue::as_text)
}

fn collected_record_id(state: &ConversationState) -> Option<RecordId> {
    collected_text(state, KEY_RECORD_ID).and_then(RecordId::parse)
}

fn collected_field(state: &ConversationState) -> Option<RecordField> {
    collected_text(state, KEY_FIELD).and_then(|f| f.parse().ok())
}

fn new_record(state: &ConversationState) -> NewRecord {
    let text = |key: &str| collected_text(state, key).map(str::to_string);
    NewRecord {
        name: text("name").unwrap_or_default(),
        email: text("email"),
        phone: text("phone"),
        age: state.collected.get("age").and_then(FieldValue::as_number),
        address: text("address"),
    }
}

fn update_args(state: &ConversationState) -> Option<(RecordId, RecordPatch)> {
    let id = collected_record_id(state)?;
    let field = collected_field(state)?;
    let value = state.collected.get("new_value")?;
    let mut patch = RecordPatch::default();
    match field {
        RecordField::Name => patch.name = value.as_text().map(str::to_string),
        RecordField::Email => patch.email = value.as_text().map(str::to_string),
        RecordField::Phone => patch.phone = value.as_text().map(str::to_string),
        RecordField::Age => patch.age = value.as_number(),
        RecordField::Address => patch.address = value.as_text().map(str::to_string),
    }
    Some((id, patch))
}
