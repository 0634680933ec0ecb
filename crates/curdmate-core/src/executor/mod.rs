//! Command executor: turns a completed flow or a resolved intent into exactly
//! one record API call and renders the outcome.
//!
//! Not-found, duplicate and rejected payloads are ordinary replies.
//! Transport, status and credential failures propagate as [`TurnError`] for
//! the engine to handle. Nothing is retried.

pub mod render;

use std::sync::Arc;

use tracing::{debug, info};

use curdmate_types::conversation::Reply;
use curdmate_types::error::{RecordApiError, ValidationError};
use curdmate_types::intent::{Intent, IntentAction};
use curdmate_types::record::{NewRecord, RecordField, RecordId, RecordPatch, RecordQuery, SearchTerm};
use curdmate_types::transcript::ActionTag;

use crate::conversation::confirm::Confirmed;
use crate::conversation::{FALLBACK_TEXT, GREETING_TEXT, HELP_TEXT, TurnError};
use crate::record::RecordApi;
use crate::validate;

/// What to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadQuery {
    All,
    ById(RecordId),
    Search(SearchTerm),
}

impl ReadQuery {
    /// Classify a free-form search input: `all`, a record id, an email, or a name.
    pub fn from_input(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return ReadQuery::All;
        }
        if let Some(id) = RecordId::parse(trimmed) {
            return ReadQuery::ById(id);
        }
        let term = trimmed.to_lowercase();
        if validate::looks_like_email(&term) {
            ReadQuery::Search(SearchTerm::Email(term))
        } else {
            ReadQuery::Search(SearchTerm::Name(term))
        }
    }
}

/// A validated, ready-to-run operation derived from an intent.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    Create(NewRecord),
    Read(ReadQuery),
    Update(RecordId, RecordPatch),
    Delete(RecordId),
    Chat,
}

/// Result of dispatching an unconfirmed intent.
#[derive(Debug)]
pub enum Dispatch {
    Done(Reply),
    /// The intent must pass the confirmation gate first.
    NeedsConfirmation { intent: Intent, prompt: Reply },
}

pub struct CommandExecutor<R> {
    api: Arc<R>,
    page_size: u32,
}

impl<R: RecordApi> CommandExecutor<R> {
    pub fn new(api: Arc<R>, page_size: u32) -> Self {
        Self { api, page_size }
    }

    #[tracing::instrument(name = "record.create", skip_all)]
    pub async fn create(&self, record: &NewRecord) -> Result<Reply, TurnError> {
        match self.api.create(record).await {
            Ok(stored) => {
                info!(record.id = %stored.id, "record created");
                Ok(Reply::new(render::created(record, &stored.id), ActionTag::Create))
            }
            Err(e) => Self::soft_failure("Create", e),
        }
    }

    #[tracing::instrument(name = "record.read", skip(self))]
    pub async fn read(&self, query: &ReadQuery) -> Result<Reply, TurnError> {
        let text = match query {
            ReadQuery::All => {
                let page = self.api.list(&RecordQuery::all(self.page_size)).await?;
                info!(count = page.data.len(), "records listed");
                if page.data.is_empty() {
                    render::no_records()
                } else {
                    render::record_list(&page.data, None)
                }
            }
            ReadQuery::ById(id) => match self.api.get(id).await {
                Ok(record) => render::record_list(std::slice::from_ref(&record), None),
                Err(RecordApiError::NotFound) => {
                    debug!(record.id = %id, "record not found");
                    render::not_found(id)
                }
                Err(e) => return Err(e.into()),
            },
            ReadQuery::Search(term) => {
                let query = RecordQuery::search(term.clone(), self.page_size);
                let page = self.api.list(&query).await?;
                info!(count = page.data.len(), "records searched");
                if page.data.is_empty() {
                    render::no_matches(term.as_str())
                } else {
                    render::record_list(&page.data, Some(term.as_str()))
                }
            }
        };
        Ok(Reply::new(text, ActionTag::Search))
    }

    #[tracing::instrument(name = "record.update", skip(self, patch), fields(record.id = %id))]
    pub async fn update(&self, id: &RecordId, patch: &RecordPatch) -> Result<Reply, TurnError> {
        match self.api.update(id, patch).await {
            Ok(()) => {
                info!("record updated");
                Ok(Reply::new(render::updated(id, patch), ActionTag::Update))
            }
            Err(RecordApiError::NotFound) => Ok(Reply::new(render::not_found(id), ActionTag::Update)),
            Err(e) => Self::soft_failure("Update", e),
        }
    }

    /// Delete a record the user explicitly confirmed.
    #[tracing::instrument(name = "record.delete", skip_all, fields(record.id = %id.get()))]
    pub async fn delete(&self, id: Confirmed<RecordId>) -> Result<Reply, TurnError> {
        let id = id.into_inner();
        match self.api.delete(&id).await {
            Ok(()) => {
                info!("record deleted");
                Ok(Reply::new(render::deleted(&id), ActionTag::Delete))
            }
            Err(RecordApiError::NotFound) => Ok(Reply::new(render::not_found(&id), ActionTag::Delete)),
            Err(e) => Self::soft_failure("Delete", e),
        }
    }

    /// Run an intent from the NLP path.
    ///
    /// Deletes, and anything the resolver flagged, come back as
    /// `NeedsConfirmation` without touching the record API.
    pub async fn dispatch(&self, intent: &Intent, message: &str) -> Result<Dispatch, TurnError> {
        let plan = match plan(intent) {
            Ok(plan) => plan,
            Err(reply) => return Ok(Dispatch::Done(reply)),
        };
        if matches!(plan, Plan::Delete(_)) || (intent.need_confirmation && plan != Plan::Chat) {
            debug!(action = %intent.action, "intent held for confirmation");
            return Ok(Dispatch::NeedsConfirmation {
                intent: intent.clone(),
                prompt: Reply::new(confirmation_prompt(&plan), ActionTag::Response),
            });
        }
        self.run(plan, message).await.map(Dispatch::Done)
    }

    /// Run an intent that passed the confirmation gate.
    pub async fn dispatch_confirmed(
        &self,
        intent: Confirmed<Intent>,
        message: &str,
    ) -> Result<Reply, TurnError> {
        let plan = match plan(intent.get()) {
            Ok(plan) => plan,
            Err(reply) => return Ok(reply),
        };
        match plan {
            Plan::Delete(id) => self.delete(intent.map(|_| id)).await,
            other => self.run(other, message).await,
        }
    }

    async fn run(&self, plan: Plan, message: &str) -> Result<Reply, TurnError> {
        match plan {
            Plan::Create(record) => self.create(&record).await,
            Plan::Read(query) => self.read(&query).await,
            Plan::Update(id, patch) => self.update(&id, &patch).await,
            Plan::Chat => Ok(conversation_reply(message)),
            // Deletes only run through `dispatch_confirmed`.
            Plan::Delete(_) => Ok(Reply::new(confirmation_prompt(&plan), ActionTag::Response)),
        }
    }

    /// Duplicate and rejected payloads become failure replies; everything
    /// else propagates.
    fn soft_failure(operation: &str, err: RecordApiError) -> Result<Reply, TurnError> {
        match err {
            RecordApiError::Conflict(msg) => Ok(Reply::new(render::duplicate(&msg), ActionTag::Error)),
            RecordApiError::Rejected(msg) => {
                Ok(Reply::new(render::rejected(operation, &msg), ActionTag::Error))
            }
            other => Err(other.into()),
        }
    }
}

/// Validate an intent's data into a [`Plan`].
///
/// Missing or invalid data yields the reply to show instead; no backend call
/// is made for it.
pub fn plan(intent: &Intent) -> Result<Plan, Reply> {
    match intent.action {
        IntentAction::Create => plan_create(intent),
        IntentAction::Read => Ok(Plan::Read(plan_read(intent))),
        IntentAction::Update => plan_update(intent),
        IntentAction::Delete => {
            let id = plan_record_id(intent, "delete")?;
            Ok(Plan::Delete(id))
        }
        IntentAction::Conversation => Ok(Plan::Chat),
    }
}

fn invalid(err: ValidationError, action: ActionTag) -> Reply {
    Reply::new(
        format!(
            "I couldn't use the {} you gave me. {}\n\nPlease try again with a corrected value.",
            err.field, err.reason
        ),
        action,
    )
}

fn plan_create(intent: &Intent) -> Result<Plan, Reply> {
    let tag = ActionTag::Create;
    let Some(raw_name) = intent.text("name") else {
        return Err(Reply::new(
            "I need at least a **name** to create a contact.\n\n\
             Try: \"Add John with email john@example.com and phone 9876543210\"",
            tag,
        ));
    };
    let name = validate::validate_name(&raw_name).map_err(|e| invalid(e, tag))?;
    let email = intent
        .text("email")
        .map(|v| validate::validate_email(&v))
        .transpose()
        .map_err(|e| invalid(e, tag))?;
    let phone = intent
        .text("phone")
        .map(|v| validate::validate_prefixed_phone(&v))
        .transpose()
        .map_err(|e| invalid(e, tag))?;
    let age = intent
        .text("age")
        .map(|v| validate::validate_age(&v))
        .transpose()
        .map_err(|e| invalid(e, tag))?;
    let address = intent
        .text("address")
        .map(|v| validate::validate_address(&v))
        .transpose()
        .map_err(|e| invalid(e, tag))?;
    Ok(Plan::Create(NewRecord {
        name,
        email,
        phone,
        age,
        address,
    }))
}

fn plan_read(intent: &Intent) -> ReadQuery {
    if let Some(id) = intent.record_id_text().and_then(|raw| RecordId::parse(&raw)) {
        return ReadQuery::ById(id);
    }
    match intent.first_text(&["search", "query", "email", "name"]) {
        Some(term) => ReadQuery::from_input(&term),
        None => ReadQuery::All,
    }
}

fn plan_record_id(intent: &Intent, verb: &str) -> Result<RecordId, Reply> {
    let tag = if verb == "delete" {
        ActionTag::Delete
    } else {
        ActionTag::Update
    };
    intent
        .record_id_text()
        .and_then(|raw| RecordId::parse(&raw))
        .ok_or_else(|| {
            Reply::new(
                format!(
                    "I need a valid 24-character Contact ID to {verb} a contact.\n\n\
                     Example: \"{verb} contact 507f1f77bcf86cd799439011\""
                ),
                tag,
            )
        })
}

fn plan_update(intent: &Intent) -> Result<Plan, Reply> {
    let tag = ActionTag::Update;
    let id = plan_record_id(intent, "update")?;

    let mut patch = RecordPatch::default();
    let mut apply = |field: RecordField, raw: &str| -> Result<(), Reply> {
        match field {
            RecordField::Name => patch.name = Some(validate::validate_name(raw).map_err(|e| invalid(e, tag))?),
            RecordField::Email => patch.email = Some(validate::validate_email(raw).map_err(|e| invalid(e, tag))?),
            RecordField::Phone => {
                patch.phone = Some(validate::validate_prefixed_phone(raw).map_err(|e| invalid(e, tag))?)
            }
            RecordField::Age => patch.age = Some(validate::validate_age(raw).map_err(|e| invalid(e, tag))?),
            RecordField::Address => {
                patch.address = Some(validate::validate_address(raw).map_err(|e| invalid(e, tag))?)
            }
        }
        Ok(())
    };

    for field in RecordField::ALL {
        if let Some(raw) = intent.text(field.as_str()) {
            apply(field, &raw)?;
        }
    }
    // Single-field shape: {"field": "email", "new_value": "..."}
    if let (Some(field), Some(raw)) = (
        intent.text("field").and_then(|f| f.parse::<RecordField>().ok()),
        intent.first_text(&["new_value", "value"]),
    ) {
        apply(field, &raw)?;
    }

    if patch.is_empty() {
        return Err(Reply::new(
            "Tell me which field to change (name, email, phone, age or address) and its new value.\n\n\
             Example: \"Update contact 507f1f77bcf86cd799439011 email to jane@example.com\"",
            tag,
        ));
    }
    Ok(Plan::Update(id, patch))
}

/// Prompt shown when a plan is held at the confirmation gate.
pub fn confirmation_prompt(plan: &Plan) -> String {
    let what = match plan {
        Plan::Delete(id) => {
            return format!(
                "**Delete Confirmation Required**\n\n\
                 You want to delete contact: **{id}**\n\n\
                 This action is **permanent** and cannot be undone.\n\n\
                 Type **'yes'** to confirm or **'no'** to cancel."
            );
        }
        Plan::Create(record) => format!("create a contact named **{}**", record.name),
        Plan::Update(id, patch) => {
            let fields: Vec<String> = patch.changes().iter().map(|(f, v)| format!("{f} = {v}")).collect();
            format!("update contact **{id}** ({})", fields.join(", "))
        }
        Plan::Read(_) => "look up contacts".to_string(),
        Plan::Chat => "continue".to_string(),
    };
    format!("**Confirmation Required**\n\nI'm about to {what}.\n\nType **'yes'** to confirm or **'no'** to cancel.")
}

/// Reply for a `conversation` intent, keyed off the user's own words.
pub fn conversation_reply(message: &str) -> Reply {
    let lowered = message.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let text = if words.iter().any(|w| matches!(*w, "hello" | "hi" | "hey")) {
        GREETING_TEXT
    } else if words.contains(&"help") {
        HELP_TEXT
    } else {
        FALLBACK_TEXT
    };
    Reply::new(text, ActionTag::Conversation)
}
