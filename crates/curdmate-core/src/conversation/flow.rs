//! Static step tables for the guided flows, plus the prompt and
//! acknowledgement texts tied to them.

use curdmate_types::conversation::{ConversationState, Mode};
use curdmate_types::record::RecordField;

/// What a guided step expects from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepInput {
    /// A record field, checked by that field's validator.
    Field(RecordField),
    RecordId,
    /// One of the editable field names.
    FieldSelection,
    /// A value for the field chosen at the previous step.
    NewValue,
    /// Explicit yes/no.
    Confirmation,
    SearchTerm,
}

/// One step of a guided flow.
#[derive(Debug)]
pub struct FieldSpec {
    /// Key under which the validated value is collected.
    pub key: &'static str,
    /// How the value is referred to in "this field is required" replies.
    pub label: &'static str,
    pub input: StepInput,
    pub prompt: &'static str,
}

pub const KEY_RECORD_ID: &str = "record_id";
pub const KEY_FIELD: &str = "field";

pub static CREATE_FLOW: [FieldSpec; 5] = [
    FieldSpec {
        key: "name",
        label: "name",
        input: StepInput::Field(RecordField::Name),
        prompt: "Let's create a new contact! What's their full name?",
    },
    FieldSpec {
        key: "email",
        label: "email",
        input: StepInput::Field(RecordField::Email),
        prompt: "Great! What's their email address?",
    },
    FieldSpec {
        key: "phone",
        label: "phone",
        input: StepInput::Field(RecordField::Phone),
        prompt: "Perfect! What's their phone number? (10 digits)",
    },
    FieldSpec {
        key: "age",
        label: "age",
        input: StepInput::Field(RecordField::Age),
        prompt: "Almost done! How old are they? (1-120)",
    },
    FieldSpec {
        key: "address",
        label: "address",
        input: StepInput::Field(RecordField::Address),
        prompt: "Finally, what's their address?",
    },
];

pub static UPDATE_FLOW: [FieldSpec; 3] = [
    FieldSpec {
        key: KEY_RECORD_ID,
        label: "contact ID",
        input: StepInput::RecordId,
        prompt: "Let's update a contact! Please provide the Contact ID (24-character code).",
    },
    FieldSpec {
        key: KEY_FIELD,
        label: "field name",
        input: StepInput::FieldSelection,
        prompt: "Which field would you like to update?\n\n\
                 • **name** - Their name\n\
                 • **email** - Their email\n\
                 • **phone** - Their phone number\n\
                 • **age** - Their age\n\
                 • **address** - Their address\n\n\
                 What would you like to update?",
    },
    FieldSpec {
        key: "new_value",
        label: "new value",
        input: StepInput::NewValue,
        // Rendered with the chosen field by `prompt_for`.
        prompt: "What's the new value for this field?",
    },
];

pub static DELETE_FLOW: [FieldSpec; 2] = [
    FieldSpec {
        key: KEY_RECORD_ID,
        label: "contact ID",
        input: StepInput::RecordId,
        prompt: "Delete mode activated! This action is permanent.\n\n\
                 Please provide the 24-character Contact ID of the contact you want to remove.\n\n\
                 I'll guide you safely through the deletion process.",
    },
    FieldSpec {
        key: "confirmation",
        label: "confirmation",
        input: StepInput::Confirmation,
        // Rendered with the pending id by `prompt_for`.
        prompt: "Type **'yes'** to confirm deletion or **'no'** to cancel.",
    },
];

pub static SEARCH_FLOW: [FieldSpec; 1] = [FieldSpec {
    key: "term",
    label: "search term",
    input: StepInput::SearchTerm,
    prompt: "Let's find a contact! What should I search for?\n\n\
             • Type **all** to list your contacts\n\
             • Paste a Contact ID\n\
             • Enter an email address or a name",
}];

/// The step table for `mode`. Empty for modes without a guided flow.
pub fn flow_for(mode: Mode) -> &'static [FieldSpec] {
    match mode {
        Mode::Creating => &CREATE_FLOW,
        Mode::Updating => &UPDATE_FLOW,
        Mode::Deleting => &DELETE_FLOW,
        Mode::Searching => &SEARCH_FLOW,
        Mode::Idle | Mode::NlpConfirmation => &[],
    }
}

/// The step the state is currently waiting on.
pub fn current_step(state: &ConversationState) -> Option<&'static FieldSpec> {
    flow_for(state.mode).get(state.step)
}

/// The prompt for the state's current step, filled in with collected values.
///
/// Entering a step and rejecting input at that step both emit this text, so
/// a rejected value always re-shows the identical prompt.
pub fn prompt_for(state: &ConversationState) -> String {
    let Some(current) = current_step(state) else {
        return String::new();
    };
    let collected = |key: &str| state.collected.get(key).map(|v| v.to_string());
    match current.input {
        StepInput::NewValue => match collected(KEY_FIELD) {
            Some(field) => format!("What's the new **{field}** value?"),
            None => current.prompt.to_string(),
        },
        StepInput::Confirmation => {
            let id = collected(KEY_RECORD_ID).unwrap_or_default();
            format!(
                "**Delete Confirmation Required**\n\n\
                 You want to delete contact: **{id}**\n\n\
                 This action is **permanent** and cannot be undone.\n\n\
                 {}\n\nAre you sure?",
                current.prompt
            )
        }
        _ => current.prompt.to_string(),
    }
}

/// Acknowledgement for leaving a flow with `back` or `cancel`.
pub fn cancel_message(mode: Mode) -> &'static str {
    match mode {
        Mode::Creating => "Contact creation cancelled. No worries!\n\nWhat else can I help you with?",
        Mode::Updating => "Contact update cancelled. No worries!\n\nWhat else can I help you with?",
        Mode::Deleting => "Deletion cancelled. The contact is safe!\n\nWhat else can I help you with?",
        Mode::Searching => "Search cancelled. What else can I help you with?",
        Mode::Idle | Mode::NlpConfirmation => "Operation cancelled. What else can I help you with?",
    }
}

/// Reply for blank input (or `skip`) at a guided step.
pub fn required_message(state: &ConversationState) -> String {
    let label = current_step(state).map(|s| s.label).unwrap_or("value");
    format!(
        "This field is required! I need the {label} to continue.\n\n{}",
        prompt_for(state)
    )
}

/// Reply for a rejected value: the reason, then the unchanged prompt.
pub fn rejection_message(reason: &str, state: &ConversationState) -> String {
    format!("{reason}\n\n{}", prompt_for(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use curdmate_types::conversation::{FieldValue, Trigger};

    #[test]
    fn test_flow_lengths_match_mode_step_counts() {
        for mode in [Mode::Creating, Mode::Updating, Mode::Deleting, Mode::Searching] {
            assert_eq!(Some(flow_for(mode).len()), mode.step_count(), "{mode}");
        }
        assert!(flow_for(Mode::Idle).is_empty());
    }

    #[test]
    fn test_create_flow_field_order() {
        let keys: Vec<&str> = CREATE_FLOW.iter().map(|s| s.key).collect();
        assert_eq!(keys, ["name", "email", "phone", "age", "address"]);
    }

    #[test]
    fn test_new_value_prompt_names_field() {
        let mut state = ConversationState::enter(Mode::Updating, Trigger::QuickAction);
        state.step = 2;
        state
            .collected
            .insert(KEY_FIELD.to_string(), FieldValue::Text("email".to_string()));
        assert_eq!(prompt_for(&state), "What's the new **email** value?");
    }

    #[test]
    fn test_delete_confirmation_prompt_shows_id() {
        let mut state = ConversationState::enter(Mode::Deleting, Trigger::QuickAction);
        state.step = 1;
        state.collected.insert(
            KEY_RECORD_ID.to_string(),
            FieldValue::Text("507f1f77bcf86cd799439011".to_string()),
        );
        let prompt = prompt_for(&state);
        assert!(prompt.contains("**507f1f77bcf86cd799439011**"));
        assert!(prompt.contains("'yes'"));
    }

    #[test]
    fn test_rejection_ends_with_prompt() {
        let state = ConversationState::enter(Mode::Creating, Trigger::QuickAction);
        let msg = rejection_message("Name can only contain letters and spaces.", &state);
        assert!(msg.ends_with(CREATE_FLOW[0].prompt));
    }

    #[test]
    fn test_required_message_uses_label() {
        let state = ConversationState::enter(Mode::Searching, Trigger::QuickAction);
        assert!(required_message(&state).starts_with("This field is required! I need the search term"));
    }

    #[test]
    fn test_idle_has_no_prompt() {
        assert!(prompt_for(&ConversationState::idle()).is_empty());
    }
}
