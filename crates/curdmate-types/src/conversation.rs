//! Conversation state types.
//!
//! `ConversationState` is the single value threaded through the conversation
//! engine each turn. It is plain data: the transition logic lives in
//! curdmate-core.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::intent::Intent;
use crate::transcript::ActionTag;

/// The active mode of a conversation. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Idle,
    Creating,
    Updating,
    Deleting,
    Searching,
    NlpConfirmation,
}

impl Mode {
    /// Number of steps in the guided flow for this mode, if it has one.
    ///
    /// Deleting counts its confirmation step.
    pub fn step_count(&self) -> Option<usize> {
        match self {
            Mode::Creating => Some(5),
            Mode::Updating => Some(3),
            Mode::Deleting => Some(2),
            Mode::Searching => Some(1),
            Mode::Idle | Mode::NlpConfirmation => None,
        }
    }

    /// Whether this mode is one of the step-by-step guided flows.
    pub fn is_guided(&self) -> bool {
        self.step_count().is_some()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Idle => write!(f, "idle"),
            Mode::Creating => write!(f, "creating"),
            Mode::Updating => write!(f, "updating"),
            Mode::Deleting => write!(f, "deleting"),
            Mode::Searching => write!(f, "searching"),
            Mode::NlpConfirmation => write!(f, "nlp_confirmation"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "idle" => Ok(Mode::Idle),
            "creating" => Ok(Mode::Creating),
            "updating" => Ok(Mode::Updating),
            "deleting" => Ok(Mode::Deleting),
            "searching" => Ok(Mode::Searching),
            "nlp_confirmation" => Ok(Mode::NlpConfirmation),
            other => Err(format!("invalid conversation mode: '{other}'")),
        }
    }
}

/// How a submission reached the engine.
///
/// Quick actions are the deterministic buttons (or slash commands); free text
/// is anything the user typed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    QuickAction,
    #[default]
    FreeText,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::QuickAction => write!(f, "quick_action"),
            Trigger::FreeText => write!(f, "free_text"),
        }
    }
}

impl FromStr for Trigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quick_action" => Ok(Trigger::QuickAction),
            "free_text" => Ok(Trigger::FreeText),
            other => Err(format!("invalid trigger: '{other}'")),
        }
    }
}

/// A validated value collected during a guided flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(u32),
    Text(String),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<u32> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// Conversation state for one chat session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub mode: Mode,
    /// Index into the active flow's steps. Zero outside guided flows.
    pub step: usize,
    /// Validated values keyed by field (or step) name.
    #[serde(default)]
    pub collected: BTreeMap<String, FieldValue>,
    /// Intent awaiting explicit confirmation. Set only in `NlpConfirmation`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<Intent>,
    /// Which trigger entered the current mode.
    #[serde(default)]
    pub entered_via: Trigger,
}

impl ConversationState {
    /// The initial (and end-of-cycle) state.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Fresh state at step 0 of `mode`.
    pub fn enter(mode: Mode, via: Trigger) -> Self {
        Self {
            mode,
            entered_via: via,
            ..Self::default()
        }
    }

    /// State awaiting confirmation of `intent`.
    pub fn awaiting_confirmation(intent: Intent) -> Self {
        Self {
            mode: Mode::NlpConfirmation,
            pending: Some(intent),
            ..Self::default()
        }
    }

    pub fn is_idle(&self) -> bool {
        self.mode == Mode::Idle
    }

    /// Progress indicator for the active operation, `None` when idle.
    pub fn progress(&self) -> Option<Progress> {
        let (title, label, percent) = match self.mode {
            Mode::Idle => return None,
            Mode::Creating | Mode::Updating => {
                let total = self.mode.step_count().unwrap_or(1);
                let current = (self.step + 1).min(total);
                let title = if self.mode == Mode::Creating {
                    "Creating record"
                } else {
                    "Updating record"
                };
                (
                    title,
                    Some(format!("step {current}/{total}")),
                    (current * 100 / total) as u8,
                )
            }
            Mode::Deleting => {
                let percent = if self.step == 0 { 50 } else { 75 };
                ("Deleting record", None, percent)
            }
            Mode::Searching => ("Searching records", None, 75),
            Mode::NlpConfirmation => ("Awaiting confirmation", None, 90),
        };
        Some(Progress {
            title: title.to_string(),
            step_label: label,
            percent,
        })
    }

    /// One-line status summary, e.g. "Creating record - step 2/5".
    pub fn status_line(&self) -> String {
        match self.progress() {
            None => "Ready to help".to_string(),
            Some(Progress {
                title,
                step_label: Some(label),
                ..
            }) => format!("{title} - {label}"),
            Some(p) => p.title,
        }
    }

    /// Placeholder text for the input box in the current mode.
    pub fn input_hint(&self) -> &'static str {
        match self.mode {
            Mode::Idle => "Type a message or pick a quick action...",
            Mode::Creating => "Enter the requested detail (or 'cancel')...",
            Mode::Updating => "Enter the requested value (or 'cancel')...",
            Mode::Deleting if self.step > 0 => "Type 'yes' to delete or 'no' to keep it...",
            Mode::Deleting => "Enter the record id (or 'cancel')...",
            Mode::Searching => "Enter 'all', an id, an email or a name...",
            Mode::NlpConfirmation => "Type 'yes' to confirm or 'no' to cancel...",
        }
    }
}

/// Progress of the active operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_label: Option<String>,
    /// 0..=100
    pub percent: u8,
}

/// A bot reply produced by one engine turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    pub action: ActionTag,
}

impl Reply {
    pub fn new(text: impl Into<String>, action: ActionTag) -> Self {
        Self {
            text: text.into(),
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_roundtrip() {
        for mode in [
            Mode::Idle,
            Mode::Creating,
            Mode::Updating,
            Mode::Deleting,
            Mode::Searching,
            Mode::NlpConfirmation,
        ] {
            let parsed: Mode = mode.to_string().parse().unwrap();
            assert_eq!(mode, parsed);
        }
    }

    #[test]
    fn test_mode_serde_snake_case() {
        let json = serde_json::to_string(&Mode::NlpConfirmation).unwrap();
        assert_eq!(json, "\"nlp_confirmation\"");
    }

    #[test]
    fn test_trigger_default_is_free_text() {
        assert_eq!(Trigger::default(), Trigger::FreeText);
        let parsed: Trigger = "quick_action".parse().unwrap();
        assert_eq!(parsed, Trigger::QuickAction);
    }

    #[test]
    fn test_field_value_untagged() {
        let n: FieldValue = serde_json::from_str("30").unwrap();
        assert_eq!(n, FieldValue::Number(30));
        let t: FieldValue = serde_json::from_str("\"john\"").unwrap();
        assert_eq!(t.as_text(), Some("john"));
    }

    #[test]
    fn test_idle_has_no_progress() {
        let state = ConversationState::idle();
        assert!(state.progress().is_none());
        assert_eq!(state.status_line(), "Ready to help");
    }

    #[test]
    fn test_creating_progress_counts_steps() {
        let mut state = ConversationState::enter(Mode::Creating, Trigger::QuickAction);
        state.step = 1;
        let progress = state.progress().unwrap();
        assert_eq!(progress.step_label.as_deref(), Some("step 2/5"));
        assert_eq!(progress.percent, 40);
        assert_eq!(state.status_line(), "Creating record - step 2/5");
    }

    #[test]
    fn test_deleting_progress_at_confirmation() {
        let mut state = ConversationState::enter(Mode::Deleting, Trigger::QuickAction);
        assert_eq!(state.progress().unwrap().percent, 50);
        state.step = 1;
        assert_eq!(state.progress().unwrap().percent, 75);
        assert_eq!(state.status_line(), "Deleting record");
    }

    #[test]
    fn test_confirmation_hint() {
        let state = ConversationState::awaiting_confirmation(Intent::conversation());
        assert_eq!(state.progress().unwrap().percent, 90);
        assert!(state.input_hint().contains("'yes' to confirm"));
    }
}
