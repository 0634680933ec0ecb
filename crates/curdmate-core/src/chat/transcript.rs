use curdmate_types::transcript::{ActionTag, TranscriptMessage};

/// Append-only message log for one session.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<TranscriptMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> &TranscriptMessage {
        self.push(TranscriptMessage::user(text))
    }

    pub fn push_bot(&mut self, text: impl Into<String>, action: ActionTag) -> &TranscriptMessage {
        self.push(TranscriptMessage::bot(text, action))
    }

    fn push(&mut self, message: TranscriptMessage) -> &TranscriptMessage {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[TranscriptMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&TranscriptMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
