use tracing::{debug, info};
use uuid::Uuid;

use curdmate_types::conversation::{ConversationState, Progress, Trigger};
use curdmate_types::transcript::{ActionTag, TranscriptMessage};

use super::SessionError;
use super::transcript::Transcript;
use crate::conversation::machine::{ConversationEngine, TurnSignal};
use crate::conversation::{CANCELLED_TEXT, WELCOME_TEXT};
use crate::record::RecordApi;

/// A single user's conversation: engine, state, and transcript.
///
/// Submissions take `&mut self`, so one session processes at most one turn at
/// a time.
pub struct ChatSession<R> {
    id: Uuid,
    engine: ConversationEngine<R>,
    state: ConversationState,
    transcript: Transcript,
    expired: bool,
}

impl<R: RecordApi> ChatSession<R> {
    /// Start a session in Idle with the welcome message already in the transcript.
    pub fn new(engine: ConversationEngine<R>) -> Self {
        let mut transcript = Transcript::new();
        transcript.push_bot(WELCOME_TEXT, ActionTag::Help);
        Self {
            id: Uuid::now_v7(),
            engine,
            state: ConversationState::idle(),
            transcript,
            expired: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Record `text` as a user message, run one turn, and append the reply.
    ///
    /// Blank input is refused outside guided flows; inside one it reaches the
    /// step handler, which answers with "this field is required".
    #[tracing::instrument(name = "session.submit", skip(self, text), fields(session.id = %self.id))]
    pub async fn submit(
        &mut self,
        text: &str,
        trigger: Trigger,
    ) -> Result<&TranscriptMessage, SessionError> {
        if self.expired {
            return Err(SessionError::Expired);
        }
        if text.trim().is_empty() && !self.state.mode.is_guided() {
            return Err(SessionError::EmptyMessage);
        }

        self.transcript.push_user(text);
        let turn = self.engine.step(&self.state, text, trigger).await;
        if turn.signal == Some(TurnSignal::SessionExpired) {
            info!("session expired by record API");
            self.expired = true;
        }
        debug!(from = %self.state.mode, to = %turn.state.mode, "turn complete");
        self.state = turn.state;
        Ok(self.transcript.push_bot(turn.reply.text, turn.reply.action))
    }

    /// Out-of-band cancel control: back to Idle without a user message.
    pub fn cancel(&mut self) -> &TranscriptMessage {
        debug!(session.id = %self.id, from = %self.state.mode, "cancel control");
        self.state = ConversationState::idle();
        self.transcript.push_bot(CANCELLED_TEXT, ActionTag::Cancel)
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn progress(&self) -> Option<Progress> {
        self.state.progress()
    }

    pub fn status_line(&self) -> String {
        self.state.status_line()
    }

    pub fn input_hint(&self) -> &'static str {
        self.state.input_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::executor::CommandExecutor;
    use crate::intent::nlp::IntentResolver;
    use crate::test_support::{ID_A, MockRecordApi, record};
    use curdmate_types::conversation::Mode;
    use curdmate_types::error::RecordApiError;
    use curdmate_types::transcript::Sender;

    fn session(api: &Arc<MockRecordApi>) -> ChatSession<MockRecordApi> {
        let engine = ConversationEngine::new(
            CommandExecutor::new(Arc::clone(api), 10),
            Arc::new(IntentResolver::unconfigured("no key")),
        );
        ChatSession::new(engine)
    }

    #[test]
    fn test_new_session_starts_with_welcome() {
        let s = session(&Arc::new(MockRecordApi::new()));
        assert!(s.state().is_idle());
        assert_eq!(s.transcript().len(), 1);
        let welcome = &s.transcript().messages()[0];
        assert_eq!(welcome.sender, Sender::Bot);
        assert_eq!(welcome.action, Some(ActionTag::Help));
        assert_eq!(s.status_line(), "Ready to help");
        assert!(s.progress().is_none());
    }

    #[tokio::test]
    async fn test_submit_appends_user_then_bot() {
        let api = Arc::new(MockRecordApi::new());
        let mut s = session(&api);
        let reply = s.submit("create", Trigger::QuickAction).await.unwrap().clone();
        assert_eq!(reply.action, Some(ActionTag::Create));
        assert_eq!(s.state().mode, Mode::Creating);
        assert_eq!(s.transcript().len(), 3);
        assert_eq!(s.transcript().messages()[1].text, "create");
        assert_eq!(s.status_line(), "Creating record - step 1/5");
    }

    #[tokio::test]
    async fn test_blank_idle_message_rejected() {
        let mut s = session(&Arc::new(MockRecordApi::new()));
        let err = s.submit("   ", Trigger::FreeText).await.unwrap_err();
        assert_eq!(err, SessionError::EmptyMessage);
        assert_eq!(s.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_guided_message_is_required_reply() {
        let mut s = session(&Arc::new(MockRecordApi::new()));
        s.submit("create", Trigger::QuickAction).await.unwrap();
        let reply = s.submit("", Trigger::FreeText).await.unwrap();
        assert!(reply.text.starts_with("This field is required!"));
        assert_eq!(s.state().step, 0);
    }

    #[tokio::test]
    async fn test_cancel_control_resets_without_user_message() {
        let mut s = session(&Arc::new(MockRecordApi::new()));
        s.submit("update", Trigger::QuickAction).await.unwrap();
        s.submit(ID_A, Trigger::FreeText).await.unwrap();
        assert_eq!(s.state().step, 1);

        let before = s.transcript().len();
        let msg = s.cancel();
        assert_eq!(msg.text, CANCELLED_TEXT);
        assert_eq!(msg.action, Some(ActionTag::Cancel));
        assert_eq!(s.transcript().len(), before + 1);
        assert_eq!(*s.state(), ConversationState::idle());
    }

    #[tokio::test]
    async fn test_unconfigured_nlp_fails_softly() {
        let mut s = session(&Arc::new(MockRecordApi::new()));
        let reply = s.submit("add john please", Trigger::FreeText).await.unwrap();
        assert_eq!(reply.action, Some(ActionTag::Error));
        assert!(reply.text.contains("not configured"));
        assert!(s.state().is_idle());
        assert!(!s.is_expired());
    }

    #[tokio::test]
    async fn test_unauthorized_expires_session() {
        let api = Arc::new(MockRecordApi::with_records(vec![record(ID_A, "john", "john@test.com")]));
        api.fail_with(|| RecordApiError::Unauthorized);
        let mut s = session(&api);
        s.submit("search", Trigger::QuickAction).await.unwrap();
        let reply = s.submit("all", Trigger::FreeText).await.unwrap();
        assert_eq!(reply.text, "Session expired. Please login again.");
        assert!(s.is_expired());
        assert!(s.state().is_idle());

        let err = s.submit("create", Trigger::QuickAction).await.unwrap_err();
        assert_eq!(err, SessionError::Expired);
    }
}
