//! Chat sessions: one conversation state plus its transcript.

pub mod session;
pub mod transcript;

pub use session::ChatSession;
pub use transcript::Transcript;

/// Errors returned by [`ChatSession::submit`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("message must not be empty")]
    EmptyMessage,

    #[error("session expired, please log in again")]
    Expired,
}
