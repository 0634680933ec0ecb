//! Conversation engine and port traits for CurdMate.
//!
//! This crate holds the orchestration logic (validators, guided flows, intent
//! resolution, confirmation, command execution, sessions) and defines the
//! ports (`RecordApi`, `LlmProvider`) that curdmate-infra implements. It never
//! depends on an HTTP client or the filesystem.

pub mod chat;
pub mod conversation;
pub mod executor;
pub mod intent;
pub mod llm;
pub mod record;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_support;
