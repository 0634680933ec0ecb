//! Shared domain types for CurdMate.
//!
//! This crate contains the core domain types used across the CurdMate
//! assistant: contact records and their identifiers, the conversation state
//! machine's state, structured intents, transcript messages, LLM request
//! shapes, configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod conversation;
pub mod error;
pub mod intent;
pub mod llm;
pub mod record;
pub mod transcript;
