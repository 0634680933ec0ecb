//! Interactive chat REPL.
//!
//! Slash commands cover the quick actions and session controls; everything
//! else is sent to the conversation engine as free text.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
