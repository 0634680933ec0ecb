//! Infrastructure layer for CurdMate.
//!
//! Contains implementations of the ports defined in `curdmate-core`: the
//! HTTP record API client and the OpenAI-compatible completion provider,
//! plus config loading and environment secret resolution.

pub mod config;
pub mod llm;
pub mod record;
pub mod secret;
