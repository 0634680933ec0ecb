//! Tracing setup and shared span attribute names for CurdMate.

pub mod attrs;
pub mod tracing_setup;
