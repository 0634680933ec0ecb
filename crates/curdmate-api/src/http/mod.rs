//! REST API: chat sessions over HTTP.
//!
//! Every response uses the [`response::ApiResponse`] envelope.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
