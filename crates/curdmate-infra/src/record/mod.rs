//! Record API adapters.

pub mod http;

pub use http::HttpRecordApi;
