//! Intent resolution: deterministic keyword routing and NLP-derived intents.

pub mod keyword;
pub mod nlp;
pub mod normalize;
