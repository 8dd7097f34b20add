//! Support-program matching: extract, select, prompt, score, parse, filter, join.

pub mod extractor;
pub mod handlers;
pub mod joiner;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod prompts;
pub mod scorer;
pub mod selector;
