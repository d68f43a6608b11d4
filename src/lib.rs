//! Email triage — rule-based classification, summaries and replies for
//! Portuguese email.

pub mod config;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod reply;
pub mod summary;
pub mod text;
pub mod thread;
