//! Classification pipeline.
//!
//! Every email flows through:
//! 1. `PatternRegistry` — immutable keyword tables, shared by `Arc`
//! 2. `ToneAnalyzer`, `UrgencyAnalyzer`, `AttachmentAnalyzer` — independent scorers
//! 3. `Classifier` — ordered guard stages, first match wins
//! 4. `BatchRunner` — many emails at once, failures isolated per item
//!
//! Nothing here performs I/O except loading an overrides file at startup.

pub mod attachments;
pub mod batch;
pub mod builtin;
pub mod classifier;
pub mod patterns;
pub mod tone;
pub mod types;
pub mod urgency;
