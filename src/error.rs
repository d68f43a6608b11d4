//! Error types for the triage engine.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Caller mistakes that are rejected outright.
///
/// Classification itself never produces these; only the batch entry point
/// and strict label parsing do.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Batch of {size} emails exceeds the limit of {limit}")]
    BatchTooLarge { size: usize, limit: usize },

    #[error("Batch contains no emails")]
    EmptyBatch,

    #[error("Unknown {field} label: {value:?}")]
    UnknownLabel { field: &'static str, value: String },
}

/// A single batch item failed. Recorded on the item, never propagated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemError {
    #[error("Email too short or empty ({chars} chars, minimum {min})")]
    TooShort { chars: usize, min: usize },

    #[error("Processing panicked: {0}")]
    Panicked(String),

    #[error("Batch deadline exceeded before this email was processed")]
    DeadlineExceeded,

    #[error("Processing failed: {0}")]
    Failed(String),
}

/// Pattern override loading errors.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("Failed to parse pattern overrides: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Empty phrase in pattern set {label}")]
    EmptyPhrase { label: String },

    #[error("Pattern weight must be positive in set {label}: {phrase:?}")]
    ZeroWeight { label: String, phrase: String },
}

/// Result type alias for the engine.
pub type Result<T> = std::result::Result<T, Error>;
