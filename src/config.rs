//! Configuration types.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::pipeline::batch::{DEFAULT_MIN_ITEM_CHARS, DEFAULT_WORKERS, MAX_BATCH_SIZE};
use crate::pipeline::classifier::DEFAULT_THANKS_MAX_WORDS;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriageConfig {
    /// Maximum emails per batch request (never above 50).
    pub max_batch_size: usize,
    /// Batch items processed concurrently.
    pub batch_workers: usize,
    /// Overall batch deadline; `None` waits for every item.
    pub batch_timeout: Option<Duration>,
    /// Batch items with fewer trimmed characters fail validation.
    pub min_item_chars: usize,
    /// Word limit of the simple-thanks stage.
    pub simple_thanks_max_words: usize,
    /// Sentences returned by `summarize` when the caller does not say.
    pub default_summary_sentences: usize,
    /// Optional JSON document extending or replacing the built-in patterns.
    pub patterns_path: Option<PathBuf>,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            max_batch_size: MAX_BATCH_SIZE,
            batch_workers: DEFAULT_WORKERS,
            batch_timeout: Some(Duration::from_secs(30)),
            min_item_chars: DEFAULT_MIN_ITEM_CHARS,
            simple_thanks_max_words: DEFAULT_THANKS_MAX_WORDS,
            default_summary_sentences: 3,
            patterns_path: None,
        }
    }
}

impl TriageConfig {
    /// Defaults overridden by `TRIAGE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(size) = parse(&lookup, "TRIAGE_MAX_BATCH_SIZE")? {
            if size == 0 || size > MAX_BATCH_SIZE {
                return Err(invalid(
                    "TRIAGE_MAX_BATCH_SIZE",
                    format!("must be between 1 and {MAX_BATCH_SIZE}, got {size}"),
                ));
            }
            config.max_batch_size = size;
        }
        if let Some(workers) = parse(&lookup, "TRIAGE_BATCH_WORKERS")? {
            if workers == 0 {
                return Err(invalid("TRIAGE_BATCH_WORKERS", "must be at least 1".into()));
            }
            config.batch_workers = workers;
        }
        if let Some(secs) = parse::<u64>(&lookup, "TRIAGE_BATCH_TIMEOUT_SECS")? {
            config.batch_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(chars) = parse(&lookup, "TRIAGE_MIN_ITEM_CHARS")? {
            config.min_item_chars = chars;
        }
        if let Some(words) = parse(&lookup, "TRIAGE_THANKS_MAX_WORDS")? {
            config.simple_thanks_max_words = words;
        }
        if let Some(sentences) = parse(&lookup, "TRIAGE_SUMMARY_SENTENCES")? {
            config.default_summary_sentences = sentences;
        }
        if let Some(path) = lookup("TRIAGE_PATTERNS_PATH").filter(|p| !p.trim().is_empty()) {
            config.patterns_path = Some(PathBuf::from(path));
        }

        Ok(config)
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|e: T::Err| invalid(key, format!("{raw:?}: {e}")))
}

fn invalid(key: &str, message: String) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = TriageConfig::default();
        assert_eq!(config.max_batch_size, 50);
        assert_eq!(config.batch_workers, 8);
        assert_eq!(config.batch_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.min_item_chars, 10);
        assert_eq!(config.simple_thanks_max_words, 50);
        assert_eq!(config.default_summary_sentences, 3);
        assert!(config.patterns_path.is_none());
    }

    #[test]
    fn no_variables_gives_defaults() {
        assert_eq!(TriageConfig::from_lookup(lookup(&[])).unwrap(), TriageConfig::default());
    }

    #[test]
    fn overrides_apply() {
        let config = TriageConfig::from_lookup(lookup(&[
            ("TRIAGE_MAX_BATCH_SIZE", "20"),
            ("TRIAGE_BATCH_WORKERS", " 2 "),
            ("TRIAGE_BATCH_TIMEOUT_SECS", "0"),
            ("TRIAGE_SUMMARY_SENTENCES", "5"),
            ("TRIAGE_PATTERNS_PATH", "/etc/triage/patterns.json"),
        ]))
        .unwrap();
        assert_eq!(config.max_batch_size, 20);
        assert_eq!(config.batch_workers, 2);
        assert_eq!(config.batch_timeout, None);
        assert_eq!(config.default_summary_sentences, 5);
        assert_eq!(config.patterns_path, Some(PathBuf::from("/etc/triage/patterns.json")));
    }

    #[test]
    fn unparseable_value_is_rejected() {
        let err = TriageConfig::from_lookup(lookup(&[("TRIAGE_BATCH_WORKERS", "muitos")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "TRIAGE_BATCH_WORKERS"));
    }

    #[test]
    fn batch_size_above_cap_is_rejected() {
        let err =
            TriageConfig::from_lookup(lookup(&[("TRIAGE_MAX_BATCH_SIZE", "51")])).unwrap_err();
        assert!(err.to_string().contains("between 1 and 50"));
    }
}
