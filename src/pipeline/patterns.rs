//! Pattern registry — the keyword tables every analyzer scores against.
//!
//! The registry is built once (built-in tables, optionally merged with a
//! JSON overrides document) and then shared read-only behind an `Arc`.
//! Classifier code only ever asks for a set by [`Label`], so editing a
//! phrase never means editing the classifier.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ConfigError, Error, PatternError};
use crate::pipeline::builtin;
use crate::text::{FoldedText, Needle};

/// Name of a pattern set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Spam,
    Promotion,
    Newsletter,
    Gratitude,
    /// Request/action language that disqualifies a "simple thanks".
    Actionable,
    TechnicalSupport,
    Question,
    Meeting,
    Information,
    Task,
    Invitation,
    Conversation,
    PositiveTone,
    NegativeTone,
    HighUrgency,
    MediumUrgency,
    LowUrgency,
    Attachment,
    SuspiciousAttachment,
}

impl Label {
    pub const ALL: [Label; 19] = [
        Self::Spam,
        Self::Promotion,
        Self::Newsletter,
        Self::Gratitude,
        Self::Actionable,
        Self::TechnicalSupport,
        Self::Question,
        Self::Meeting,
        Self::Information,
        Self::Task,
        Self::Invitation,
        Self::Conversation,
        Self::PositiveTone,
        Self::NegativeTone,
        Self::HighUrgency,
        Self::MediumUrgency,
        Self::LowUrgency,
        Self::Attachment,
        Self::SuspiciousAttachment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spam => "spam",
            Self::Promotion => "promotion",
            Self::Newsletter => "newsletter",
            Self::Gratitude => "gratitude",
            Self::Actionable => "actionable",
            Self::TechnicalSupport => "technical_support",
            Self::Question => "question",
            Self::Meeting => "meeting",
            Self::Information => "information",
            Self::Task => "task",
            Self::Invitation => "invitation",
            Self::Conversation => "conversation",
            Self::PositiveTone => "positive_tone",
            Self::NegativeTone => "negative_tone",
            Self::HighUrgency => "high_urgency",
            Self::MediumUrgency => "medium_urgency",
            Self::LowUrgency => "low_urgency",
            Self::Attachment => "attachment",
            Self::SuspiciousAttachment => "suspicious_attachment",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single weighted phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    /// Phrase as declared (reported back to callers).
    pub phrase: String,
    pub weight: u32,
    needle: Needle,
}

impl Pattern {
    pub fn new(phrase: impl Into<String>, weight: u32) -> Self {
        let phrase = phrase.into();
        let needle = Needle::parse(&phrase);
        let display = phrase.trim().trim_end_matches('*').trim_end().to_string();
        Self {
            phrase: display,
            weight,
            needle,
        }
    }

    pub fn needle(&self) -> &Needle {
        &self.needle
    }

    /// Whether this phrase occurs in the (folded) text.
    pub fn is_in(&self, text: &FoldedText<'_>) -> bool {
        self.needle.is_in(text.folded())
    }
}

/// One pattern hit inside a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch<'p> {
    pub pattern: &'p Pattern,
    /// Byte offset of the first occurrence in the folded text.
    pub first_at: usize,
    /// Number of occurrences.
    pub occurrences: usize,
}

/// Ordered, weighted phrases for one label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    pub fn new(patterns: Vec<Pattern>) -> Self {
        Self { patterns }
    }

    /// Build a set from `(phrase, weight)` pairs.
    pub fn from_weighted(entries: &[(&str, u32)]) -> Self {
        Self::new(entries.iter().map(|(p, w)| Pattern::new(*p, *w)).collect())
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Every pattern present in the text, in declaration order.
    pub fn matches<'p>(&'p self, text: &FoldedText<'_>) -> Vec<PatternMatch<'p>> {
        self.patterns
            .iter()
            .filter_map(|pattern| {
                let hits = pattern.needle.find_all(text.folded());
                hits.first().map(|first| PatternMatch {
                    pattern,
                    first_at: *first,
                    occurrences: hits.len(),
                })
            })
            .collect()
    }

    /// Sum of the weights of the distinct patterns present.
    pub fn score(&self, text: &FoldedText<'_>) -> u32 {
        self.patterns
            .iter()
            .filter(|p| p.is_in(text))
            .map(|p| p.weight)
            .sum()
    }

    /// True if any pattern is present.
    pub fn any_match(&self, text: &FoldedText<'_>) -> bool {
        self.patterns.iter().any(|p| p.is_in(text))
    }

    fn push(&mut self, pattern: Pattern) {
        // A re-declared phrase replaces the earlier weight in place.
        match self
            .patterns
            .iter_mut()
            .find(|existing| existing.needle == pattern.needle)
        {
            Some(existing) => *existing = pattern,
            None => self.patterns.push(pattern),
        }
    }
}

// ── Registry ────────────────────────────────────────────────────────

/// Immutable collection of every pattern set, keyed by [`Label`].
#[derive(Debug, Clone, Default)]
pub struct PatternRegistry {
    sets: HashMap<Label, PatternSet>,
}

impl PatternRegistry {
    /// The built-in Portuguese rule set.
    pub fn builtin() -> Self {
        let sets = builtin::tables()
            .into_iter()
            .map(|(label, entries)| (label, PatternSet::from_weighted(entries)))
            .collect();
        Self { sets }
    }

    /// A registry with no patterns at all (every text classifies as default).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the built-in registry and apply an overrides file on top.
    pub fn with_overrides_file(path: &Path) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let overrides = PatternOverrides::from_json(&raw)?;
        let mut registry = Self::builtin();
        registry.apply(overrides)?;
        info!(path = %path.display(), "Applied pattern overrides");
        Ok(registry)
    }

    /// Start building a registry from the built-in tables.
    pub fn builder() -> PatternRegistryBuilder {
        PatternRegistryBuilder {
            registry: Self::builtin(),
        }
    }

    /// Patterns for a label, in declaration order. Empty if the label has none.
    pub fn patterns_for(&self, label: Label) -> &[Pattern] {
        self.sets
            .get(&label)
            .map(PatternSet::patterns)
            .unwrap_or(&[])
    }

    /// The full set for a label.
    pub fn set(&self, label: Label) -> Option<&PatternSet> {
        self.sets.get(&label)
    }

    /// Weighted score of `text` against a label's set (0 if absent).
    pub fn score(&self, label: Label, text: &FoldedText<'_>) -> u32 {
        self.sets.get(&label).map_or(0, |set| set.score(text))
    }

    /// Whether any phrase of a label's set occurs in `text`.
    pub fn any_match(&self, label: Label, text: &FoldedText<'_>) -> bool {
        self.sets.get(&label).is_some_and(|set| set.any_match(text))
    }

    /// Matched phrases of a label's set, in declaration order.
    pub fn matched_phrases(&self, label: Label, text: &FoldedText<'_>) -> Vec<String> {
        self.sets
            .get(&label)
            .map(|set| {
                set.matches(text)
                    .into_iter()
                    .map(|m| m.pattern.phrase.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Apply an overrides document.
    pub fn apply(&mut self, overrides: PatternOverrides) -> Result<(), PatternError> {
        for (label, entries) in overrides.sets {
            let mut patterns = Vec::with_capacity(entries.len());
            for entry in entries {
                let (phrase, weight) = entry.into_parts();
                if Needle::parse(&phrase).is_empty() {
                    return Err(PatternError::EmptyPhrase {
                        label: label.to_string(),
                    });
                }
                if weight == 0 {
                    return Err(PatternError::ZeroWeight {
                        label: label.to_string(),
                        phrase,
                    });
                }
                patterns.push(Pattern::new(phrase, weight));
            }

            let set = self.sets.entry(label).or_default();
            if overrides.replace {
                *set = PatternSet::default();
            }
            debug!(label = %label, added = patterns.len(), replace = overrides.replace, "Pattern set override");
            for pattern in patterns {
                set.push(pattern);
            }
        }
        Ok(())
    }
}

/// Incremental registry construction (built-in tables as the base).
pub struct PatternRegistryBuilder {
    registry: PatternRegistry,
}

impl PatternRegistryBuilder {
    /// Add (or re-weight) a phrase in a set.
    ///
    /// Unlike an overrides document, which rejects a zero weight, the
    /// builder raises it to 1 so a programmatic phrase always counts.
    pub fn add(mut self, label: Label, phrase: &str, weight: u32) -> Self {
        self.registry
            .sets
            .entry(label)
            .or_default()
            .push(Pattern::new(phrase, weight.max(1)));
        self
    }

    /// Drop every phrase from a set.
    pub fn clear(mut self, label: Label) -> Self {
        self.registry.sets.insert(label, PatternSet::default());
        self
    }

    pub fn build(self) -> PatternRegistry {
        self.registry
    }
}

// ── Overrides document ──────────────────────────────────────────────

/// JSON document that extends or replaces built-in sets.
///
/// ```json
/// { "replace": false,
///   "sets": { "meeting": [ "daily", { "phrase": "sprint review", "weight": 2 } ] } }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatternOverrides {
    #[serde(default)]
    pub replace: bool,
    #[serde(default)]
    pub sets: HashMap<Label, Vec<OverrideEntry>>,
}

impl PatternOverrides {
    pub fn from_json(raw: &str) -> Result<Self, PatternError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// A phrase, either bare (weight 1) or with an explicit weight.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OverrideEntry {
    Plain(String),
    Weighted {
        phrase: String,
        #[serde(default = "default_weight")]
        weight: u32,
    },
}

impl OverrideEntry {
    fn into_parts(self) -> (String, u32) {
        match self {
            Self::Plain(phrase) => (phrase, 1),
            Self::Weighted { phrase, weight } => (phrase, weight),
        }
    }
}

fn default_weight() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_every_label() {
        let registry = PatternRegistry::builtin();
        for label in Label::ALL {
            assert!(
                !registry.patterns_for(label).is_empty(),
                "label {label} has no patterns"
            );
        }
    }

    #[test]
    fn builtin_weights_are_positive() {
        let registry = PatternRegistry::builtin();
        for label in Label::ALL {
            assert!(registry.patterns_for(label).iter().all(|p| p.weight > 0));
        }
    }

    #[test]
    fn score_counts_distinct_patterns_once() {
        let set = PatternSet::from_weighted(&[("erro", 2), ("falha", 1)]);
        let text = FoldedText::new("erro, erro e mais um ERRO. Falha geral.");
        assert_eq!(set.score(&text), 3);
    }

    #[test]
    fn matches_report_first_position_and_count() {
        let set = PatternSet::from_weighted(&[("anexo", 1)]);
        let text = FoldedText::new("ver anexo; outro anexo");
        let hits = set.matches(&text);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].first_at, 4);
        assert_eq!(hits[0].occurrences, 2);
    }

    #[test]
    fn unknown_label_scores_zero() {
        let registry = PatternRegistry::empty();
        let text = FoldedText::new("urgente");
        assert_eq!(registry.score(Label::HighUrgency, &text), 0);
        assert!(registry.patterns_for(Label::HighUrgency).is_empty());
    }

    #[test]
    fn pattern_keeps_declared_casing() {
        let pattern = Pattern::new("Em Anexo", 1);
        assert_eq!(pattern.phrase, "Em Anexo");
        assert_eq!(pattern.needle().as_str(), "em anexo");

        let prefix = Pattern::new("anex*", 1);
        assert_eq!(prefix.phrase, "anex");
        assert!(prefix.needle().is_prefix());
    }

    #[test]
    fn builder_adds_and_reweights() {
        let registry = PatternRegistry::builder()
            .clear(Label::Meeting)
            .add(Label::Meeting, "daily", 1)
            .add(Label::Meeting, "Daily", 4)
            .build();
        let meeting = registry.patterns_for(Label::Meeting);
        assert_eq!(meeting.len(), 1);
        assert_eq!(meeting[0].weight, 4);
    }

    #[test]
    fn builder_raises_zero_weight_to_one() {
        let registry = PatternRegistry::builder()
            .clear(Label::Meeting)
            .add(Label::Meeting, "daily", 0)
            .build();
        assert_eq!(registry.patterns_for(Label::Meeting)[0].weight, 1);
        let text = FoldedText::new("daily às 9h");
        assert_eq!(registry.score(Label::Meeting, &text), 1);
    }

    #[test]
    fn overrides_append_by_default() {
        let mut registry = PatternRegistry::builtin();
        let before = registry.patterns_for(Label::Meeting).len();
        let overrides = PatternOverrides::from_json(
            r#"{"sets": {"meeting": ["sprint review", {"phrase": "retro", "weight": 3}]}}"#,
        )
        .unwrap();
        registry.apply(overrides).unwrap();
        let meeting = registry.patterns_for(Label::Meeting);
        assert_eq!(meeting.len(), before + 2);
        assert_eq!(meeting.last().unwrap().weight, 3);
    }

    #[test]
    fn overrides_replace_when_asked() {
        let mut registry = PatternRegistry::builtin();
        let overrides =
            PatternOverrides::from_json(r#"{"replace": true, "sets": {"spam": ["bitcoin gratis"]}}"#)
                .unwrap();
        registry.apply(overrides).unwrap();
        assert_eq!(registry.patterns_for(Label::Spam).len(), 1);
    }

    #[test]
    fn overrides_reject_bad_entries() {
        let mut registry = PatternRegistry::builtin();
        let empty = PatternOverrides::from_json(r#"{"sets": {"task": ["  "]}}"#).unwrap();
        assert!(matches!(
            registry.apply(empty),
            Err(PatternError::EmptyPhrase { .. })
        ));

        let zero =
            PatternOverrides::from_json(r#"{"sets": {"task": [{"phrase": "x", "weight": 0}]}}"#)
                .unwrap();
        assert!(matches!(
            registry.apply(zero),
            Err(PatternError::ZeroWeight { .. })
        ));
    }

    #[test]
    fn overrides_reject_unknown_label() {
        assert!(PatternOverrides::from_json(r#"{"sets": {"bogus": ["x"]}}"#).is_err());
    }

    #[test]
    fn overrides_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patterns.json");
        std::fs::write(&path, r#"{"sets": {"invitation": ["chá de bebê"]}}"#).unwrap();
        let registry = PatternRegistry::with_overrides_file(&path).unwrap();
        assert!(registry
            .patterns_for(Label::Invitation)
            .iter()
            .any(|p| p.phrase == "chá de bebê"));
    }

    #[test]
    fn overrides_file_missing_is_config_error() {
        let err = PatternRegistry::with_overrides_file(Path::new("/nonexistent/p.json")).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Io { .. })));
    }
}
