//! Hierarchical classifier — ordered guard stages, first match wins.
//!
//! Stage order is a business rule:
//! 1. Spam → Improdutivo / Spam
//! 2. Marketing → Improdutivo / Promoção or Newsletter
//! 3. Simple thanks → Social / Agradecimento
//! 4. Topical scoring over the Produtivo and Social subcategory sets
//!
//! Nothing matched → Improdutivo / Indefinido. Tone, urgency and attachment
//! analysis run independently of the stages and are always merged in.

use std::sync::Arc;

use tracing::debug;

use crate::pipeline::attachments::AttachmentAnalyzer;
use crate::pipeline::patterns::{Label, PatternRegistry};
use crate::pipeline::tone::ToneAnalyzer;
use crate::pipeline::types::{Category, ClassificationResult, DecisionStage, Subcategory};
use crate::pipeline::urgency::UrgencyAnalyzer;
use crate::text::{self, FoldedText};

/// Weighted spam score at which a text is spam.
const SPAM_THRESHOLD: u32 = 3;

/// Weighted score (of the stronger marketing set) at which a text is marketing.
const MARKETING_THRESHOLD: u32 = 2;

/// Default word limit for the simple-thanks stage.
pub const DEFAULT_THANKS_MAX_WORDS: usize = 50;

/// Outcome of a single decision stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub subcategory: Subcategory,
    pub stage: DecisionStage,
    /// Phrases that triggered the stage.
    pub matched: Vec<String>,
}

type StageFn = fn(&Classifier, &FoldedText<'_>) -> Option<Verdict>;

/// Decision stages in priority order.
const STAGES: [(&str, StageFn); 4] = [
    ("spam", Classifier::check_spam),
    ("marketing", Classifier::check_marketing),
    ("simple_thanks", Classifier::check_simple_thanks),
    ("topical", Classifier::classify_topical),
];

/// Rule-based email classifier.
///
/// Holds only shared read-only state; safe to call from many threads.
#[derive(Debug, Clone)]
pub struct Classifier {
    registry: Arc<PatternRegistry>,
    tone: ToneAnalyzer,
    urgency: UrgencyAnalyzer,
    attachments: AttachmentAnalyzer,
    thanks_max_words: usize,
}

impl Classifier {
    pub fn new(registry: Arc<PatternRegistry>) -> Self {
        Self {
            tone: ToneAnalyzer::new(Arc::clone(&registry)),
            urgency: UrgencyAnalyzer::new(Arc::clone(&registry)),
            attachments: AttachmentAnalyzer::new(Arc::clone(&registry)),
            registry,
            thanks_max_words: DEFAULT_THANKS_MAX_WORDS,
        }
    }

    /// Override the word limit of the simple-thanks stage.
    pub fn with_thanks_max_words(mut self, words: usize) -> Self {
        self.thanks_max_words = words;
        self
    }

    pub fn registry(&self) -> &Arc<PatternRegistry> {
        &self.registry
    }

    /// Classify an email body. Total over every input, including "".
    pub fn classify(&self, raw: &str) -> ClassificationResult {
        let text = FoldedText::new(raw);

        let verdict = STAGES
            .iter()
            .find_map(|(name, stage)| {
                let verdict = stage(self, &text)?;
                debug!(
                    stage = *name,
                    subcategory = verdict.subcategory.as_str(),
                    matched = ?verdict.matched,
                    "Classification stage matched"
                );
                Some(verdict)
            })
            .unwrap_or_else(|| {
                debug!("No stage matched, using fallback classification");
                Verdict {
                    subcategory: Subcategory::Undefined,
                    stage: DecisionStage::Fallback,
                    matched: Vec::new(),
                }
            });

        ClassificationResult {
            category: verdict.subcategory.category(),
            subcategory: verdict.subcategory,
            tone: self.tone.analyze(&text),
            urgency: self.urgency.analyze(&text),
            attachment_analysis: self.attachments.analyze(&text),
            word_count: text.word_count(),
            char_count: text::char_count(raw),
            stage: verdict.stage,
            confidence: verdict.stage.confidence(),
            matched_keywords: verdict.matched,
        }
    }

    /// Stage 1: spam.
    pub fn check_spam(&self, text: &FoldedText<'_>) -> Option<Verdict> {
        let score = self.registry.score(Label::Spam, text);
        (score >= SPAM_THRESHOLD).then(|| Verdict {
            subcategory: Subcategory::Spam,
            stage: DecisionStage::Spam,
            matched: self.registry.matched_phrases(Label::Spam, text),
        })
    }

    /// Stage 2: marketing. Promoção wins a tie with Newsletter.
    pub fn check_marketing(&self, text: &FoldedText<'_>) -> Option<Verdict> {
        let promotion = self.registry.score(Label::Promotion, text);
        let newsletter = self.registry.score(Label::Newsletter, text);

        let (subcategory, label, score) = if newsletter > promotion {
            (Subcategory::Newsletter, Label::Newsletter, newsletter)
        } else {
            (Subcategory::Promotion, Label::Promotion, promotion)
        };

        (score >= MARKETING_THRESHOLD).then(|| Verdict {
            subcategory,
            stage: DecisionStage::Marketing,
            matched: self.registry.matched_phrases(label, text),
        })
    }

    /// Stage 3: short, purely grateful message with nothing to act on.
    pub fn check_simple_thanks(&self, text: &FoldedText<'_>) -> Option<Verdict> {
        if text.word_count() >= self.thanks_max_words {
            return None;
        }

        let gratitude = self.registry.matched_phrases(Label::Gratitude, text);
        if gratitude.is_empty() {
            return None;
        }

        let has_question = text.folded().contains('?');
        let actionable = self.registry.any_match(Label::Actionable, text)
            || Subcategory::TOPICAL
                .iter()
                .filter(|s| s.category() == Category::Productive)
                .filter_map(Subcategory::label)
                .any(|label| self.registry.any_match(label, text));

        if has_question || actionable {
            return None;
        }

        Some(Verdict {
            subcategory: Subcategory::Gratitude,
            stage: DecisionStage::SimpleThanks,
            matched: gratitude,
        })
    }

    /// Stage 4: highest weighted subcategory score wins; ties keep the
    /// earlier subcategory in canonical order. `None` if nothing scores.
    pub fn classify_topical(&self, text: &FoldedText<'_>) -> Option<Verdict> {
        let scores = self.topical_scores(text);
        let mut best: Option<(Subcategory, Label, u32)> = None;
        for (subcategory, label, score) in scores {
            if score > 0 && best.is_none_or(|(_, _, top)| score > top) {
                best = Some((subcategory, label, score));
            }
        }

        best.map(|(subcategory, label, _)| Verdict {
            subcategory,
            stage: DecisionStage::Topical,
            matched: self.registry.matched_phrases(label, text),
        })
    }

    /// Score of every topical subcategory, in canonical order.
    pub fn topical_scores(&self, text: &FoldedText<'_>) -> Vec<(Subcategory, Label, u32)> {
        Subcategory::TOPICAL
            .iter()
            .filter_map(|s| s.label().map(|label| (*s, label)))
            .map(|(s, label)| (s, label, self.registry.score(label, text)))
            .collect()
    }
}
