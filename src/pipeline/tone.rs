//! Tone analyzer — positive vs negative cue scoring.

use std::sync::Arc;

use serde::Serialize;

use crate::pipeline::patterns::{Label, PatternRegistry};
use crate::pipeline::types::Tone;
use crate::text::FoldedText;

/// Raw weighted scores behind a tone verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ToneScores {
    pub positive: u32,
    pub negative: u32,
}

impl ToneScores {
    /// Strictly greater side wins; any tie (including 0/0) is neutral.
    pub fn verdict(&self) -> Tone {
        match self.positive.cmp(&self.negative) {
            std::cmp::Ordering::Greater => Tone::Positive,
            std::cmp::Ordering::Less => Tone::Negative,
            std::cmp::Ordering::Equal => Tone::Neutral,
        }
    }
}

/// Scores text against the positive/negative tone sets.
#[derive(Debug, Clone)]
pub struct ToneAnalyzer {
    registry: Arc<PatternRegistry>,
}

impl ToneAnalyzer {
    pub fn new(registry: Arc<PatternRegistry>) -> Self {
        Self { registry }
    }

    pub fn scores(&self, text: &FoldedText<'_>) -> ToneScores {
        ToneScores {
            positive: self.registry.score(Label::PositiveTone, text),
            negative: self.registry.score(Label::NegativeTone, text),
        }
    }

    pub fn analyze(&self, text: &FoldedText<'_>) -> Tone {
        self.scores(text).verdict()
    }

    /// Convenience entry point over a raw string.
    pub fn analyze_tone(&self, text: &str) -> Tone {
        self.analyze(&FoldedText::new(text))
    }
}
