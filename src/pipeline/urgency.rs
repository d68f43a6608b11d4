//! Urgency analyzer — ordered OR-priority over three cue sets.
//!
//! A single high cue forces `Alta` no matter how much calm text surrounds
//! it; otherwise a medium cue forces `Média`; otherwise `Baixa`. A high cue
//! that only occurs inside a low cue ("não é urgente", "sem urgência") is
//! not counted as a high hit.

use std::ops::Range;
use std::sync::Arc;

use serde::Serialize;

use crate::pipeline::patterns::{Label, PatternRegistry};
use crate::pipeline::types::Urgency;
use crate::text::FoldedText;

/// Which cue decided the urgency level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrgencySignal {
    pub level: Urgency,
    /// Phrase that decided the level; `None` when defaulted to `Baixa`.
    pub cue: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UrgencyAnalyzer {
    registry: Arc<PatternRegistry>,
}

impl UrgencyAnalyzer {
    pub fn new(registry: Arc<PatternRegistry>) -> Self {
        Self { registry }
    }

    pub fn signal(&self, text: &FoldedText<'_>) -> UrgencySignal {
        let haystack = text.folded();
        let low_spans = self.spans(Label::LowUrgency, haystack);

        let tiers = [
            (Label::HighUrgency, Urgency::High),
            (Label::MediumUrgency, Urgency::Medium),
        ];
        for (label, level) in tiers {
            for pattern in self.registry.patterns_for(label) {
                let needle = pattern.needle();
                let len = needle.as_str().len();
                let live = needle
                    .find_all(haystack)
                    .into_iter()
                    .any(|start| !inside_any(start..start + len, &low_spans));
                if live {
                    return UrgencySignal {
                        level,
                        cue: Some(pattern.phrase.clone()),
                    };
                }
            }
        }

        let cue = self
            .registry
            .patterns_for(Label::LowUrgency)
            .iter()
            .find(|p| p.is_in(text))
            .map(|p| p.phrase.clone());
        UrgencySignal {
            level: Urgency::Low,
            cue,
        }
    }

    pub fn analyze(&self, text: &FoldedText<'_>) -> Urgency {
        self.signal(text).level
    }

    /// Convenience entry point over a raw string.
    pub fn analyze_urgency(&self, text: &str) -> Urgency {
        self.analyze(&FoldedText::new(text))
    }

    fn spans(&self, label: Label, haystack: &str) -> Vec<Range<usize>> {
        self.registry
            .patterns_for(label)
            .iter()
            .flat_map(|p| {
                let len = p.needle().as_str().len();
                p.needle()
                    .find_all(haystack)
                    .into_iter()
                    .map(move |start| start..start + len)
            })
            .collect()
    }
}

fn inside_any(hit: Range<usize>, spans: &[Range<usize>]) -> bool {
    spans
        .iter()
        .any(|span| span.start <= hit.start && hit.end <= span.end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> UrgencyAnalyzer {
        UrgencyAnalyzer::new(Arc::new(PatternRegistry::builtin()))
    }

    #[test]
    fn high_cue_forces_alta() {
        assert_eq!(analyzer().analyze_urgency("urgente, preciso agora"), Urgency::High);
    }

    #[test]
    fn high_cue_is_not_diluted_by_long_text() {
        let filler = "Segue o texto com informações gerais sobre o projeto. ".repeat(60);
        let text = format!("{filler} Isso é urgente. {filler}");
        assert_eq!(analyzer().analyze_urgency(&text), Urgency::High);
    }

    #[test]
    fn high_beats_medium_and_low() {
        assert_eq!(
            analyzer().analyze_urgency("É importante, quando possível, mas resolva hoje."),
            Urgency::High
        );
    }

    #[test]
    fn medium_without_high() {
        let signal = analyzer().signal(&FoldedText::new("É importante revisar o contrato."));
        assert_eq!(signal.level, Urgency::Medium);
        assert_eq!(signal.cue.as_deref(), Some("importante"));
    }

    #[test]
    fn default_is_baixa() {
        let signal = analyzer().signal(&FoldedText::new("Segue o relatório mensal."));
        assert_eq!(signal.level, Urgency::Low);
        assert!(signal.cue.is_none());
    }

    #[test]
    fn low_cue_recorded_when_present() {
        let signal = analyzer().signal(&FoldedText::new("Responda quando puder, sem pressa."));
        assert_eq!(signal.level, Urgency::Low);
        assert_eq!(signal.cue.as_deref(), Some("quando puder"));
    }

    #[test]
    fn negated_high_cue_is_masked() {
        assert_eq!(
            analyzer().analyze_urgency("Não é urgente, pode ver na semana que vem."),
            Urgency::Low
        );
        assert_eq!(analyzer().analyze_urgency("Sem urgência nenhuma."), Urgency::Low);
    }

    #[test]
    fn masked_cue_elsewhere_still_counts() {
        assert_eq!(
            analyzer().analyze_urgency("Não é urgente o relatório, mas o servidor é urgente."),
            Urgency::High
        );
    }

    #[test]
    fn accent_insensitive() {
        assert_eq!(analyzer().analyze_urgency("EMERGENCIA no datacenter"), Urgency::High);
    }
}
