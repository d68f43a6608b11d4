//! Suggested replies.
//!
//! Templates are looked up with decreasing specificity:
//! exact → any urgency → any tone → category generic → universal.
//! Rendering is plain placeholder substitution, so the same classification
//! always yields the same text.

pub mod templates;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::pipeline::types::{Category, Subcategory, Tone, Urgency};
use templates::{ENTRIES, TemplateEntry, UNIVERSAL};

const GREETING: &str = "Olá,";
const NEGATIVE_OPENER: &str = "Lamentamos qualquer inconveniente. ";

/// What the caller should do with the suggested reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    /// Send as-is.
    Automated,
    /// Spam: nothing should be sent.
    NoResponse,
    /// Hand to a person before replying.
    Escalated,
}

/// Classify the reply that goes with a classification.
pub fn response_kind(subcategory: Subcategory, tone: Tone, urgency: Urgency) -> ResponseKind {
    match (subcategory, tone, urgency) {
        (Subcategory::Spam, _, _) => ResponseKind::NoResponse,
        (Subcategory::TechnicalSupport | Subcategory::Task, _, Urgency::High) => {
            ResponseKind::Escalated
        }
        (s, Tone::Negative, Urgency::High) if s.category() == Category::Productive => {
            ResponseKind::Escalated
        }
        _ => ResponseKind::Automated,
    }
}

/// How specific the template that was picked is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Specificity {
    Exact,
    AnyUrgency,
    AnyTone,
    Category,
    Universal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TemplateKey {
    category: Category,
    subcategory: Option<Subcategory>,
    tone: Option<Tone>,
    urgency: Option<Urgency>,
}

/// Template lookup and rendering.
#[derive(Debug, Clone)]
pub struct ResponseGenerator {
    templates: HashMap<TemplateKey, &'static str>,
}

impl Default for ResponseGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseGenerator {
    /// Generator over the built-in template table.
    pub fn new() -> Self {
        Self::from_entries(ENTRIES)
    }

    /// Entries with any tone but a concrete urgency are expanded per tone;
    /// an entry naming the tone explicitly takes precedence.
    pub fn from_entries(entries: &[TemplateEntry]) -> Self {
        let mut templates = HashMap::new();
        for entry in entries.iter().filter(|e| !(e.tone.is_none() && e.urgency.is_some())) {
            templates.insert(key(entry, entry.tone), entry.text);
        }
        for entry in entries.iter().filter(|e| e.tone.is_none() && e.urgency.is_some()) {
            for tone in Tone::ALL {
                templates.entry(key(entry, Some(tone))).or_insert(entry.text);
            }
        }
        Self { templates }
    }

    /// Reply for a classification. Never empty.
    pub fn generate(
        &self,
        category: Category,
        subcategory: Subcategory,
        tone: Tone,
        urgency: Urgency,
    ) -> String {
        self.render(category, Some(subcategory), Some(tone), Some(urgency))
    }

    /// Same as [`generate`](Self::generate) over free-form labels. A label
    /// that does not parse is treated as "no template for that axis"; an
    /// unknown category goes straight to the universal reply.
    pub fn generate_from_labels(
        &self,
        category: &str,
        subcategory: &str,
        tone: &str,
        urgency: &str,
    ) -> String {
        let Ok(category) = category.parse::<Category>() else {
            debug!(category, "Unknown category label, using universal reply");
            return UNIVERSAL.to_string();
        };
        self.render(
            category,
            subcategory.parse().ok(),
            tone.parse().ok(),
            urgency.parse().ok(),
        )
    }

    /// Pick the most specific template available.
    pub fn resolve(
        &self,
        category: Category,
        subcategory: Option<Subcategory>,
        tone: Option<Tone>,
        urgency: Option<Urgency>,
    ) -> (Specificity, &'static str) {
        let at = |subcategory: Option<Subcategory>, tone: Option<Tone>, urgency: Option<Urgency>| {
            self.templates.get(&TemplateKey {
                category,
                subcategory,
                tone,
                urgency,
            })
        };

        let mut candidates: Vec<(Specificity, Option<&&'static str>)> = Vec::with_capacity(4);
        if let Some(sub) = subcategory {
            if let Some(tone) = tone {
                if urgency.is_some() {
                    candidates.push((Specificity::Exact, at(Some(sub), Some(tone), urgency)));
                }
                candidates.push((Specificity::AnyUrgency, at(Some(sub), Some(tone), None)));
            }
            candidates.push((Specificity::AnyTone, at(Some(sub), None, None)));
        }
        candidates.push((Specificity::Category, at(None, None, None)));

        candidates
            .into_iter()
            .find_map(|(level, text)| text.map(|t| (level, *t)))
            .unwrap_or((Specificity::Universal, UNIVERSAL))
    }

    fn render(
        &self,
        category: Category,
        subcategory: Option<Subcategory>,
        tone: Option<Tone>,
        urgency: Option<Urgency>,
    ) -> String {
        let (level, template) = self.resolve(category, subcategory, tone, urgency);
        debug!(?level, category = category.as_str(), "Reply template selected");
        fill(template, tone, urgency)
    }
}

fn key(entry: &TemplateEntry, tone: Option<Tone>) -> TemplateKey {
    TemplateKey {
        category: entry.category,
        subcategory: entry.subcategory,
        tone,
        urgency: entry.urgency,
    }
}

fn deadline(urgency: Urgency) -> &'static str {
    match urgency {
        Urgency::High => "Tempo estimado de retorno: até 2 horas.",
        Urgency::Medium => "Tempo estimado de retorno: até 24 horas.",
        Urgency::Low => "Tempo estimado de retorno: até 48 horas.",
    }
}

/// Substitute the known placeholders; anything else in braces stays.
fn fill(template: &str, tone: Option<Tone>, urgency: Option<Urgency>) -> String {
    let opener = match tone {
        Some(Tone::Negative) => NEGATIVE_OPENER,
        _ => "",
    };
    let rendered = template
        .replace("{saudacao}", GREETING)
        .replace("{abertura}", opener)
        .replace("{prazo}", urgency.map(deadline).unwrap_or(""));

    // Empty substitutions leave doubled or trailing spaces behind.
    let rendered = rendered.split(' ').filter(|w| !w.is_empty()).collect::<Vec<_>>().join(" ");
    if rendered.is_empty() {
        UNIVERSAL.to_string()
    } else {
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> ResponseGenerator {
        ResponseGenerator::new()
    }

    #[test]
    fn never_empty_for_any_combination() {
        let g = generator();
        for category in Category::ALL {
            for sub in Subcategory::ALL {
                for tone in Tone::ALL {
                    for urgency in Urgency::ALL {
                        let reply = g.generate(category, sub, tone, urgency);
                        assert!(!reply.trim().is_empty());
                        assert!(!reply.contains("{saudacao}"));
                        assert!(!reply.contains("{prazo}"));
                    }
                }
            }
        }
    }

    #[test]
    fn exact_match_for_urgent_support() {
        let g = generator();
        let (level, _) = g.resolve(
            Category::Productive,
            Some(Subcategory::TechnicalSupport),
            Some(Tone::Neutral),
            Some(Urgency::High),
        );
        assert_eq!(level, Specificity::Exact);

        let reply = g.generate(
            Category::Productive,
            Subcategory::TechnicalSupport,
            Tone::Neutral,
            Urgency::High,
        );
        assert!(reply.starts_with("Olá, Recebemos sua solicitação de suporte técnico urgente"));
        assert!(reply.ends_with("até 2 horas."));
    }

    #[test]
    fn explicit_tone_entry_beats_expanded_one() {
        let reply = generator().generate(
            Category::Productive,
            Subcategory::TechnicalSupport,
            Tone::Negative,
            Urgency::High,
        );
        assert!(reply.contains("Lamentamos profundamente o transtorno"));
    }

    #[test]
    fn relaxes_to_any_tone() {
        let (level, text) = generator().resolve(
            Category::Productive,
            Some(Subcategory::Question),
            Some(Tone::Positive),
            Some(Urgency::Low),
        );
        assert_eq!(level, Specificity::AnyTone);
        assert!(text.contains("sua pergunta"));
    }

    #[test]
    fn relaxes_to_any_urgency() {
        let (level, text) = generator().resolve(
            Category::Social,
            Some(Subcategory::Conversation),
            Some(Tone::Negative),
            Some(Urgency::Medium),
        );
        assert_eq!(level, Specificity::AnyUrgency);
        assert!(text.contains("momento difícil"));
    }

    #[test]
    fn falls_back_to_category_generic() {
        // Subcategory from another category has no entry under this one.
        let (level, _) = generator().resolve(
            Category::Social,
            Some(Subcategory::Task),
            Some(Tone::Neutral),
            Some(Urgency::Low),
        );
        assert_eq!(level, Specificity::Category);
    }

    #[test]
    fn falls_back_to_universal() {
        let g = ResponseGenerator::from_entries(&[]);
        let reply = g.generate(Category::Productive, Subcategory::Task, Tone::Neutral, Urgency::Low);
        assert_eq!(reply, UNIVERSAL);
    }

    #[test]
    fn negative_opener_and_deadline() {
        let reply = generator().generate(
            Category::Productive,
            Subcategory::Task,
            Tone::Negative,
            Urgency::Medium,
        );
        assert_eq!(
            reply,
            "Olá, Lamentamos qualquer inconveniente. Recebemos sua solicitação e ela foi \
             encaminhada ao setor responsável. Tempo estimado de retorno: até 24 horas."
        );
    }

    #[test]
    fn spam_reply_has_no_greeting() {
        let reply = generator().generate(
            Category::Unproductive,
            Subcategory::Spam,
            Tone::Positive,
            Urgency::High,
        );
        assert_eq!(reply, "Email identificado como spam - nenhuma resposta será enviada.");
    }

    #[test]
    fn deterministic() {
        let g = generator();
        let a = g.generate(Category::Social, Subcategory::Invitation, Tone::Positive, Urgency::Low);
        let b = g.generate(Category::Social, Subcategory::Invitation, Tone::Positive, Urgency::Low);
        assert_eq!(a, b);
    }

    #[test]
    fn labels_are_parsed_leniently() {
        let g = generator();
        let from_labels = g.generate_from_labels("produtivo", "Suporte Tecnico", "neutro", "alta");
        let typed = g.generate(
            Category::Productive,
            Subcategory::TechnicalSupport,
            Tone::Neutral,
            Urgency::High,
        );
        assert_eq!(from_labels, typed);
    }

    #[test]
    fn unknown_category_label_gives_universal() {
        assert_eq!(generator().generate_from_labels("Qualquer", "x", "y", "z"), UNIVERSAL);
    }

    #[test]
    fn unknown_urgency_label_drops_deadline() {
        let reply = generator().generate_from_labels("Produtivo", "Dúvida", "Neutro", "???");
        assert!(reply.contains("sua pergunta"));
        assert!(!reply.contains("Tempo estimado"));
        assert!(!reply.contains("  "));
    }

    #[test]
    fn unknown_placeholder_left_verbatim() {
        let entries = [TemplateEntry {
            category: Category::Social,
            subcategory: None,
            tone: None,
            urgency: None,
            text: "{saudacao} até {amanha}",
        }];
        let g = ResponseGenerator::from_entries(&entries);
        let reply = g.generate(Category::Social, Subcategory::Gratitude, Tone::Neutral, Urgency::Low);
        assert_eq!(reply, "Olá, até {amanha}");
    }

    #[test]
    fn response_kinds() {
        assert_eq!(
            response_kind(Subcategory::Spam, Tone::Neutral, Urgency::High),
            ResponseKind::NoResponse
        );
        assert_eq!(
            response_kind(Subcategory::TechnicalSupport, Tone::Neutral, Urgency::High),
            ResponseKind::Escalated
        );
        assert_eq!(
            response_kind(Subcategory::Task, Tone::Positive, Urgency::High),
            ResponseKind::Escalated
        );
        assert_eq!(
            response_kind(Subcategory::Question, Tone::Negative, Urgency::High),
            ResponseKind::Escalated
        );
        assert_eq!(
            response_kind(Subcategory::Question, Tone::Negative, Urgency::Medium),
            ResponseKind::Automated
        );
        assert_eq!(
            response_kind(Subcategory::Conversation, Tone::Negative, Urgency::High),
            ResponseKind::Automated
        );
    }
}
