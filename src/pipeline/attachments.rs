//! Attachment analyzer — mentions of enclosed files plus a risk check.

use std::ops::Range;
use std::sync::Arc;

use crate::pipeline::patterns::{Label, PatternRegistry};
use crate::pipeline::types::{
    AttachmentAnalysis, AttachmentContext, AttachmentPurpose, AttachmentTopic, RiskLevel,
};
use crate::text::{FoldedText, Needle};

/// Executable extensions whose mention raises the risk score.
const EXECUTABLE_EXTENSIONS: &[&str] = &[".exe", ".msi", ".bat", ".cmd", ".scr"];

/// Risk points added when an executable extension is mentioned.
const EXECUTABLE_RISK: u32 = 25;

/// Flag reported when an executable extension is mentioned.
const EXECUTABLE_FLAG: &str = "arquivo executável mencionado";

const TOPICS: &[(AttachmentTopic, &[&str])] = &[
    (AttachmentTopic::DocumentRequest, &[
        "preciso do documento", "envie o arquivo", "poderia anexar",
        "você poderia enviar", "me mande o arquivo", "solicito o documento",
    ]),
    (AttachmentTopic::Sharing, &[
        "segue anexo", "segue em anexo", "anexo solicitado", "documento anexado",
        "está anexo", "vai anexo", "encontra-se anexo", "conforme solicitado",
    ]),
    (AttachmentTopic::ProfessionalWork, &[
        "relatório", "planilha", "apresentação", "projeto", "análise",
        "dados", "resultado*", "estatística*", "levantamento", "pesquisa",
    ]),
    (AttachmentTopic::TechnicalSupport, &[
        "erro", "bug", "falha", "problema", "log", "logs", "debug",
        "screenshot", "print", "evidência", "captura",
    ]),
    (AttachmentTopic::Administrative, &[
        "contrato", "proposta", "orçamento", "fatura", "recibo",
        "documento fiscal", "comprovante", "certificado",
    ]),
    (AttachmentTopic::InternalCommunication, &[
        "ata de reunião", "memorando", "circular", "comunicado",
        "política", "procedimento", "manual", "diretriz",
    ]),
];

const PURPOSES: &[(AttachmentPurpose, &[&str])] = &[
    (AttachmentPurpose::Evidence, &["prova", "evidência", "comprovação", "demonstração"]),
    (AttachmentPurpose::Reference, &["consulta", "referência", "base", "modelo"]),
    (AttachmentPurpose::ActionRequired, &["revisar", "analisar", "verificar", "validar", "aprovar"]),
    (AttachmentPurpose::Information, &["informação", "informações", "dados", "detalhes", "especificação"]),
];

#[derive(Debug, Clone)]
pub struct AttachmentAnalyzer {
    registry: Arc<PatternRegistry>,
    executables: Vec<Needle>,
    topics: Vec<(AttachmentTopic, Vec<Needle>)>,
    purposes: Vec<(AttachmentPurpose, Vec<Needle>)>,
}

impl AttachmentAnalyzer {
    pub fn new(registry: Arc<PatternRegistry>) -> Self {
        Self {
            registry,
            executables: EXECUTABLE_EXTENSIONS.iter().map(|e| Needle::parse(e)).collect(),
            topics: needles(TOPICS),
            purposes: needles(PURPOSES),
        }
    }

    pub fn analyze(&self, text: &FoldedText<'_>) -> AttachmentAnalysis {
        let mentions = self.mentions(text);

        let mut attachment_keywords: Vec<String> = Vec::with_capacity(mentions.len());
        for mention in &mentions {
            if !attachment_keywords.iter().any(|k| k == mention.phrase) {
                attachment_keywords.push(mention.phrase.to_string());
            }
        }
        let score = mentions.len() as u32;

        let (security_risk, security_flags) = self.security(text);
        let context = self.context(text, score);

        AttachmentAnalysis {
            has_attachments_mentioned: !attachment_keywords.is_empty(),
            attachment_keywords,
            score,
            security_risk,
            security_flags,
            context,
        }
    }

    /// Convenience entry point over a raw string.
    pub fn analyze_attachments(&self, text: &str) -> AttachmentAnalysis {
        self.analyze(&FoldedText::new(text))
    }

    /// Every attachment mention, in text order. Longer phrases claim their
    /// span first; a hit overlapping an accepted one is dropped, so
    /// "segue em anexo" counts once rather than also as "em anexo" and "anexo".
    fn mentions<'r>(&'r self, text: &FoldedText<'_>) -> Vec<Mention<'r>> {
        let haystack = text.folded();
        let mut hits: Vec<Mention<'r>> = self
            .registry
            .patterns_for(Label::Attachment)
            .iter()
            .flat_map(|pattern| {
                let len = pattern.needle().as_str().len();
                pattern
                    .needle()
                    .find_all(haystack)
                    .into_iter()
                    .map(move |start| Mention {
                        span: start..start + len,
                        phrase: pattern.phrase.as_str(),
                    })
            })
            .collect();

        // Longest first; stable sort keeps declaration order among equals.
        hits.sort_by(|a, b| b.span.len().cmp(&a.span.len()).then(a.span.start.cmp(&b.span.start)));

        let mut accepted: Vec<Mention<'r>> = Vec::with_capacity(hits.len());
        for hit in hits {
            if !accepted.iter().any(|m| overlaps(&m.span, &hit.span)) {
                accepted.push(hit);
            }
        }
        accepted.sort_by_key(|m| m.span.start);
        accepted
    }

    fn context(&self, text: &FoldedText<'_>, mentions: u32) -> AttachmentContext {
        let haystack = text.folded();
        let contexts: Vec<AttachmentTopic> = self
            .topics
            .iter()
            .filter(|(_, needles)| needles.iter().any(|n| n.is_in(haystack)))
            .map(|(topic, _)| *topic)
            .collect();
        let purposes: Vec<AttachmentPurpose> = self
            .purposes
            .iter()
            .filter(|(_, needles)| needles.iter().any(|n| n.is_in(haystack)))
            .map(|(purpose, _)| *purpose)
            .collect();

        let words = text.word_count();
        let mention_density = if words == 0 {
            0.0
        } else {
            (f64::from(mentions) / words as f64 * 1000.0).round() / 10.0
        };

        AttachmentContext {
            context_score: (contexts.len() + purposes.len()) as u32,
            contexts,
            purposes,
            mention_density,
        }
    }

    fn security(&self, text: &FoldedText<'_>) -> (RiskLevel, Vec<String>) {
        let mut flags = self.registry.matched_phrases(Label::SuspiciousAttachment, text);
        let mut risk = self.registry.score(Label::SuspiciousAttachment, text);

        if self.executables.iter().any(|n| n.is_in(text.folded())) {
            risk += EXECUTABLE_RISK;
            flags.push(EXECUTABLE_FLAG.to_string());
        }

        (RiskLevel::from_score(risk), flags)
    }
}

struct Mention<'r> {
    span: Range<usize>,
    phrase: &'r str,
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

fn needles<T: Copy>(table: &[(T, &[&str])]) -> Vec<(T, Vec<Needle>)> {
    table
        .iter()
        .map(|(key, phrases)| (*key, phrases.iter().map(|p| Needle::parse(p)).collect()))
        .collect()
}
