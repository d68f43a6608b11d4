//! Extractive executive summary.
//!
//! Sentences are scored on importance keywords, dates, amounts, questions,
//! imperative openings, position and length; the best ones are returned in
//! document order. Key points are short fragments anchored on dates,
//! amounts, percentages and deadline words, found independently of the
//! sentence selection.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::text::{self, Needle, fold};

/// Bounds applied to the requested sentence count.
pub const MIN_SENTENCES: usize = 1;
pub const MAX_SENTENCES: usize = 10;

const MAX_KEY_POINTS: usize = 6;
const MAX_KEY_POINT_WORDS: usize = 8;

// ── Result types ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResult {
    /// Selected sentences, in document order.
    pub summary: Vec<String>,
    pub key_points: Vec<String>,
    /// Mean selected score over the best score, in [0, 1].
    pub relevance_score: f64,
    /// Percentage of words removed, one decimal.
    pub word_reduction: f64,
    pub original_word_count: usize,
    pub summary_word_count: usize,
    pub context: SummaryContext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommunicationType {
    #[serde(rename = "solicitação")]
    Request,
    #[serde(rename = "informativo")]
    Informative,
    #[serde(rename = "urgente")]
    Urgent,
    #[serde(rename = "feedback")]
    Feedback,
    #[serde(rename = "coordenação")]
    Coordination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Complexity {
    #[serde(rename = "baixa")]
    Low,
    #[serde(rename = "média")]
    Medium,
    #[serde(rename = "alta")]
    High,
}

impl Complexity {
    pub fn from_word_count(words: usize) -> Self {
        match words {
            0..50 => Self::Low,
            50..150 => Self::Medium,
            _ => Self::High,
        }
    }
}

/// Coarse description of the whole email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryContext {
    pub communication_types: Vec<CommunicationType>,
    pub complexity: Complexity,
    pub action_required: bool,
    pub has_deadline: bool,
    pub has_attachments_mentioned: bool,
    pub sentence_count: usize,
}

// ── Keyword tables ──────────────────────────────────────────────────

const IMPORTANCE: &[(&str, f64, &[&str])] = &[
    ("alta", 12.0, &[
        "urgente", "imediato", "crítico", "emergência", "agora", "hoje", "asap",
        "prioridade máxima", "extremamente importante", "não pode esperar",
    ]),
    ("acao", 10.0, &[
        "solicito", "precisa", "favor", "poderia", "gostaria", "requeiro",
        "ação necessária", "providenciar", "resolver", "atender", "executar",
    ]),
    ("tempo", 6.0, &[
        "prazo", "deadline", "até", "antes", "depois", "quando", "data",
        "cronograma", "agenda", "programação", "vencimento", "limite",
    ]),
    ("pessoa", 6.0, &[
        "reunião", "encontro", "conversar", "falar", "contato",
        "coordenação", "alinhamento", "discussão", "apresentação",
    ]),
    ("documento", 6.0, &[
        "relatório", "documento", "arquivo", "planilha",
        "anexo", "material", "dados", "informação", "detalhes",
    ]),
    ("problema", 6.0, &[
        "erro", "problema", "falha", "bug", "defeito", "inconsistência",
        "não funciona", "travou", "parou", "dificuldade",
    ]),
    ("projeto", 6.0, &[
        "projeto", "desenvolvimento", "implementação", "execução",
        "progresso", "andamento", "status", "situação", "evolução",
    ]),
    ("media", 6.0, &[
        "importante", "necessário", "preciso", "solicitação", "pedido",
        "fundamental", "essencial", "significativo", "relevante",
    ]),
];

const NOISE_WORDS: &[&str] = &[
    "o", "a", "os", "as", "um", "uma", "uns", "umas",
    "de", "da", "do", "das", "dos", "em", "na", "no", "para", "por",
    "e", "ou", "mas", "porque", "pois", "então", "assim",
    "eu", "tu", "ele", "ela", "nós", "vós", "eles", "elas", "me", "te", "se",
];

const ACTION_OPENERS: &[&str] = &[
    "solicito", "preciso", "gostaria", "peço", "requeiro", "por favor", "favor", "poderia",
];

const COMMUNICATION: &[(CommunicationType, &[&str])] = &[
    (CommunicationType::Request, &["solicito", "preciso", "gostaria", "poderia", "favor"]),
    (CommunicationType::Informative, &["informo", "comunico", "aviso", "notificação"]),
    (CommunicationType::Urgent, &["urgente", "imediato", "emergência", "crítico"]),
    (CommunicationType::Feedback, &["opinião", "parecer", "avaliação", "feedback"]),
    (CommunicationType::Coordination, &["coordenação", "alinhamento", "próximos passos"]),
];

const ACTION_REQUIRED: &[&str] = &["ação necessária", "preciso", "solicito", "favor", "poderia"];
const DEADLINE_WORDS: &[&str] = &["prazo", "deadline", "até", "vence", "vencimento", "limite"];
const ATTACHMENT_WORDS: &[&str] = &["anex*", "arquivo", "documento", "planilha"];

/// Abbreviations whose trailing period does not end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "sr", "sra", "srta", "dr", "dra", "prof", "profa", "eng", "exmo", "exma", "av", "ex",
    "obs", "pág", "pag", "nº", "n", "no", "tel", "ltda", "cia", "etc", "vs", "att", "atte",
    "jr", "min", "máx", "max", "aprox", "dept", "depto",
];

static FOLDED_ABBREVIATIONS: LazyLock<HashSet<String>> =
    LazyLock::new(|| ABBREVIATIONS.iter().map(|a| fold(a)).collect());

// Scoring regexes run on folded text; key-point regexes on the raw text.
static PARAGRAPH_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n[ \t\r]*\n").unwrap());
static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b\d{1,2}/\d{1,2}(?:/\d{2,4})?\b|\b\d{1,2} de (?:janeiro|fevereiro|marco|abril|maio|junho|julho|agosto|setembro|outubro|novembro|dezembro)\b",
    )
    .unwrap()
});
static CURRENCY_CUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"r\$|\breais\b|\bvalor\b|\bpreco\b").unwrap());
static AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"r\$\s?\d[\d.,]*|\d[\d.,]*\s?reais\b").unwrap());
static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").unwrap());

static KP_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b\d{1,2}/\d{1,2}(?:/\d{2,4})?\b|\b\d{1,2} de (?:janeiro|fevereiro|março|marco|abril|maio|junho|julho|agosto|setembro|outubro|novembro|dezembro)\b",
    )
    .unwrap()
});
static KP_CURRENCY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)R\$\s?\d[\d.,]*|\b\d[\d.,]*\s?reais\b").unwrap());
static KP_PERCENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+(?:[.,]\d+)?\s?%").unwrap());
static KP_DEADLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:prazo|deadline|vencimento|vence|data\s+limite|entrega)\b").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    /// Fragment runs forward from the keyword.
    Deadline,
    /// Fragment surrounds the match.
    Value,
}

#[derive(Debug, Clone)]
struct KeywordGroup {
    weight: f64,
    needles: Vec<Needle>,
}

fn needles(phrases: &[&str]) -> Vec<Needle> {
    phrases.iter().map(|p| Needle::parse(p)).collect()
}

fn any_in(needles: &[Needle], folded: &str) -> bool {
    needles.iter().any(|n| n.is_in(folded))
}

// ── Extractor ───────────────────────────────────────────────────────

/// Sentence-ranking summarizer. Holds only compiled keyword tables.
#[derive(Debug, Clone)]
pub struct SummaryExtractor {
    importance: Vec<KeywordGroup>,
    noise: HashSet<String>,
    openers: Vec<Needle>,
    communication: Vec<(CommunicationType, Vec<Needle>)>,
    action_required: Vec<Needle>,
    deadline: Vec<Needle>,
    attachments: Vec<Needle>,
}

impl Default for SummaryExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SummaryExtractor {
    pub fn new() -> Self {
        Self {
            importance: IMPORTANCE
                .iter()
                .map(|(_, weight, words)| KeywordGroup {
                    weight: *weight,
                    needles: needles(words),
                })
                .collect(),
            noise: NOISE_WORDS.iter().map(|w| fold(w)).collect(),
            openers: needles(ACTION_OPENERS),
            communication: COMMUNICATION
                .iter()
                .map(|(kind, words)| (*kind, needles(words)))
                .collect(),
            action_required: needles(ACTION_REQUIRED),
            deadline: needles(DEADLINE_WORDS),
            attachments: needles(ATTACHMENT_WORDS),
        }
    }

    /// Summarize `text` into at most `max_sentences` sentences (clamped to 1..=10).
    pub fn summarize(&self, text: &str, max_sentences: usize) -> SummaryResult {
        let limit = max_sentences.clamp(MIN_SENTENCES, MAX_SENTENCES);
        let sentences = split_sentences(text);
        let scores = self.score_sentences(&sentences);
        let selected = select_top(&scores, limit);

        let summary: Vec<String> = selected.iter().map(|&i| sentences[i].clone()).collect();
        let original_word_count = text::word_count(text);
        let summary_word_count = summary.iter().map(|s| text::word_count(s)).sum();

        debug!(
            sentences = sentences.len(),
            selected = summary.len(),
            original_word_count,
            "Summary extracted"
        );

        SummaryResult {
            relevance_score: relevance(&scores, &selected),
            word_reduction: word_reduction(original_word_count, summary_word_count),
            key_points: key_points(&sentences),
            context: self.context(text, sentences.len()),
            summary,
            original_word_count,
            summary_word_count,
        }
    }

    /// Score of every sentence, in document order. Never negative.
    pub fn score_sentences(&self, sentences: &[String]) -> Vec<f64> {
        let total = sentences.len();
        let first_third = total * 3 / 10;

        sentences
            .iter()
            .enumerate()
            .map(|(i, sentence)| {
                let folded = fold(sentence);
                let words = text::word_count(sentence);

                let position = if i == 0 {
                    15.0
                } else if i + 1 == total {
                    10.0
                } else if i < first_third {
                    8.0
                } else {
                    0.0
                };

                let mut important = 0usize;
                let mut keywords = 0.0;
                for group in &self.importance {
                    let hits = group.needles.iter().filter(|n| n.is_in(&folded)).count();
                    important += hits;
                    keywords += hits as f64 * group.weight;
                }

                let mut patterns = 0.0;
                if DATE.is_match(&folded) {
                    patterns += 10.0;
                }
                if CURRENCY_CUE.is_match(&folded) {
                    patterns += 8.0;
                }
                let undated = DATE.replace_all(&folded, " ");
                if DIGITS.is_match(&AMOUNT.replace_all(&undated, " ")) {
                    patterns += 8.0;
                }
                if sentence.contains('?') {
                    patterns += 7.0;
                }
                if self.opens_with_action(&folded) {
                    patterns += 12.0;
                }

                let length = match words {
                    8..=25 => 5.0,
                    31.. => -3.0,
                    0..4 => -5.0,
                    _ => 0.0,
                };

                let density = if words > 0 {
                    let noise = self.noise_count(&folded) as f64;
                    10.0 * (important as f64 - noise) / words as f64
                } else {
                    0.0
                };

                (position + keywords + patterns + length + density).max(0.0)
            })
            .collect()
    }

    fn opens_with_action(&self, folded: &str) -> bool {
        let head = folded.trim_start_matches(|c: char| !c.is_alphanumeric());
        self.openers.iter().any(|n| n.first_in(head) == Some(0))
    }

    fn noise_count(&self, folded: &str) -> usize {
        folded
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect::<HashSet<_>>()
            .into_iter()
            .filter(|w| self.noise.contains(*w))
            .count()
    }

    pub fn context(&self, text: &str, sentence_count: usize) -> SummaryContext {
        let folded = fold(text);
        SummaryContext {
            communication_types: self
                .communication
                .iter()
                .filter(|(_, words)| any_in(words, &folded))
                .map(|(kind, _)| *kind)
                .collect(),
            complexity: Complexity::from_word_count(text::word_count(text)),
            action_required: any_in(&self.action_required, &folded),
            has_deadline: any_in(&self.deadline, &folded),
            has_attachments_mentioned: any_in(&self.attachments, &folded),
            sentence_count,
        }
    }
}

// ── Segmentation ────────────────────────────────────────────────────

/// Split text into whitespace-collapsed sentences.
///
/// `.`, `!` and `?` end a sentence when followed by whitespace or the end
/// of text; a blank line always does. A lone period after an initial, an
/// ordinal or a known abbreviation does not.
pub fn split_sentences(text: &str) -> Vec<String> {
    PARAGRAPH_BREAK
        .split(text)
        .flat_map(split_paragraph)
        .collect()
}

fn split_paragraph(paragraph: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = paragraph.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !is_terminator(c) {
            continue;
        }

        let mut end = i + c.len_utf8();
        let mut run = 1;
        while let Some(&(j, next)) = chars.peek() {
            if is_terminator(next) {
                run += 1;
            } else if !is_closer(next) {
                break;
            }
            end = j + next.len_utf8();
            chars.next();
        }

        if !paragraph[end..].chars().next().is_none_or(char::is_whitespace) {
            continue;
        }
        if c == '.' && run == 1 && !period_ends_sentence(&paragraph[start..i]) {
            continue;
        }

        push_sentence(&mut sentences, &paragraph[start..end]);
        start = end;
    }

    push_sentence(&mut sentences, &paragraph[start..]);
    sentences
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn is_closer(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '”' | '’' | '»')
}

/// `before` is the sentence text up to (not including) the period.
fn period_ends_sentence(before: &str) -> bool {
    let Some(token) = before.split_whitespace().next_back() else {
        return true;
    };
    let token = token.trim_start_matches(|c: char| !c.is_alphanumeric());

    let mut chars = token.chars();
    if let (Some(only), None) = (chars.next(), chars.next()) {
        if only.is_alphabetic() {
            return false;
        }
    }
    if token.ends_with(['º', 'ª']) {
        return false;
    }
    !FOLDED_ABBREVIATIONS.contains(&fold(token))
}

fn push_sentence(sentences: &mut Vec<String>, raw: &str) {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if !collapsed.is_empty() {
        sentences.push(collapsed);
    }
}

// ── Selection and metrics ───────────────────────────────────────────

/// Indices of the best `limit` sentences, in document order.
fn select_top(scores: &[f64], limit: usize) -> Vec<usize> {
    let mut ranked: Vec<usize> = (0..scores.len()).collect();
    // Stable sort: equal scores keep the earlier sentence first.
    ranked.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    ranked.truncate(limit);
    ranked.sort_unstable();
    ranked
}

fn relevance(scores: &[f64], selected: &[usize]) -> f64 {
    let max = scores.iter().copied().fold(0.0, f64::max);
    if selected.is_empty() || max <= 0.0 {
        return 0.0;
    }
    let mean = selected.iter().map(|&i| scores[i]).sum::<f64>() / selected.len() as f64;
    (mean / max).clamp(0.0, 1.0)
}

fn word_reduction(original: usize, summary: usize) -> f64 {
    if original == 0 {
        return 0.0;
    }
    let reduction = (1.0 - summary as f64 / original as f64) * 100.0;
    // Rounding must not turn 99.95 and above into a full reduction.
    ((reduction * 10.0).round() / 10.0).clamp(0.0, 99.9)
}

// ── Key points ──────────────────────────────────────────────────────

fn key_points(sentences: &[String]) -> Vec<String> {
    let mut points: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for sentence in sentences {
        for fragment in fragments(sentence) {
            if seen.insert(fold(&fragment)) {
                points.push(fragment);
                if points.len() == MAX_KEY_POINTS {
                    return points;
                }
            }
        }
    }
    points
}

fn fragments(sentence: &str) -> Vec<String> {
    let mut anchors: Vec<(usize, usize, Anchor)> = Vec::new();
    for m in KP_DEADLINE.find_iter(sentence) {
        anchors.push((m.start(), m.end(), Anchor::Deadline));
    }
    for re in [&*KP_DATE, &*KP_CURRENCY, &*KP_PERCENT] {
        anchors.extend(re.find_iter(sentence).map(|m| (m.start(), m.end(), Anchor::Value)));
    }
    if anchors.is_empty() {
        return Vec::new();
    }
    anchors.sort_by_key(|(start, _, _)| *start);

    let words = word_spans(sentence);
    let mut covered = 0;
    let mut out = Vec::new();

    for (start, end, anchor) in anchors {
        if start < covered {
            continue;
        }
        let Some(first) = words.iter().position(|&(_, e)| e > start) else {
            continue;
        };
        let last = words.iter().rposition(|&(s, _)| s < end).unwrap_or(first).max(first);

        let (mut lo, mut hi) = match anchor {
            Anchor::Deadline => (first, first + MAX_KEY_POINT_WORDS - 1),
            Anchor::Value => (first.saturating_sub(3), last + 3),
        };
        hi = hi.min(words.len() - 1);
        while hi - lo + 1 > MAX_KEY_POINT_WORDS {
            if lo < first {
                lo += 1;
            } else {
                hi -= 1;
            }
        }

        covered = words[hi].1;
        let fragment = sentence[words[lo].0..words[hi].1]
            .trim_end_matches([',', ';', ':', '.', '!', '?']);
        if !fragment.is_empty() {
            out.push(capitalize(fragment));
        }
    }
    out
}

fn word_spans(s: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;
    for (i, c) in s.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(st)) => {
                spans.push((st, i));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(st) = start {
        spans.push((st, s.len()));
    }
    spans
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
