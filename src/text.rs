//! Text normalization and phrase matching shared by every analyzer.
//!
//! Matching works on a *folded* copy of the input: Unicode NFD, combining
//! marks dropped, lowercased. Patterns are folded the same way, so
//! `urgencia` matches `URGÊNCIA`. Pure string work, no allocation beyond
//! the folded copy.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Fold a string for case- and accent-insensitive comparison.
pub fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whitespace-delimited token count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Length in Unicode scalar values.
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Collapse whitespace runs and cut to `max_chars`, preferring a word boundary.
pub fn preview(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }

    let cut: String = collapsed.chars().take(max_chars).collect();
    let head = match cut.rsplit_once(' ') {
        Some((head, _)) if !head.is_empty() => head,
        _ => cut.as_str(),
    };
    format!("{head}...")
}

/// Input text paired with its folded form.
///
/// Built once per call and handed to every analyzer, so the fold cost is
/// paid a single time per email.
#[derive(Debug, Clone)]
pub struct FoldedText<'a> {
    raw: &'a str,
    folded: String,
}

impl<'a> FoldedText<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self {
            raw,
            folded: fold(raw),
        }
    }

    /// The caller's original text.
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// Folded form used for matching.
    pub fn folded(&self) -> &str {
        &self.folded
    }

    pub fn is_blank(&self) -> bool {
        self.raw.trim().is_empty()
    }

    pub fn word_count(&self) -> usize {
        word_count(self.raw)
    }
}

/// A folded needle plus its boundary rules.
///
/// A needle whose first (or last) character is alphanumeric must sit on a
/// word boundary at that edge. `prefix` lifts the trailing boundary so
/// `anex` also matches `anexos`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Needle {
    text: String,
    prefix: bool,
}

impl Needle {
    /// Build a needle from a declared phrase. A trailing `*` marks a prefix.
    pub fn parse(phrase: &str) -> Self {
        let trimmed = phrase.trim();
        let (body, prefix) = match trimmed.strip_suffix('*') {
            Some(body) => (body.trim_end(), true),
            None => (trimmed, false),
        };
        Self {
            text: fold(body),
            prefix,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_prefix(&self) -> bool {
        self.prefix
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Byte offsets (into `haystack`) of every boundary-respecting occurrence.
    pub fn find_all(&self, haystack: &str) -> Vec<usize> {
        if self.text.is_empty() {
            return Vec::new();
        }

        let lead_boundary = self.text.chars().next().is_some_and(is_word_char);
        let trail_boundary = !self.prefix && self.text.chars().last().is_some_and(is_word_char);

        haystack
            .match_indices(self.text.as_str())
            .filter(|(start, matched)| {
                let end = start + matched.len();
                let before_ok = !lead_boundary
                    || haystack[..*start].chars().next_back().is_none_or(|c| !is_word_char(c));
                let after_ok =
                    !trail_boundary || haystack[end..].chars().next().is_none_or(|c| !is_word_char(c));
                before_ok && after_ok
            })
            .map(|(start, _)| start)
            .collect()
    }

    /// First boundary-respecting occurrence, if any.
    pub fn first_in(&self, haystack: &str) -> Option<usize> {
        self.find_all(haystack).into_iter().next()
    }

    pub fn is_in(&self, haystack: &str) -> bool {
        self.first_in(haystack).is_some()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
