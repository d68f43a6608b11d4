//! Splitting a pasted thread into individual emails.
//!
//! Strategies are tried in order until one yields more than one email:
//! header blocks, separator lines, then large blank gaps. Otherwise the
//! whole text is a single email.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Texts with fewer non-blank characters than this yield no emails.
const MIN_THREAD_CHARS: usize = 10;
/// Separator blocks at or below this length are dropped.
const MIN_SEPARATOR_BLOCK_CHARS: usize = 10;
/// Blank-gap blocks shorter than this are dropped.
const MIN_GAP_BLOCK_CHARS: usize = 50;

static FROM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:from|de|remetente|sender):\s*(.+)$").unwrap());
static TO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:to|para|destinatário|destinatario|recipient):\s*(.+)$").unwrap()
});
static SUBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:subject|assunto|título|titulo):\s*(.+)$").unwrap()
});
static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:date|data|enviado em|sent):\s*(.+)$").unwrap()
});
static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:-{3,}|={3,}|\*{3,}|_{3,}|#{3,})$").unwrap());
static BLANK_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[ \t\r]*\n){2,}").unwrap());

/// How an email was carved out of the thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseMethod {
    Headers,
    Separators,
    BlankLines,
    SingleBlock,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadEmail {
    /// 1-based position in the thread.
    pub number: usize,
    pub from: Option<String>,
    pub to: Option<String>,
    pub subject: Option<String>,
    pub date: Option<String>,
    pub body: String,
    pub headers_found: bool,
    pub method: ParseMethod,
}

impl ThreadEmail {
    fn from_block(number: usize, body: &str, method: ParseMethod) -> Self {
        Self {
            number,
            from: header_in(body, &FROM, 5),
            to: None,
            subject: header_in(body, &SUBJECT, 10).or_else(|| subject_guess(body)),
            date: None,
            body: body.to_string(),
            headers_found: false,
            method,
        }
    }
}

/// Split `text` into its emails.
pub fn parse_thread(text: &str) -> Vec<ThreadEmail> {
    let trimmed = text.trim();
    if trimmed.chars().filter(|c| !c.is_whitespace()).count() < MIN_THREAD_CHARS {
        return Vec::new();
    }

    let strategies: [(ParseMethod, fn(&str) -> Vec<ThreadEmail>); 3] = [
        (ParseMethod::Headers, split_by_headers),
        (ParseMethod::Separators, split_by_separators),
        (ParseMethod::BlankLines, split_by_blank_lines),
    ];
    for (method, split) in strategies {
        let emails = split(text);
        if emails.len() > 1 {
            debug!(?method, emails = emails.len(), "Thread split");
            return emails;
        }
    }

    vec![ThreadEmail {
        number: 1,
        from: None,
        to: None,
        subject: None,
        date: None,
        body: trimmed.to_string(),
        headers_found: false,
        method: ParseMethod::SingleBlock,
    }]
}

fn capture(re: &Regex, line: &str) -> Option<String> {
    re.captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

#[derive(Debug, Default)]
struct Draft {
    from: String,
    to: Option<String>,
    subject: Option<String>,
    date: Option<String>,
    body: Vec<String>,
}

fn split_by_headers(text: &str) -> Vec<ThreadEmail> {
    let mut drafts: Vec<Draft> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(from) = capture(&FROM, trimmed) {
            drafts.push(Draft {
                from,
                ..Draft::default()
            });
            continue;
        }
        let Some(draft) = drafts.last_mut() else {
            continue;
        };

        // Header lines are only recognized before the body starts.
        if draft.body.is_empty() {
            if trimmed.is_empty() {
                continue;
            }
            if let Some(to) = capture(&TO, trimmed) {
                draft.to = Some(to);
                continue;
            }
            if let Some(subject) = capture(&SUBJECT, trimmed) {
                draft.subject = Some(subject);
                continue;
            }
            if let Some(date) = capture(&DATE, trimmed) {
                draft.date = Some(date);
                continue;
            }
        }
        draft.body.push(line.to_string());
    }

    drafts
        .into_iter()
        .enumerate()
        .map(|(i, draft)| ThreadEmail {
            number: i + 1,
            from: Some(draft.from),
            to: draft.to,
            subject: draft.subject,
            date: draft.date,
            body: draft.body.join("\n").trim().to_string(),
            headers_found: true,
            method: ParseMethod::Headers,
        })
        .collect()
}

fn split_by_separators(text: &str) -> Vec<ThreadEmail> {
    let mut blocks: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if SEPARATOR.is_match(line.trim()) {
            blocks.push(current.join("\n"));
            current.clear();
        } else {
            current.push(line);
        }
    }
    blocks.push(current.join("\n"));

    numbered(
        blocks.iter().map(|b| b.trim()).filter(|b| b.chars().count() > MIN_SEPARATOR_BLOCK_CHARS),
        ParseMethod::Separators,
    )
}

fn split_by_blank_lines(text: &str) -> Vec<ThreadEmail> {
    numbered(
        BLANK_GAP
            .split(text)
            .map(str::trim)
            .filter(|b| b.chars().count() >= MIN_GAP_BLOCK_CHARS),
        ParseMethod::BlankLines,
    )
}

fn numbered<'a>(blocks: impl Iterator<Item = &'a str>, method: ParseMethod) -> Vec<ThreadEmail> {
    blocks
        .enumerate()
        .map(|(i, body)| ThreadEmail::from_block(i + 1, body, method))
        .collect()
}

/// First matching header within the first `lines` lines of a block.
fn header_in(body: &str, re: &Regex, lines: usize) -> Option<String> {
    body.lines().take(lines).find_map(|line| capture(re, line.trim()))
}

/// First reasonably sized line, used as a subject when none is declared.
fn subject_guess(body: &str) -> Option<String> {
    body.lines()
        .take(10)
        .map(str::trim)
        .find(|line| (6..100).contains(&line.chars().count()))
        .map(str::to_string)
}
