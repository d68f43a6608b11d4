//! Batch runner — classify and answer many emails with per-item isolation.
//!
//! Items fan out on the blocking pool, at most `workers` at a time. A
//! panic or a validation failure in one item is recorded on that item and
//! never aborts the others. Oversized and empty batches are rejected whole.

use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{InputError, ItemError};
use crate::pipeline::classifier::Classifier;
use crate::pipeline::types::ClassificationResult;
use crate::reply::{ResponseGenerator, ResponseKind, response_kind};
use crate::text;

/// Hard cap on emails per batch.
pub const MAX_BATCH_SIZE: usize = 50;

/// Default number of items processed concurrently.
pub const DEFAULT_WORKERS: usize = 8;

/// Default minimum trimmed length of a batch item.
pub const DEFAULT_MIN_ITEM_CHARS: usize = 10;

/// Characters kept in each item's preview.
const PREVIEW_CHARS: usize = 120;

/// Everything produced for one successfully processed email.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedEmail {
    pub classification: ClassificationResult,
    pub suggested_response: String,
    pub response_kind: ResponseKind,
}

/// Per-item work of a batch.
pub trait EmailProcessor: Send + Sync {
    fn process(&self, text: &str) -> Result<ProcessedEmail, ItemError>;
}

/// Classifier followed by the response generator.
#[derive(Debug, Clone)]
pub struct TriageProcessor {
    classifier: Classifier,
    responder: ResponseGenerator,
}

impl TriageProcessor {
    pub fn new(classifier: Classifier, responder: ResponseGenerator) -> Self {
        Self {
            classifier,
            responder,
        }
    }
}

impl EmailProcessor for TriageProcessor {
    fn process(&self, text: &str) -> Result<ProcessedEmail, ItemError> {
        let classification = self.classifier.classify(text);
        let suggested_response = self.responder.generate(
            classification.category,
            classification.subcategory,
            classification.tone,
            classification.urgency,
        );
        Ok(ProcessedEmail {
            response_kind: response_kind(
                classification.subcategory,
                classification.tone,
                classification.urgency,
            ),
            suggested_response,
            classification,
        })
    }
}

// ── Report ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    Success(ProcessedEmail),
    Failure {
        #[serde(serialize_with = "display")]
        error: ItemError,
    },
}

fn display<S: Serializer>(error: &ItemError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    /// Position in the submitted batch, 0-based.
    pub index: usize,
    pub preview: String,
    #[serde(flatten)]
    pub outcome: ItemOutcome,
}

impl BatchItem {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ItemOutcome::Success(_))
    }

    pub fn error(&self) -> Option<&ItemError> {
        match &self.outcome {
            ItemOutcome::Failure { error } => Some(error),
            ItemOutcome::Success(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub request_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub elapsed_ms: u64,
    /// One entry per submitted email, in submission order.
    pub items: Vec<BatchItem>,
}

// ── Runner ──────────────────────────────────────────────────────────

type Outcome = Result<ProcessedEmail, ItemError>;

pub struct BatchRunner {
    processor: Arc<dyn EmailProcessor>,
    limit: usize,
    workers: usize,
    timeout: Option<Duration>,
    min_chars: usize,
}

impl BatchRunner {
    pub fn new(processor: Arc<dyn EmailProcessor>) -> Self {
        Self {
            processor,
            limit: MAX_BATCH_SIZE,
            workers: DEFAULT_WORKERS,
            timeout: None,
            min_chars: DEFAULT_MIN_ITEM_CHARS,
        }
    }

    /// Batch size limit; never above [`MAX_BATCH_SIZE`].
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.min(MAX_BATCH_SIZE);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Overall deadline; items unfinished when it expires fail.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Process every email. Rejects empty and oversized batches.
    pub async fn run(&self, texts: Vec<String>) -> Result<BatchReport, InputError> {
        if texts.is_empty() {
            return Err(InputError::EmptyBatch);
        }
        if texts.len() > self.limit {
            warn!(size = texts.len(), limit = self.limit, "Rejecting oversized batch");
            return Err(InputError::BatchTooLarge {
                size: texts.len(),
                limit: self.limit,
            });
        }

        let request_id = Uuid::new_v4();
        let started_at = Utc::now();
        let clock = Instant::now();
        let total = texts.len();
        info!(%request_id, total, workers = self.workers, "Processing email batch");

        let previews: Vec<String> = texts.iter().map(|t| text::preview(t, PREVIEW_CHARS)).collect();
        let mut outcomes: Vec<Option<Outcome>> = (0..total).map(|_| None).collect();
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();

        for (index, body) in texts.into_iter().enumerate() {
            let chars = text::char_count(body.trim());
            if chars < self.min_chars {
                outcomes[index] = Some(Err(ItemError::TooShort {
                    chars,
                    min: self.min_chars,
                }));
                continue;
            }

            let processor = Arc::clone(&self.processor);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => process_blocking(processor, body).await,
                    Err(e) => Err(ItemError::Failed(e.to_string())),
                };
                (index, outcome)
            });
        }

        let deadline = self.timeout.map(|t| tokio::time::Instant::now() + t);
        let mut timed_out = false;
        loop {
            let next = match deadline {
                Some(at) => match tokio::time::timeout_at(at, tasks.join_next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        timed_out = true;
                        break;
                    }
                },
                None => tasks.join_next().await,
            };
            match next {
                Some(Ok((index, outcome))) => outcomes[index] = Some(outcome),
                Some(Err(e)) => warn!(%request_id, error = %e, "Batch task failed to join"),
                None => break,
            }
        }
        if timed_out {
            warn!(%request_id, pending = tasks.len(), "Batch deadline exceeded");
            tasks.abort_all();
        }

        let items: Vec<BatchItem> = outcomes
            .into_iter()
            .zip(previews)
            .enumerate()
            .map(|(index, (outcome, preview))| {
                let outcome = outcome.unwrap_or_else(|| {
                    Err(if timed_out {
                        ItemError::DeadlineExceeded
                    } else {
                        ItemError::Failed("task did not complete".to_string())
                    })
                });
                let outcome = match outcome {
                    Ok(processed) => ItemOutcome::Success(processed),
                    Err(error) => {
                        warn!(%request_id, index, error = %error, "Batch item failed");
                        ItemOutcome::Failure { error }
                    }
                };
                BatchItem {
                    index,
                    preview,
                    outcome,
                }
            })
            .collect();

        let successful = items.iter().filter(|i| i.is_success()).count();
        let report = BatchReport {
            request_id,
            started_at,
            total,
            successful,
            failed: total - successful,
            elapsed_ms: elapsed_millis(clock.elapsed()),
            items,
        };

        info!(
            %request_id,
            successful = report.successful,
            failed = report.failed,
            elapsed_ms = report.elapsed_ms,
            "Batch processing complete"
        );
        Ok(report)
    }
}

/// Run one item on the blocking pool; a panic becomes an item failure.
async fn process_blocking(processor: Arc<dyn EmailProcessor>, body: String) -> Outcome {
    match tokio::task::spawn_blocking(move || processor.process(&body)).await {
        Ok(outcome) => outcome,
        Err(e) if e.is_panic() => Err(ItemError::Panicked(panic_message(e.into_panic()))),
        Err(e) => Err(ItemError::Failed(e.to_string())),
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn elapsed_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::patterns::PatternRegistry;
    use crate::pipeline::types::Subcategory;

    fn runner() -> BatchRunner {
        let processor = TriageProcessor::new(
            Classifier::new(Arc::new(PatternRegistry::builtin())),
            ResponseGenerator::new(),
        );
        BatchRunner::new(Arc::new(processor))
    }

    fn emails(n: usize) -> Vec<String> {
        (0..n)
            .map(|i| format!("Bom dia, poderia enviar o relatório número {i} até sexta?"))
            .collect()
    }

    /// Panics on "boom", sleeps on "slow", otherwise delegates.
    struct Flaky(TriageProcessor);

    impl EmailProcessor for Flaky {
        fn process(&self, text: &str) -> Result<ProcessedEmail, ItemError> {
            if text.contains("boom") {
                panic!("pattern engine exploded");
            }
            if text.contains("slow") {
                std::thread::sleep(Duration::from_millis(300));
            }
            self.0.process(text)
        }
    }

    fn flaky_runner() -> BatchRunner {
        let inner = TriageProcessor::new(
            Classifier::new(Arc::new(PatternRegistry::builtin())),
            ResponseGenerator::new(),
        );
        BatchRunner::new(Arc::new(Flaky(inner))).with_workers(4)
    }

    #[tokio::test]
    async fn all_items_succeed() {
        let report = runner().run(emails(5)).await.unwrap();
        assert_eq!(report.total, 5);
        assert_eq!(report.successful, 5);
        assert_eq!(report.failed, 0);
        assert!(report.items.iter().enumerate().all(|(i, item)| item.index == i));
    }

    #[tokio::test]
    async fn rejects_oversized_batch() {
        let err = runner().run(emails(MAX_BATCH_SIZE + 1)).await.unwrap_err();
        assert!(matches!(err, InputError::BatchTooLarge { size: 51, limit: 50 }));
    }

    #[tokio::test]
    async fn rejects_empty_batch() {
        let err = runner().run(Vec::new()).await.unwrap_err();
        assert!(matches!(err, InputError::EmptyBatch));
    }

    #[tokio::test]
    async fn limit_cannot_exceed_hard_cap() {
        assert_eq!(runner().with_limit(500).limit(), MAX_BATCH_SIZE);
        let err = runner().with_limit(3).run(emails(4)).await.unwrap_err();
        assert!(matches!(err, InputError::BatchTooLarge { size: 4, limit: 3 }));
    }

    #[tokio::test]
    async fn malformed_item_is_isolated() {
        let mut texts = emails(MAX_BATCH_SIZE);
        texts[6] = "   oi  ".to_string();
        let report = runner().run(texts).await.unwrap();

        assert_eq!(report.successful, 49);
        assert_eq!(report.failed, 1);
        assert_eq!(
            report.items[6].error(),
            Some(&ItemError::TooShort { chars: 2, min: 10 })
        );
        assert!(report.items[7].is_success());
    }

    #[tokio::test]
    async fn panic_is_recorded_per_item() {
        let texts = vec![
            "Obrigado pela ajuda de ontem!".to_string(),
            "boom boom boom boom".to_string(),
            "O sistema está com erro no login".to_string(),
        ];
        let report = flaky_runner().run(texts).await.unwrap();
        assert_eq!(report.successful, 2);
        assert_eq!(
            report.items[1].error(),
            Some(&ItemError::Panicked("pattern engine exploded".to_string()))
        );
        match &report.items[2].outcome {
            ItemOutcome::Success(p) => {
                assert_eq!(p.classification.subcategory, Subcategory::TechnicalSupport)
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn deadline_fails_unfinished_items() {
        let texts = vec![
            "Relatório mensal em anexo para conferência.".to_string(),
            "slow slow slow slow slow".to_string(),
        ];
        let report = flaky_runner()
            .with_timeout(Some(Duration::from_millis(100)))
            .run(texts)
            .await
            .unwrap();
        assert!(report.items[0].is_success());
        assert_eq!(report.items[1].error(), Some(&ItemError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn report_serializes_with_status_tags() {
        let texts = vec!["Obrigado pela ajuda de ontem!".to_string(), "".to_string()];
        let report = runner().run(texts).await.unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["items"][0]["status"], "success");
        assert_eq!(json["items"][0]["classification"]["subcategory"], "Agradecimento");
        assert_eq!(json["items"][0]["response_kind"], "automated");
        assert_eq!(json["items"][1]["status"], "failure");
        assert!(json["items"][1]["error"].as_str().unwrap().contains("too short"));
    }

    #[tokio::test]
    async fn previews_are_truncated() {
        let long = "palavra ".repeat(100);
        let report = runner().run(vec![long]).await.unwrap();
        let preview = &report.items[0].preview;
        assert!(preview.ends_with("..."));
        assert!(preview.chars().count() <= PREVIEW_CHARS + 3);
    }

    #[test]
    fn elapsed_millis_saturates() {
        assert_eq!(elapsed_millis(Duration::from_millis(1_500)), 1_500);
        assert_eq!(elapsed_millis(Duration::MAX), u64::MAX);
    }
}
