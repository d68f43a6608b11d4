//! Triage engine — owns the shared pattern registry and wires every
//! component behind one facade.

use std::sync::Arc;

use crate::config::TriageConfig;
use crate::error::{InputError, Result};
use crate::pipeline::batch::{BatchReport, BatchRunner, TriageProcessor};
use crate::pipeline::classifier::Classifier;
use crate::pipeline::patterns::PatternRegistry;
use crate::pipeline::types::{Category, ClassificationResult, Subcategory, Tone, Urgency};
use crate::reply::ResponseGenerator;
use crate::summary::{SummaryExtractor, SummaryResult};
use crate::thread::{self, ThreadEmail};

pub struct TriageEngine {
    config: TriageConfig,
    classifier: Classifier,
    responder: ResponseGenerator,
    summarizer: SummaryExtractor,
    batch: BatchRunner,
}

impl TriageEngine {
    /// Engine over the built-in patterns and default configuration.
    pub fn new() -> Self {
        Self::with_registry(Arc::new(PatternRegistry::builtin()), TriageConfig::default())
    }

    /// Build from configuration, loading pattern overrides if configured.
    pub fn from_config(config: TriageConfig) -> Result<Self> {
        let registry = match &config.patterns_path {
            Some(path) => PatternRegistry::with_overrides_file(path)?,
            None => PatternRegistry::builtin(),
        };
        Ok(Self::with_registry(Arc::new(registry), config))
    }

    pub fn with_registry(registry: Arc<PatternRegistry>, config: TriageConfig) -> Self {
        let classifier =
            Classifier::new(registry).with_thanks_max_words(config.simple_thanks_max_words);
        let responder = ResponseGenerator::new();
        let processor = TriageProcessor::new(classifier.clone(), responder.clone());
        let batch = BatchRunner::new(Arc::new(processor))
            .with_limit(config.max_batch_size)
            .with_workers(config.batch_workers)
            .with_timeout(config.batch_timeout)
            .with_min_chars(config.min_item_chars);

        Self {
            config,
            classifier,
            responder,
            summarizer: SummaryExtractor::new(),
            batch,
        }
    }

    pub fn config(&self) -> &TriageConfig {
        &self.config
    }

    /// Classify one email. Never fails.
    pub fn classify(&self, text: &str) -> ClassificationResult {
        self.classifier.classify(text)
    }

    /// Extractive summary; `max_sentences` defaults to the configured count.
    pub fn summarize(&self, text: &str, max_sentences: Option<usize>) -> SummaryResult {
        let n = max_sentences.unwrap_or(self.config.default_summary_sentences);
        self.summarizer.summarize(text, n)
    }

    pub fn generate_response(
        &self,
        category: Category,
        subcategory: Subcategory,
        tone: Tone,
        urgency: Urgency,
    ) -> String {
        self.responder.generate(category, subcategory, tone, urgency)
    }

    /// Reply for free-form labels; unparseable labels relax the lookup.
    pub fn generate_response_from_labels(
        &self,
        category: &str,
        subcategory: &str,
        tone: &str,
        urgency: &str,
    ) -> String {
        self.responder.generate_from_labels(category, subcategory, tone, urgency)
    }

    /// Classify and answer up to the configured batch limit of emails.
    pub async fn classify_batch(
        &self,
        texts: Vec<String>,
    ) -> std::result::Result<BatchReport, InputError> {
        self.batch.run(texts).await
    }

    pub fn parse_thread(&self, text: &str) -> Vec<ThreadEmail> {
        thread::parse_thread(text)
    }
}

impl Default for TriageEngine {
    fn default() -> Self {
        Self::new()
    }
}
