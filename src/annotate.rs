//! Annotation of joined rows with sentiment and entities.
//!
//! The classifier and recognizer are injected; this module only owns the
//! calling discipline. Every call runs under a timeout, and a failed or slow
//! call becomes a sentinel value for that row. A run never aborts because a
//! collaborator misbehaved.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::AnnotationConfig;
use crate::error::Result;
use crate::models::{AnnotatedRecord, JoinedRecord, SentimentAnnotation};
use crate::text::TextNormalizer;

/// Raw classifier output before score mapping
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentPrediction {
    /// Label from the classifier's fixed label set
    pub label: String,
    /// Confidence in `[0, 1]`
    pub confidence: f64,
}

/// An entity mention found by a recognizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedEntity {
    /// Text of the mention
    pub surface: String,
    /// Category label, e.g. `ORG`
    pub entity_type: String,
}

impl RecognizedEntity {
    /// Build an entity from its surface and category
    pub fn new(surface: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            surface: surface.into(),
            entity_type: entity_type.into(),
        }
    }
}

/// Sentiment model boundary
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Classify one text; must accept any input string
    async fn classify(&self, text: &str) -> Result<SentimentPrediction>;
}

/// Named-entity model boundary
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    /// Recognize entities in one text; must accept any input string
    async fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>>;
}

/// Score table, blacklist and time budget for annotation calls
#[derive(Debug, Clone)]
pub struct AnnotationSettings {
    /// Label to numeric score
    pub sentiment_scores: HashMap<String, f64>,
    /// Entity types never written out
    pub entity_blacklist: HashSet<String>,
    /// Budget for a single collaborator call
    pub timeout: Duration,
}

impl From<&AnnotationConfig> for AnnotationSettings {
    fn from(config: &AnnotationConfig) -> Self {
        Self {
            sentiment_scores: config.score_table(),
            entity_blacklist: config.entity_blacklist.iter().cloned().collect(),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }
}

/// Sentinel counts for one annotation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotationStats {
    /// Rows annotated
    pub rows: usize,
    /// Classifier calls that ran out of time
    pub sentiment_timeouts: usize,
    /// Classifier calls that returned an error
    pub sentiment_failures: usize,
    /// Recognizer calls that ran out of time
    pub entity_timeouts: usize,
    /// Recognizer calls that returned an error
    pub entity_failures: usize,
}

enum CallOutcome<T> {
    Done(T),
    Failed,
    TimedOut,
}

/// Drives the injected collaborators over joined rows
pub struct Annotator {
    classifier: Box<dyn SentimentClassifier>,
    recognizer: Box<dyn EntityRecognizer>,
    normalizer: TextNormalizer,
    settings: AnnotationSettings,
}

impl Annotator {
    /// Create an annotator; `normalizer` strips emoji before recognition
    #[must_use]
    pub fn new(
        classifier: Box<dyn SentimentClassifier>,
        recognizer: Box<dyn EntityRecognizer>,
        normalizer: TextNormalizer,
        settings: AnnotationSettings,
    ) -> Self {
        Self {
            classifier,
            recognizer,
            normalizer,
            settings,
        }
    }

    /// Annotate every row in order.
    pub async fn annotate(&self, rows: Vec<JoinedRecord>) -> (Vec<AnnotatedRecord>, AnnotationStats) {
        let mut stats = AnnotationStats::default();
        let mut annotated = Vec::with_capacity(rows.len());

        for row in rows {
            let comment = row.comment_text.clone().unwrap_or_default();
            let post = row.post_text.clone().unwrap_or_default();

            let sentiment = self.sentiment(&comment, &mut stats).await;
            let entity_post = self.entities(&post, &mut stats).await;
            let entity_comment = self.entities(&comment, &mut stats).await;

            annotated.push(AnnotatedRecord::from_joined(row, sentiment, entity_post, entity_comment));
            stats.rows += 1;
        }

        debug!(?stats, "Annotation finished");
        (annotated, stats)
    }

    /// Classify `text`, substituting a sentinel on failure or timeout.
    pub async fn classify(&self, text: &str) -> SentimentAnnotation {
        self.sentiment(text, &mut AnnotationStats::default()).await
    }

    /// Recognize entities in `text` and serialize them, empty on failure or timeout.
    pub async fn recognize(&self, text: &str) -> String {
        self.entities(text, &mut AnnotationStats::default()).await
    }

    async fn sentiment(&self, text: &str, stats: &mut AnnotationStats) -> SentimentAnnotation {
        match self.call(self.classifier.classify(text)).await {
            CallOutcome::Done(prediction) => {
                let score = self
                    .settings
                    .sentiment_scores
                    .get(&prediction.label)
                    .copied()
                    .unwrap_or_else(|| {
                        warn!(label = %prediction.label, "Sentiment label has no configured score, using 0");
                        0.0
                    });
                SentimentAnnotation {
                    label: prediction.label,
                    confidence: prediction.confidence.clamp(0.0, 1.0),
                    score,
                }
            }
            CallOutcome::Failed => {
                stats.sentiment_failures += 1;
                SentimentAnnotation::sentinel(SentimentAnnotation::UNAVAILABLE)
            }
            CallOutcome::TimedOut => {
                stats.sentiment_timeouts += 1;
                SentimentAnnotation::sentinel(SentimentAnnotation::TIMEOUT)
            }
        }
    }

    async fn entities(&self, text: &str, stats: &mut AnnotationStats) -> String {
        if text.trim().is_empty() {
            return String::new();
        }
        let cleaned = self.normalizer.strip_emoji(text);

        match self.call(self.recognizer.recognize(&cleaned)).await {
            CallOutcome::Done(entities) => serialize_entities(entities, &self.settings.entity_blacklist),
            CallOutcome::Failed => {
                stats.entity_failures += 1;
                String::new()
            }
            CallOutcome::TimedOut => {
                stats.entity_timeouts += 1;
                String::new()
            }
        }
    }

    async fn call<T>(&self, fut: impl Future<Output = Result<T>>) -> CallOutcome<T> {
        match tokio::time::timeout(self.settings.timeout, fut).await {
            Ok(Ok(value)) => CallOutcome::Done(value),
            Ok(Err(e)) => {
                warn!(error = %e, "Annotation call failed");
                CallOutcome::Failed
            }
            Err(_) => {
                warn!(timeout_ms = self.settings.timeout.as_millis(), "Annotation call timed out");
                CallOutcome::TimedOut
            }
        }
    }
}

/// Serialize entities as `surface,type` pairs joined by `|`.
///
/// Blacklisted types are dropped and repeats keep their first position.
/// Delimiters inside a surface or type are replaced by spaces so the result
/// always splits back into the same pairs.
#[must_use]
pub fn serialize_entities(entities: Vec<RecognizedEntity>, blacklist: &HashSet<String>) -> String {
    let mut seen = HashSet::new();
    entities
        .into_iter()
        .filter(|e| !blacklist.contains(&e.entity_type))
        .map(|e| format!("{},{}", scrub(&e.surface), scrub(&e.entity_type)))
        .filter(|pair| seen.insert(pair.clone()))
        .collect::<Vec<_>>()
        .join("|")
}

fn scrub(field: &str) -> String {
    field.replace(['|', ','], " ").trim().to_string()
}
