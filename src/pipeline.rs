//! File-to-file stages of the pipeline.
//!
//! Each stage reads its inputs fully, computes in memory and writes one
//! table. A stage that fails leaves no output file behind.

use std::path::Path;
use std::time::Instant;

use tracing::{info, warn};

use crate::aggregate::{summarize_entities, summarize_sentiments};
use crate::annotate::{AnnotationStats, Annotator};
use crate::error::Result;
use crate::extract::{Extraction, FacebookExtractor, TweetExtractor};
use crate::file_writer::{read_csv, read_json, write_csv_atomic};
use crate::join::join;
use crate::logging::OperationTimer;
use crate::metrics::MetricsCollector;
use crate::models::{
    EntityColumn, JoinedRecord, Platform, SourceSpec, ANNOTATED_HEADER, ENTITY_HEADER, JOINED_HEADER,
    SENTIMENT_HEADER,
};
use crate::text::TextNormalizer;

/// Runs pipeline stages against files on disk
#[derive(Debug, Clone)]
pub struct Pipeline {
    normalizer: TextNormalizer,
    metrics: MetricsCollector,
}

impl Pipeline {
    /// Create a pipeline whose extractors clean text with `normalizer`
    #[must_use]
    pub fn new(normalizer: TextNormalizer) -> Self {
        Self {
            normalizer,
            metrics: MetricsCollector::default(),
        }
    }

    /// Extract a Facebook page export and its comment containers, join them
    /// and write the joined table. Returns the number of rows written.
    pub fn ingest_facebook(&self, posts: &Path, comments: &Path, output: &Path) -> Result<usize> {
        let timer = OperationTimer::new("ingest_facebook");
        let started = Instant::now();

        let pages = read_json(posts)?;
        let containers = read_json(comments)?;
        let extraction = FacebookExtractor::new(self.normalizer.clone()).extract(&pages, &containers);

        let rows = self.join_and_write(Platform::Facebook, extraction, output)?;
        self.metrics.record_stage_duration("ingest", started.elapsed());
        timer.finish();
        Ok(rows)
    }

    /// Extract a tweet thread export, join it and write the joined table.
    pub fn ingest_tweet(&self, threads: &Path, output: &Path) -> Result<usize> {
        let timer = OperationTimer::new("ingest_tweet");
        let started = Instant::now();

        let export = read_json(threads)?;
        let extraction = TweetExtractor::new(self.normalizer.clone()).extract(&export);

        let rows = self.join_and_write(Platform::Tweet, extraction, output)?;
        self.metrics.record_stage_duration("ingest", started.elapsed());
        timer.finish();
        Ok(rows)
    }

    fn join_and_write(&self, platform: Platform, extraction: Extraction, output: &Path) -> Result<usize> {
        if extraction.skipped_posts > 0 || extraction.skipped_comments > 0 {
            warn!(
                platform = platform.as_str(),
                skipped_posts = extraction.skipped_posts,
                skipped_comments = extraction.skipped_comments,
                "Export nodes skipped for missing fields"
            );
        }

        let joined = join(&extraction.posts, &extraction.comments, platform.join_policy());
        self.metrics.record_extraction(platform.as_str(), &extraction, joined.len());

        write_csv_atomic(&joined, &JOINED_HEADER, output)?;
        info!(
            platform = platform.as_str(),
            posts = extraction.posts.len(),
            comments = extraction.comments.len(),
            rows = joined.len(),
            output = %output.display(),
            "Joined table written"
        );
        Ok(joined.len())
    }

    /// Annotate a joined table and write the annotated table.
    ///
    /// Collaborator failures become sentinel values, so this only fails on
    /// unreadable input or an unwritable output.
    pub async fn annotate_file(&self, annotator: &Annotator, input: &Path, output: &Path) -> Result<AnnotationStats> {
        let timer = OperationTimer::new("annotate");
        let started = Instant::now();

        let rows: Vec<JoinedRecord> = read_csv(input)?;
        info!(rows = rows.len(), input = %input.display(), "Annotating joined table");

        let (annotated, stats) = annotator.annotate(rows).await;
        self.metrics.record_annotation(&stats);

        write_csv_atomic(&annotated, &ANNOTATED_HEADER, output)?;
        info!(
            rows = stats.rows,
            sentiment_timeouts = stats.sentiment_timeouts,
            sentiment_failures = stats.sentiment_failures,
            entity_timeouts = stats.entity_timeouts,
            entity_failures = stats.entity_failures,
            output = %output.display(),
            "Annotated table written"
        );

        self.metrics.record_stage_duration("annotate", started.elapsed());
        timer.finish();
        Ok(stats)
    }

    /// Write the long-form entity table for one entity column.
    pub fn summarize_entities_to(&self, sources: &[SourceSpec], column: EntityColumn, output: &Path) -> Result<usize> {
        let timer = OperationTimer::new("summarize_entities");

        let rows = summarize_entities(sources, column)?;
        write_csv_atomic(&rows, &ENTITY_HEADER, output)?;
        self.metrics.record_aggregation("entities", rows.len());

        info!(
            sources = sources.len(),
            column = column.column_name(),
            rows = rows.len(),
            output = %output.display(),
            "Entity table written"
        );
        timer.finish();
        Ok(rows.len())
    }

    /// Write the long-form sentiment table.
    pub fn summarize_sentiments_to(&self, sources: &[SourceSpec], output: &Path) -> Result<usize> {
        let timer = OperationTimer::new("summarize_sentiments");

        let rows = summarize_sentiments(sources)?;
        write_csv_atomic(&rows, &SENTIMENT_HEADER, output)?;
        self.metrics.record_aggregation("sentiments", rows.len());

        info!(
            sources = sources.len(),
            rows = rows.len(),
            output = %output.display(),
            "Sentiment table written"
        );
        timer.finish();
        Ok(rows.len())
    }
}
