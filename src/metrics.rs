use anyhow::Result;
use metrics::{counter, histogram};
use std::time::Duration;

use crate::annotate::AnnotationStats;
use crate::extract::Extraction;

/// Metrics collection and management
#[derive(Debug, Clone, Copy)]
pub struct MetricsCollector {
    // Extraction metrics
    pub records_extracted_total: &'static str,
    pub nodes_skipped_total: &'static str,
    pub rows_joined_total: &'static str,

    // Annotation metrics
    pub rows_annotated_total: &'static str,
    pub annotation_sentinels_total: &'static str,

    // Aggregation metrics
    pub rows_aggregated_total: &'static str,

    // Timing
    pub stage_duration: &'static str,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self {
            records_extracted_total: "social_sentiment_records_extracted_total",
            nodes_skipped_total: "social_sentiment_nodes_skipped_total",
            rows_joined_total: "social_sentiment_rows_joined_total",

            rows_annotated_total: "social_sentiment_rows_annotated_total",
            annotation_sentinels_total: "social_sentiment_annotation_sentinels_total",

            rows_aggregated_total: "social_sentiment_rows_aggregated_total",

            stage_duration: "social_sentiment_stage_duration_seconds",
        }
    }
}

impl MetricsCollector {
    /// Install a no-op recorder; exporters can replace it in embedding binaries
    pub fn init() -> Result<()> {
        metrics::set_global_recorder(metrics::NoopRecorder)
            .map_err(|e| anyhow::anyhow!("Failed to initialize metrics recorder: {}", e))?;

        Ok(())
    }

    /// Record extraction and join counts for one platform
    pub fn record_extraction(&self, platform: &'static str, extraction: &Extraction, joined_rows: usize) {
        counter!(self.records_extracted_total, "platform" => platform, "kind" => "post")
            .increment(extraction.posts.len() as u64);
        counter!(self.records_extracted_total, "platform" => platform, "kind" => "comment")
            .increment(extraction.comments.len() as u64);
        counter!(self.nodes_skipped_total, "platform" => platform, "kind" => "post")
            .increment(extraction.skipped_posts as u64);
        counter!(self.nodes_skipped_total, "platform" => platform, "kind" => "comment")
            .increment(extraction.skipped_comments as u64);
        counter!(self.rows_joined_total, "platform" => platform).increment(joined_rows as u64);
    }

    /// Record annotation volume and sentinel substitutions
    pub fn record_annotation(&self, stats: &AnnotationStats) {
        counter!(self.rows_annotated_total).increment(stats.rows as u64);
        counter!(self.annotation_sentinels_total, "call" => "sentiment", "reason" => "timeout")
            .increment(stats.sentiment_timeouts as u64);
        counter!(self.annotation_sentinels_total, "call" => "sentiment", "reason" => "error")
            .increment(stats.sentiment_failures as u64);
        counter!(self.annotation_sentinels_total, "call" => "entity", "reason" => "timeout")
            .increment(stats.entity_timeouts as u64);
        counter!(self.annotation_sentinels_total, "call" => "entity", "reason" => "error")
            .increment(stats.entity_failures as u64);
    }

    /// Record rows written by a summarize run
    pub fn record_aggregation(&self, table: &'static str, rows: usize) {
        counter!(self.rows_aggregated_total, "table" => table).increment(rows as u64);
    }

    /// Record how long a pipeline stage took
    pub fn record_stage_duration(&self, stage: &'static str, duration: Duration) {
        histogram!(self.stage_duration, "stage" => stage).record(duration.as_secs_f64());
    }
}
