//! Tests for metrics.rs module

use std::time::Duration;

use social_sentiment::annotate::AnnotationStats;
use social_sentiment::extract::Extraction;
use social_sentiment::metrics::MetricsCollector;

#[test]
fn test_metric_names_are_prefixed() {
    let collector = MetricsCollector::default();
    for name in [
        collector.records_extracted_total,
        collector.nodes_skipped_total,
        collector.rows_joined_total,
        collector.rows_annotated_total,
        collector.annotation_sentinels_total,
        collector.rows_aggregated_total,
        collector.stage_duration,
    ] {
        assert!(name.starts_with("social_sentiment_"), "{name}");
    }
}

#[test]
fn test_init_then_record() {
    // a second install in the same process is rejected, which is fine here
    let _ = MetricsCollector::init();

    let collector = MetricsCollector::default();
    let extraction = Extraction {
        skipped_posts: 2,
        ..Extraction::default()
    };
    collector.record_extraction("tweet", &extraction, 0);
    collector.record_annotation(&AnnotationStats {
        rows: 3,
        sentiment_timeouts: 1,
        ..AnnotationStats::default()
    });
    collector.record_stage_duration("annotate", Duration::from_millis(12));
}
