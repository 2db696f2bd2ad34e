//! End-to-end tests for the file-to-file stages

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use social_sentiment::analyzers::{CapitalizedEntityRecognizer, LexiconClassifier};
use social_sentiment::annotate::{
    AnnotationSettings, Annotator, EntityRecognizer, RecognizedEntity, SentimentClassifier, SentimentPrediction,
};
use social_sentiment::models::{EntityColumn, SourceSpec};
use social_sentiment::{PipelineError, Pipeline, Result, TextNormalizer};

fn pipeline() -> Pipeline {
    Pipeline::new(TextNormalizer::new().expect("Failed to create text normalizer"))
}

fn write_json(dir: &Path, name: &str, value: &Value) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_vec(value).expect("serialize")).expect("write fixture");
    path
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).expect("read output")
}

fn fb_pages() -> Value {
    json!([{ "data": { "node": { "timeline_feed_units": { "edges": [
        { "node": {
            "feedback": { "id": "fb1" },
            "comet_sections": {
                "content": { "story": { "comet_sections": { "message": { "story": { "message": { "text": "Quiet post" } } } } } },
                "feedback": { "story": { "feedback_context": { "feedback_target_with_context": {
                    "ufi_renderer": { "feedback": { "comment_count": { "total_count": 0 } } }
                } } } }
            }
        } }
    ] } } } }])
}

fn tweet_threads() -> Value {
    json!([{ "data": { "threaded_conversation_with_injections": { "instructions": [{ "entries": [
        { "content": { "itemContent": { "tweet_results": { "result": {
            "legacy": { "full_text": "Quiet tweet", "reply_count": 0 }
        } } } } }
    ] }] } } }])
}

#[test]
fn test_facebook_zero_comment_post_kept_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    let posts = write_json(dir.path(), "posts.json", &fb_pages());
    let comments = write_json(dir.path(), "comments.json", &json!([]));
    let output = dir.path().join("fb.csv");

    let rows = pipeline().ingest_facebook(&posts, &comments, &output).expect("ingest");

    assert_eq!(rows, 1);
    assert_eq!(read(&output), "id,post,reply,comment,time_comment\nfb1,Quiet post,0,,\n");
}

#[test]
fn test_tweet_zero_comment_post_dropped() {
    let dir = tempfile::tempdir().expect("tempdir");
    let threads = write_json(dir.path(), "threads.json", &tweet_threads());
    let output = dir.path().join("tweet.csv");

    let rows = pipeline().ingest_tweet(&threads, &output).expect("ingest");

    assert_eq!(rows, 0);
    assert_eq!(read(&output), "id,post,reply,comment,time_comment\n");
}

#[test]
fn test_ingest_rejects_invalid_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let threads = dir.path().join("threads.json");
    std::fs::write(&threads, "[{").expect("write");
    let output = dir.path().join("tweet.csv");

    let err = pipeline().ingest_tweet(&threads, &output).expect_err("bad json");
    assert!(matches!(err, PipelineError::Json(_)));
    assert!(!output.exists());
}

struct FailingClassifier;

#[async_trait]
impl SentimentClassifier for FailingClassifier {
    async fn classify(&self, _text: &str) -> Result<SentimentPrediction> {
        Err(PipelineError::Annotation("service unavailable".to_string()))
    }
}

struct HangingRecognizer;

#[async_trait]
impl EntityRecognizer for HangingRecognizer {
    async fn recognize(&self, _text: &str) -> Result<Vec<RecognizedEntity>> {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok(Vec::new())
    }
}

fn settings(timeout: Duration) -> AnnotationSettings {
    AnnotationSettings {
        sentiment_scores: HashMap::from([
            ("positive".to_string(), 1.0),
            ("neutral".to_string(), 0.0),
            ("negative".to_string(), -1.0),
        ]),
        entity_blacklist: HashSet::from(["DATE".to_string()]),
        timeout,
    }
}

const JOINED: &str = "\
id,post,reply,comment,time_comment
fb1,New shoes from Nike,3,I really love the Seattle store and the people working there,2023-05-01
fb1,New shoes from Nike,3,worst service ever,2023-05-02
fb2,Quiet post,0,,
";

#[tokio::test]
async fn test_annotate_with_builtin_collaborators() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("joined.csv");
    std::fs::write(&input, JOINED).expect("write");
    let output = dir.path().join("annotated.csv");

    let annotator = Annotator::new(
        Box::new(LexiconClassifier),
        Box::new(CapitalizedEntityRecognizer),
        TextNormalizer::new().expect("normalizer"),
        settings(Duration::from_secs(3)),
    );
    let stats = pipeline().annotate_file(&annotator, &input, &output).await.expect("annotate");
    assert_eq!(stats.rows, 3);

    let mut reader = csv::Reader::from_path(&output).expect("open output");
    let header: Vec<String> = reader.headers().expect("header").iter().map(ToString::to_string).collect();
    assert_eq!(header.len(), 10);
    assert_eq!(header[5], "sentiment");

    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.expect("record")).collect();
    assert_eq!(records.len(), 3);
    assert_eq!(&records[0][5], "positive");
    assert_eq!(&records[1][5], "negative");
    assert_eq!(&records[1][7], "-1.0");
    assert_eq!(&records[2][5], "neutral");
    assert!(records[0][9].contains("Seattle,LOC"));
}

#[tokio::test]
async fn test_annotate_sentinels_never_abort() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("joined.csv");
    std::fs::write(&input, JOINED).expect("write");
    let output = dir.path().join("annotated.csv");

    let annotator = Annotator::new(
        Box::new(FailingClassifier),
        Box::new(HangingRecognizer),
        TextNormalizer::new().expect("normalizer"),
        settings(Duration::from_millis(20)),
    );
    let stats = pipeline().annotate_file(&annotator, &input, &output).await.expect("annotate");

    assert_eq!(stats.rows, 3);
    assert_eq!(stats.sentiment_failures, 3);
    // five non-empty texts: three posts and two comments
    assert_eq!(stats.entity_timeouts, 5);

    let content = read(&output);
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[1].ends_with(",N/A,0.0,0.0,,"));
}

const ANNOTATED: &str = "\
id,post,reply,comment,time_comment,sentiment,confidence,score,entity_post,entity_comment
0,new shoes,4,love the Nike store,2023-05-01,positive,0.9,1.0,,\"nike,ORG|seattle,LOC\"
";

#[test]
fn test_summarize_entities_writes_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = dir.path().join("a.csv");
    std::fs::write(&source, ANNOTATED).expect("write");
    let output = dir.path().join("entities.csv");

    let rows = pipeline()
        .summarize_entities_to(&[SourceSpec::new("nike", "facebook", source)], EntityColumn::Comment, &output)
        .expect("summarize");

    assert_eq!(rows, 2);
    assert_eq!(
        read(&output),
        "entity,type,time,sentiment,score,company,channel\n\
         nike,ORG,2023-05-01,positive,1.0,nike,facebook\n\
         seattle,LOC,2023-05-01,positive,1.0,nike,facebook\n"
    );
}

#[test]
fn test_summarize_empty_sources_write_header_only() {
    let dir = tempfile::tempdir().expect("tempdir");
    let entities = dir.path().join("entities.csv");
    let sentiments = dir.path().join("sentiments.csv");

    pipeline()
        .summarize_entities_to(&[], EntityColumn::Post, &entities)
        .expect("summarize entities");
    pipeline().summarize_sentiments_to(&[], &sentiments).expect("summarize sentiments");

    assert_eq!(read(&entities), "entity,type,time,sentiment,score,company,channel\n");
    assert_eq!(read(&sentiments), "post,reply,comment,sentiment,score,time_comment,company,channel\n");
}

const ANNOTATED_HEADER_ONLY: &str =
    "id,post,reply,comment,time_comment,sentiment,confidence,score,entity_post,entity_comment\n";

fn zero_row_sources(dir: &Path) -> Vec<SourceSpec> {
    let header_only = dir.join("header_only.csv");
    let zero_byte = dir.join("zero_byte.csv");
    std::fs::write(&header_only, ANNOTATED_HEADER_ONLY).expect("write");
    std::fs::write(&zero_byte, "").expect("write");
    vec![
        SourceSpec::new("nike", "facebook", header_only),
        SourceSpec::new("adidas", "tweet", zero_byte),
    ]
}

#[test]
fn test_summarize_entities_zero_row_files_write_header_only() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sources = zero_row_sources(dir.path());
    let output = dir.path().join("entities.csv");

    let rows = pipeline()
        .summarize_entities_to(&sources, EntityColumn::Comment, &output)
        .expect("summarize entities");

    assert_eq!(rows, 0);
    assert_eq!(read(&output), "entity,type,time,sentiment,score,company,channel\n");
}

#[test]
fn test_summarize_sentiments_zero_row_files_write_header_only() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sources = zero_row_sources(dir.path());
    let output = dir.path().join("sentiments.csv");

    let rows = pipeline().summarize_sentiments_to(&sources, &output).expect("summarize sentiments");

    assert_eq!(rows, 0);
    assert_eq!(read(&output), "post,reply,comment,sentiment,score,time_comment,company,channel\n");
}

#[test]
fn test_summarize_sentiments_accepts_float_reply_counts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = dir.path().join("float.csv");
    std::fs::write(
        &source,
        "id,post,reply,comment,time_comment,sentiment,confidence,score,entity_post,entity_comment\n\
         0,new shoes,4.0,love it,2023-05-01,positive,0.9,1.0,,\n",
    )
    .expect("write");
    let output = dir.path().join("sentiments.csv");

    let rows = pipeline()
        .summarize_sentiments_to(&[SourceSpec::new("nike", "facebook", source)], &output)
        .expect("summarize");

    assert_eq!(rows, 1);
    assert_eq!(
        read(&output),
        "post,reply,comment,sentiment,score,time_comment,company,channel\n\
         new shoes,4,love it,positive,1.0,2023-05-01,nike,facebook\n"
    );
}

#[tokio::test]
async fn test_annotate_accepts_float_reply_counts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("joined.csv");
    std::fs::write(&input, "id,post,reply,comment,time_comment\n0,root,4.0,reply,2023-05-01\n").expect("write");
    let output = dir.path().join("annotated.csv");

    let annotator = Annotator::new(
        Box::new(LexiconClassifier),
        Box::new(CapitalizedEntityRecognizer),
        TextNormalizer::new().expect("normalizer"),
        settings(Duration::from_secs(3)),
    );
    let stats = pipeline().annotate_file(&annotator, &input, &output).await.expect("annotate");

    assert_eq!(stats.rows, 1);
    assert!(read(&output).lines().nth(1).expect("data row").starts_with("0,root,4,reply,2023-05-01,"));
}

#[test]
fn test_malformed_token_leaves_no_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = dir.path().join("a.csv");
    std::fs::write(
        &source,
        "id,post,reply,comment,time_comment,sentiment,confidence,score,entity_post,entity_comment\n\
         0,p,1,c,2023-05-01,neutral,0.5,0.0,nike,\n",
    )
    .expect("write");
    let output = dir.path().join("entities.csv");

    let err = pipeline()
        .summarize_entities_to(&[SourceSpec::new("nike", "facebook", source)], EntityColumn::Post, &output)
        .expect_err("malformed");

    assert!(matches!(err, PipelineError::MalformedEntity { row: 1, .. }));
    assert!(!output.exists());
}

#[test]
fn test_summarize_sentiments_tags_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = dir.path().join("a.csv");
    std::fs::write(&source, ANNOTATED).expect("write");
    let output = dir.path().join("sentiments.csv");

    let rows = pipeline()
        .summarize_sentiments_to(&[SourceSpec::new("nike", "tweet", source)], &output)
        .expect("summarize");

    assert_eq!(rows, 1);
    assert_eq!(
        read(&output),
        "post,reply,comment,sentiment,score,time_comment,company,channel\n\
         new shoes,4,love the Nike store,positive,1.0,2023-05-01,nike,tweet\n"
    );
}
