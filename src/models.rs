//! Data models for extracted, joined, annotated and summarized records
//!
//! Every table that crosses a file boundary has a fixed header, declared
//! here next to the row type that fills it.

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Header of the joined post/comment table written by `ingest`.
pub const JOINED_HEADER: [&str; 5] = ["id", "post", "reply", "comment", "time_comment"];

/// Header of the annotated table written by `annotate`.
pub const ANNOTATED_HEADER: [&str; 10] = [
    "id",
    "post",
    "reply",
    "comment",
    "time_comment",
    "sentiment",
    "confidence",
    "score",
    "entity_post",
    "entity_comment",
];

/// Header of the long-form entity table.
pub const ENTITY_HEADER: [&str; 7] = ["entity", "type", "time", "sentiment", "score", "company", "channel"];

/// Header of the long-form sentiment table.
pub const SENTIMENT_HEADER: [&str; 8] = [
    "post",
    "reply",
    "comment",
    "sentiment",
    "score",
    "time_comment",
    "company",
    "channel",
];

/// Identifier shared by a post and the comments that reply to it.
///
/// Facebook exports carry an opaque feedback id; tweet threads are identified
/// by their position in the export.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostId {
    /// Positional id (tweet thread index)
    Index(u64),
    /// Opaque id taken from the payload
    Text(String),
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for PostId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<usize> for PostId {
    fn from(value: usize) -> Self {
        Self::Index(value as u64)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCount {
    Integer(u64),
    Float(f64),
    Text(String),
}

/// Read an optional count written either as `4` or as `4.0`.
///
/// Tables produced by dataframe tools promote integer columns with gaps to
/// floats, so integral floats are accepted. Empty cells and `NaN` read as
/// absent.
pub(crate) fn deserialize_count<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<RawCount>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawCount::Integer(count)) => Ok(Some(count)),
        Some(RawCount::Float(value)) if value.is_nan() => Ok(None),
        Some(RawCount::Float(value)) if value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 => {
            Ok(Some(value as u64))
        }
        Some(RawCount::Float(value)) => Err(D::Error::custom(format!("count is not a whole number: {value}"))),
        Some(RawCount::Text(text)) => {
            let text = text.trim();
            if text.is_empty() || text.eq_ignore_ascii_case("nan") {
                Ok(None)
            } else {
                Err(D::Error::custom(format!("count is not a number: {text:?}")))
            }
        }
    }
}

/// A root post recovered from an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    /// Post identifier
    pub id: PostId,
    /// Normalized post text
    pub text: String,
    /// Number of replies reported by the platform
    pub reply_count: u64,
}

/// A comment recovered from an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRecord {
    /// Id of the post this comment replies to
    pub id: PostId,
    /// Normalized comment text
    pub text: String,
    /// Calendar date the comment was created
    pub created_at: NaiveDate,
}

/// One row of the post/comment outer join
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedRecord {
    /// Shared post id
    pub id: PostId,
    /// Post text, absent for orphan comments
    #[serde(rename = "post")]
    pub post_text: Option<String>,
    /// Reply count, absent for orphan comments
    #[serde(rename = "reply", default, deserialize_with = "deserialize_count")]
    pub reply_count: Option<u64>,
    /// Comment text, absent for posts without comments
    #[serde(rename = "comment")]
    pub comment_text: Option<String>,
    /// Comment date, absent for posts without comments
    #[serde(rename = "time_comment")]
    pub comment_date: Option<NaiveDate>,
}

/// A joined row plus sentiment and entity annotations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRecord {
    /// Shared post id
    pub id: PostId,
    /// Post text
    #[serde(rename = "post")]
    pub post_text: Option<String>,
    /// Reply count
    #[serde(rename = "reply", default, deserialize_with = "deserialize_count")]
    pub reply_count: Option<u64>,
    /// Comment text
    #[serde(rename = "comment")]
    pub comment_text: Option<String>,
    /// Comment date
    #[serde(rename = "time_comment")]
    pub comment_date: Option<NaiveDate>,
    /// Sentiment label, or a sentinel such as `timeout`
    pub sentiment: String,
    /// Classifier confidence in `[0, 1]`
    pub confidence: f64,
    /// Numeric projection of the label
    pub score: f64,
    /// `|`-delimited `surface,type` pairs found in the post
    pub entity_post: Option<String>,
    /// `|`-delimited `surface,type` pairs found in the comment
    pub entity_comment: Option<String>,
}

impl AnnotatedRecord {
    /// Attach annotations to a joined row
    #[must_use]
    pub fn from_joined(
        joined: JoinedRecord,
        sentiment: SentimentAnnotation,
        entity_post: String,
        entity_comment: String,
    ) -> Self {
        Self {
            id: joined.id,
            post_text: joined.post_text,
            reply_count: joined.reply_count,
            comment_text: joined.comment_text,
            comment_date: joined.comment_date,
            sentiment: sentiment.label,
            confidence: sentiment.confidence,
            score: sentiment.score,
            entity_post: Some(entity_post).filter(|s| !s.is_empty()),
            entity_comment: Some(entity_comment).filter(|s| !s.is_empty()),
        }
    }
}

/// Sentiment attached to a row, after label-to-score mapping
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentAnnotation {
    /// Label from the classifier or a sentinel
    pub label: String,
    /// Confidence in `[0, 1]`
    pub confidence: f64,
    /// Mapped score
    pub score: f64,
}

impl SentimentAnnotation {
    /// Sentinel label written when the classifier exceeds its time budget
    pub const TIMEOUT: &'static str = "timeout";
    /// Sentinel label written when the classifier fails
    pub const UNAVAILABLE: &'static str = "N/A";

    /// Fixed placeholder for a failed or timed-out classification
    #[must_use]
    pub fn sentinel(label: &str) -> Self {
        Self {
            label: label.to_string(),
            confidence: 0.0,
            score: 0.0,
        }
    }
}

/// One entity mention in the long-form entity table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityOccurrence {
    /// Normalized entity surface
    pub entity: String,
    /// Entity category reported by the recognizer
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Date of the comment the row came from
    pub time: Option<NaiveDate>,
    /// Sentiment label of the row
    pub sentiment: String,
    /// Sentiment score of the row
    pub score: f64,
    /// Company provenance tag
    pub company: String,
    /// Channel provenance tag
    pub channel: String,
}

/// One row of the long-form sentiment table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRow {
    /// Post text
    pub post: Option<String>,
    /// Reply count
    pub reply: Option<u64>,
    /// Comment text
    pub comment: Option<String>,
    /// Sentiment label
    pub sentiment: String,
    /// Sentiment score
    pub score: f64,
    /// Comment date
    pub time_comment: Option<NaiveDate>,
    /// Company provenance tag
    pub company: String,
    /// Channel provenance tag
    pub channel: String,
}

/// An annotated file tagged with where its rows came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    /// Company tag, e.g. `nike`
    pub company: String,
    /// Channel tag, e.g. `facebook`
    pub channel: String,
    /// Path to the annotated CSV
    pub path: PathBuf,
}

impl SourceSpec {
    /// Create a source from its tags and path
    pub fn new(company: impl Into<String>, channel: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            company: company.into(),
            channel: channel.into(),
            path: path.into(),
        }
    }
}

/// Which annotated entity column to explode during aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityColumn {
    /// Entities recognized in post text
    Post,
    /// Entities recognized in comment text
    Comment,
}

impl EntityColumn {
    /// Column name in the annotated table
    #[must_use]
    pub const fn column_name(&self) -> &'static str {
        match self {
            Self::Post => "entity_post",
            Self::Comment => "entity_comment",
        }
    }
}

/// Export platform discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Threaded forum-style export (page edges plus a comment file)
    Facebook,
    /// Microblog thread export
    Tweet,
}

impl Platform {
    /// Join policy the platform's table is built with
    #[must_use]
    pub const fn join_policy(&self) -> JoinPolicy {
        match self {
            Self::Facebook => JoinPolicy::KeepOrphans,
            Self::Tweet => JoinPolicy::RequireComment,
        }
    }

    /// Lowercase name used in logs and metric labels
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::Tweet => "tweet",
        }
    }
}

/// What the joiner keeps after the outer join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinPolicy {
    /// Keep posts without comments and comments without posts
    KeepOrphans,
    /// Keep only posts paired with a comment; orphans on either side are dropped
    RequireComment,
}
