//! Long-form summary tables across annotated sources.
//!
//! Sources are read in the order given and their rows concatenated in file
//! order. Nothing here writes files; callers persist the result only after
//! the whole aggregation succeeded.

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::entity::normalize_entity;
use crate::error::{PipelineError, Result};
use crate::file_writer::read_csv;
use crate::models::{deserialize_count, EntityColumn, EntityOccurrence, SentimentRow, SourceSpec};

/// Columns of an annotated row the entity table needs
#[derive(Debug, Deserialize)]
struct EntitySourceRow {
    time_comment: Option<NaiveDate>,
    sentiment: String,
    score: f64,
    entity_post: Option<String>,
    entity_comment: Option<String>,
}

impl EntitySourceRow {
    fn entities(&self, column: EntityColumn) -> Option<&str> {
        match column {
            EntityColumn::Post => self.entity_post.as_deref(),
            EntityColumn::Comment => self.entity_comment.as_deref(),
        }
        .filter(|value| !value.trim().is_empty())
    }
}

/// Columns of an annotated row the sentiment table needs
#[derive(Debug, Deserialize)]
struct SentimentSourceRow {
    post: Option<String>,
    #[serde(default, deserialize_with = "deserialize_count")]
    reply: Option<u64>,
    comment: Option<String>,
    sentiment: String,
    score: f64,
    time_comment: Option<NaiveDate>,
}

/// Explode one entity column of every source into one row per mention.
///
/// # Errors
///
/// Fails on unreadable input or on the first token that is not a
/// `surface,type` pair; no partial result is returned.
pub fn summarize_entities(sources: &[SourceSpec], column: EntityColumn) -> Result<Vec<EntityOccurrence>> {
    let mut occurrences = Vec::new();

    for source in sources {
        let rows: Vec<EntitySourceRow> = read_csv(&source.path)?;
        let before = occurrences.len();

        for (index, row) in rows.iter().enumerate() {
            let Some(value) = row.entities(column) else {
                continue;
            };

            for token in value.split('|') {
                let Some((surface, entity_type)) = token.split_once(',') else {
                    return Err(PipelineError::MalformedEntity {
                        path: source.path.clone(),
                        row: index + 1,
                        token: token.to_string(),
                    });
                };
                let Some(entity) = normalize_entity(surface) else {
                    continue;
                };

                occurrences.push(EntityOccurrence {
                    entity,
                    entity_type: entity_type.to_string(),
                    time: row.time_comment,
                    sentiment: row.sentiment.clone(),
                    score: row.score,
                    company: source.company.clone(),
                    channel: source.channel.clone(),
                });
            }
        }

        debug!(
            path = %source.path.display(),
            column = column.column_name(),
            rows = rows.len(),
            entities = occurrences.len() - before,
            "Source summarized"
        );
    }

    Ok(occurrences)
}

/// Project every source onto the sentiment table and concatenate.
///
/// # Errors
///
/// Fails if any source cannot be read as an annotated table.
pub fn summarize_sentiments(sources: &[SourceSpec]) -> Result<Vec<SentimentRow>> {
    let mut summary = Vec::new();

    for source in sources {
        let rows: Vec<SentimentSourceRow> = read_csv(&source.path)?;
        debug!(path = %source.path.display(), rows = rows.len(), "Source summarized");

        summary.extend(rows.into_iter().map(|row| SentimentRow {
            post: row.post,
            reply: row.reply,
            comment: row.comment,
            sentiment: row.sentiment,
            score: row.score,
            time_comment: row.time_comment,
            company: source.company.clone(),
            channel: source.channel.clone(),
        }));
    }

    Ok(summary)
}
