//! Tweet thread export: one object per thread, root tweet first in the
//! entry list and replies after it.

use serde_json::Value;
use tracing::debug;

use super::{collect_nodes, first_resolved, parse_loose_date, top_level, Extraction};
use crate::models::{CommentRecord, PostId, PostRecord};
use crate::text::TextNormalizer;

/// Where a thread's entry list lives, in lookup order: a conversation
/// payload first, then a user timeline payload.
const ENTRY_SHAPES: [&str; 2] = [
    "/data/threaded_conversation_with_injections/instructions/0/entries",
    "/data/user/result/timeline/timeline/instructions/0/entries",
];

const ROOT_LEGACY: &str = "/0/content/itemContent/tweet_results/result/legacy";
const REPLY_LEGACY: &str = "/content/items/0/item/itemContent/tweet_results/result/legacy";

/// Extracts root posts and replies from a tweet thread export
#[derive(Debug, Clone)]
pub struct TweetExtractor {
    normalizer: TextNormalizer,
}

impl TweetExtractor {
    /// Create an extractor that cleans text with `normalizer`
    #[must_use]
    pub const fn new(normalizer: TextNormalizer) -> Self {
        Self { normalizer }
    }

    /// Extract every thread; post ids are thread positions in the export.
    ///
    /// A thread whose root text or reply count cannot be resolved contributes
    /// nothing, its replies included.
    #[must_use]
    pub fn extract(&self, threads: &Value) -> Extraction {
        let mut extraction = Extraction::default();

        for (index, thread) in top_level(threads, "tweet threads").iter().enumerate() {
            let Some(post) = self.root_post(index, thread) else {
                extraction.skipped_posts += 1;
                continue;
            };
            extraction.posts.push(post);

            let Some(entries) = first_resolved(thread, &ENTRY_SHAPES, Value::as_array) else {
                continue;
            };
            let (comments, skipped) = collect_nodes(entries.iter().skip(1), |entry| {
                self.reply(index, entry)
            });
            extraction.comments.extend(comments);
            extraction.skipped_comments += skipped;
        }

        debug!(
            posts = extraction.posts.len(),
            skipped_posts = extraction.skipped_posts,
            comments = extraction.comments.len(),
            skipped_comments = extraction.skipped_comments,
            "Tweet extraction finished"
        );

        extraction
    }

    fn root_post(&self, index: usize, thread: &Value) -> Option<PostRecord> {
        let text = first_resolved(thread, &ENTRY_SHAPES, |entries| {
            entries.pointer(ROOT_LEGACY)?.get("full_text")?.as_str()
        })?;
        let reply_count = first_resolved(thread, &ENTRY_SHAPES, |entries| {
            entries.pointer(ROOT_LEGACY)?.get("reply_count")?.as_u64()
        })?;

        Some(PostRecord {
            id: PostId::from(index),
            text: self.normalizer.normalize(text),
            reply_count,
        })
    }

    fn reply(&self, index: usize, entry: &Value) -> Option<CommentRecord> {
        let legacy = entry.pointer(REPLY_LEGACY)?;
        let text = legacy.get("full_text")?.as_str()?;
        let created_at = parse_loose_date(legacy.get("created_at")?.as_str()?)?;

        Some(CommentRecord {
            id: PostId::from(index),
            text: self.normalizer.normalize(text),
            created_at,
        })
    }
}
