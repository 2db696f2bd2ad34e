//! Facebook page export: a posts file of timeline pages and a separate
//! comments file of comment containers.

use serde_json::Value;
use tracing::debug;

use super::{array_at, collect_nodes, epoch_to_local_date, top_level, Extraction};
use crate::models::{CommentRecord, PostId, PostRecord};
use crate::text::TextNormalizer;

const PAGE_EDGES: &str = "/data/node/timeline_feed_units/edges";
const POST_ID: &str = "/node/feedback/id";
const POST_TEXT: &str = "/node/comet_sections/content/story/comet_sections/message/story/message/text";
const POST_REPLY_COUNT: &str = "/node/comet_sections/feedback/story/feedback_context/\
feedback_target_with_context/ufi_renderer/feedback/comment_count/total_count";

const CONTAINER_EDGES: &str = "/data/feedback/display_comments/edges";
const COMMENT_TEXT: &str = "/node/body/text";
const COMMENT_CREATED: &str = "/node/created_time";
const COMMENT_PARENT: &str = "/node/parent_feedback/id";

/// Extracts posts and comments from a Facebook page export
#[derive(Debug, Clone)]
pub struct FacebookExtractor {
    normalizer: TextNormalizer,
}

impl FacebookExtractor {
    /// Create an extractor that cleans text with `normalizer`
    #[must_use]
    pub const fn new(normalizer: TextNormalizer) -> Self {
        Self { normalizer }
    }

    /// Extract both files; the lists are returned unjoined.
    #[must_use]
    pub fn extract(&self, pages: &Value, containers: &Value) -> Extraction {
        let (posts, skipped_posts) = self.extract_posts(pages);
        let (comments, skipped_comments) = self.extract_comments(containers);

        debug!(
            posts = posts.len(),
            skipped_posts,
            comments = comments.len(),
            skipped_comments,
            "Facebook extraction finished"
        );

        Extraction {
            posts,
            comments,
            skipped_posts,
            skipped_comments,
        }
    }

    /// Posts from every edge of every page, with the number of skipped edges
    #[must_use]
    pub fn extract_posts(&self, pages: &Value) -> (Vec<PostRecord>, usize) {
        let edges = top_level(pages, "facebook posts")
            .iter()
            .flat_map(|page| array_at(page, PAGE_EDGES));
        collect_nodes(edges, |edge| self.post_from_edge(edge))
    }

    /// Comments from every container, with the number of skipped comment nodes
    #[must_use]
    pub fn extract_comments(&self, containers: &Value) -> (Vec<CommentRecord>, usize) {
        let edges = top_level(containers, "facebook comments")
            .iter()
            .flat_map(|container| array_at(container, CONTAINER_EDGES));
        collect_nodes(edges, |edge| self.comment_from_edge(edge))
    }

    fn post_from_edge(&self, edge: &Value) -> Option<PostRecord> {
        let id = edge.pointer(POST_ID)?.as_str()?;
        let text = edge.pointer(POST_TEXT)?.as_str()?;
        let reply_count = edge.pointer(POST_REPLY_COUNT)?.as_u64()?;

        Some(PostRecord {
            id: PostId::from(id),
            text: self.normalizer.normalize(text),
            reply_count,
        })
    }

    fn comment_from_edge(&self, edge: &Value) -> Option<CommentRecord> {
        let text = edge.pointer(COMMENT_TEXT)?.as_str()?;
        let created = edge.pointer(COMMENT_CREATED)?;
        let secs = created.as_i64().or_else(|| created.as_f64().map(|f| f.trunc() as i64))?;
        let created_at = epoch_to_local_date(secs)?;
        let id = edge.pointer(COMMENT_PARENT)?.as_str()?;

        Some(CommentRecord {
            id: PostId::from(id),
            text: self.normalizer.normalize(text),
            created_at,
        })
    }
}
