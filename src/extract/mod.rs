//! Recovery of flat post and comment records from platform export JSON.
//!
//! Exports omit fields unpredictably, so every node goes through the same
//! rule: attempt the extraction, get an `Option`, drop the node on `None`.
//! Fields that live under more than one shape are looked up through an
//! ordered list of JSON pointers and the first one that resolves wins.

mod facebook;
mod timestamp;
mod tweet;

pub use facebook::FacebookExtractor;
pub use timestamp::{epoch_to_local_date, parse_loose_date};
pub use tweet::TweetExtractor;

use serde_json::Value;
use tracing::warn;

use crate::models::{CommentRecord, PostRecord};

/// Records recovered from one export, plus how many nodes were dropped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Posts in export order
    pub posts: Vec<PostRecord>,
    /// Comments in export order
    pub comments: Vec<CommentRecord>,
    /// Post nodes skipped for a missing or mistyped field
    pub skipped_posts: usize,
    /// Comment nodes skipped for a missing or mistyped field
    pub skipped_comments: usize,
}

impl Extraction {
    /// Split into the post and comment lists
    #[must_use]
    pub fn into_parts(self) -> (Vec<PostRecord>, Vec<CommentRecord>) {
        (self.posts, self.comments)
    }
}

/// Run `attempt` over every node, keeping what it returns.
///
/// Returns the kept records and the number of nodes that yielded `None`.
pub(crate) fn collect_nodes<'a, T>(
    nodes: impl IntoIterator<Item = &'a Value>,
    mut attempt: impl FnMut(&'a Value) -> Option<T>,
) -> (Vec<T>, usize) {
    let mut kept = Vec::new();
    let mut skipped = 0;
    for node in nodes {
        match attempt(node) {
            Some(record) => kept.push(record),
            None => skipped += 1,
        }
    }
    (kept, skipped)
}

/// Resolve the first shape in `shapes` for which `extract` succeeds.
pub(crate) fn first_resolved<'a, T>(
    node: &'a Value,
    shapes: &[&str],
    extract: impl Fn(&'a Value) -> Option<T>,
) -> Option<T> {
    shapes
        .iter()
        .filter_map(|shape| node.pointer(shape))
        .find_map(extract)
}

/// Array found at `pointer`, or an empty slice when the path is missing.
pub(crate) fn array_at<'a>(node: &'a Value, pointer: &str) -> &'a [Value] {
    node.pointer(pointer)
        .and_then(Value::as_array)
        .map_or(&[], Vec::as_slice)
}

/// The top-level sequence of an export.
pub(crate) fn top_level<'a>(export: &'a Value, what: &str) -> &'a [Value] {
    if let Some(items) = export.as_array() {
        items
    } else {
        warn!(export = what, "Export root is not an array, nothing to extract");
        &[]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collect_nodes_counts_misses() {
        let nodes = json!([{"v": 1}, {"w": 2}, {"v": 3}]);
        let (kept, skipped) = collect_nodes(top_level(&nodes, "test"), |n| n.get("v")?.as_u64());
        assert_eq!(kept, vec![1, 3]);
        assert_eq!(skipped, 1);
    }

    #[test]
    fn test_first_resolved_falls_through_shapes() {
        let node = json!({"b": {"x": "found"}, "a": {"y": 1}});
        let found = first_resolved(&node, &["/a", "/b"], |v| v.get("x")?.as_str());
        assert_eq!(found, Some("found"));
    }

    #[test]
    fn test_first_resolved_prefers_earlier_shape() {
        let node = json!({"a": {"x": "first"}, "b": {"x": "second"}});
        let found = first_resolved(&node, &["/a", "/b"], |v| v.get("x")?.as_str());
        assert_eq!(found, Some("first"));
    }

    #[test]
    fn test_array_at_missing_is_empty() {
        let node = json!({"a": {"b": 3}});
        assert!(array_at(&node, "/a/b").is_empty());
        assert!(array_at(&node, "/nope").is_empty());
    }

    #[test]
    fn test_top_level_rejects_objects() {
        assert!(top_level(&json!({"data": []}), "test").is_empty());
        assert_eq!(top_level(&json!([1, 2]), "test").len(), 2);
    }
}
