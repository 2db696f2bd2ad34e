//! Outer join of extracted posts and comments on their shared id.

use std::collections::{HashMap, HashSet};

use crate::models::{CommentRecord, JoinPolicy, JoinedRecord, PostId, PostRecord};

/// Full outer join of `posts` and `comments` on id, filtered by `policy`.
///
/// Rows come out post by post in input order, each post followed by its
/// comments in input order. Under `KeepOrphans`, comments whose id matches
/// no post are appended last. Under `RequireComment` only matched pairs are
/// kept, so posts without comments and orphan comments are both dropped.
#[must_use]
pub fn join(posts: &[PostRecord], comments: &[CommentRecord], policy: JoinPolicy) -> Vec<JoinedRecord> {
    let mut by_id: HashMap<&PostId, Vec<&CommentRecord>> = HashMap::new();
    for comment in comments {
        by_id.entry(&comment.id).or_default().push(comment);
    }
    let post_ids: HashSet<&PostId> = posts.iter().map(|post| &post.id).collect();

    let mut rows = Vec::with_capacity(posts.len().max(comments.len()));
    for post in posts {
        match by_id.get(&post.id) {
            Some(matched) => rows.extend(matched.iter().map(|comment| JoinedRecord {
                id: post.id.clone(),
                post_text: Some(post.text.clone()),
                reply_count: Some(post.reply_count),
                comment_text: Some(comment.text.clone()),
                comment_date: Some(comment.created_at),
            })),
            None if policy == JoinPolicy::KeepOrphans => rows.push(JoinedRecord {
                id: post.id.clone(),
                post_text: Some(post.text.clone()),
                reply_count: Some(post.reply_count),
                comment_text: None,
                comment_date: None,
            }),
            None => {}
        }
    }

    if policy == JoinPolicy::RequireComment {
        return rows;
    }

    rows.extend(
        comments
            .iter()
            .filter(|comment| !post_ids.contains(&comment.id))
            .map(|comment| JoinedRecord {
                id: comment.id.clone(),
                post_text: None,
                reply_count: None,
                comment_text: Some(comment.text.clone()),
                comment_date: Some(comment.created_at),
            }),
    );
    rows
}
