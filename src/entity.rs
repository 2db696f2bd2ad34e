//! Entity surface normalization used while building the entity table.

use unicode_normalization::UnicodeNormalization;

/// Lowercase, fold to ASCII and trim an entity surface.
///
/// Returns `None` (the missing marker) when nothing alphanumeric survives,
/// so callers can drop the occurrence.
///
/// ```
/// use social_sentiment::entity::normalize_entity;
///
/// assert_eq!(normalize_entity("Café").as_deref(), Some("cafe"));
/// assert_eq!(normalize_entity("###"), None);
/// ```
#[must_use]
pub fn normalize_entity(surface: &str) -> Option<String> {
    let folded: String = surface
        .to_lowercase()
        .nfkd()
        .filter(char::is_ascii)
        // compatibility forms such as U+210C decompose to uppercase ASCII
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let folded = folded.trim();

    if folded.chars().any(|c| c.is_ascii_alphanumeric()) {
        Some(folded.to_string())
    } else {
        None
    }
}
