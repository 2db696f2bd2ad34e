//! Free-text cleanup applied to every post and comment before storage.

use regex::Regex;

use crate::error::{PipelineError, Result};

/// Leading characters that mark a mention or hashtag token.
const ENTITY_PREFIXES: [char; 2] = ['@', '#'];

/// Strips URLs, mentions, hashtags and punctuation from social media text
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    url_regex: Regex,
    emoji_regex: Regex,
}

impl TextNormalizer {
    /// Compile the cleanup patterns
    pub fn new() -> Result<Self> {
        let url_regex = Regex::new(r"http\S+")
            .map_err(|e| PipelineError::Other(format!("Failed to compile URL regex: {e}")))?;
        // emoticons, symbols & pictographs, transport & map, flags
        let emoji_regex = Regex::new(
            r"[\x{1F600}-\x{1F64F}\x{1F300}-\x{1F5FF}\x{1F680}-\x{1F6FF}\x{1F1E0}-\x{1F1FF}]",
        )
        .map_err(|e| PipelineError::Other(format!("Failed to compile emoji regex: {e}")))?;

        Ok(Self {
            url_regex,
            emoji_regex,
        })
    }

    /// Remove URLs, then mention/hashtag tokens, then punctuation.
    ///
    /// ```
    /// use social_sentiment::text::TextNormalizer;
    ///
    /// let normalizer = TextNormalizer::new().unwrap();
    /// assert_eq!(
    ///     normalizer.normalize("Check this http://x.co out @bob #cool!"),
    ///     "Check this out"
    /// );
    /// ```
    #[must_use]
    pub fn normalize(&self, text: &str) -> String {
        let no_urls = self.url_regex.replace_all(text, "");
        strip_entities(&no_urls)
    }

    /// Drop emoji from the four pictographic blocks, leaving everything else.
    #[must_use]
    pub fn strip_emoji(&self, text: &str) -> String {
        self.emoji_regex.replace_all(text, "").into_owned()
    }
}

fn strip_entities(text: &str) -> String {
    let spaced: String = text
        .chars()
        .map(|c| {
            if c.is_ascii_punctuation() && !ENTITY_PREFIXES.contains(&c) {
                ' '
            } else {
                c
            }
        })
        .collect();

    spaced
        .split_whitespace()
        .filter(|word| !word.starts_with(ENTITY_PREFIXES))
        .collect::<Vec<_>>()
        .join(" ")
}
