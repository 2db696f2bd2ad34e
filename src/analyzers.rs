//! Built-in reference collaborators for the annotation step.
//!
//! These are small rule-based stand-ins so the command line works without a
//! model server. Any real classifier or recognizer plugs in through the same
//! traits.

use async_trait::async_trait;
use whatlang::{detect, Lang};

use crate::annotate::{EntityRecognizer, RecognizedEntity, SentimentClassifier, SentimentPrediction};
use crate::config::{star_label, ScorePreset};
use crate::error::Result;

/// Scores closer to zero than this are labelled neutral.
const NEUTRAL_BAND: f64 = 0.05;

const POSITIVE_WORDS: [(&str, f64); 24] = [
    ("good", 1.0),
    ("great", 1.5),
    ("love", 2.0),
    ("loved", 2.0),
    ("amazing", 2.0),
    ("awesome", 1.8),
    ("best", 1.5),
    ("thanks", 1.0),
    ("thank", 1.0),
    ("happy", 1.2),
    ("recommend", 1.5),
    ("helpful", 1.2),
    ("fast", 0.8),
    ("friendly", 1.2),
    ("excellent", 2.0),
    ("perfect", 2.0),
    ("nice", 1.0),
    ("fantastic", 1.8),
    ("beautiful", 1.5),
    ("comfortable", 1.2),
    ("favorite", 1.5),
    ("fresh", 0.8),
    ("quality", 0.8),
    ("win", 1.2),
];

const NEGATIVE_WORDS: [(&str, f64); 24] = [
    ("bad", -1.0),
    ("worst", -2.0),
    ("terrible", -2.0),
    ("awful", -2.0),
    ("hate", -2.0),
    ("horrible", -2.0),
    ("broken", -1.5),
    ("refund", -1.2),
    ("scam", -2.0),
    ("slow", -1.0),
    ("rude", -1.5),
    ("disappointed", -1.5),
    ("disappointing", -1.5),
    ("poor", -1.2),
    ("waste", -1.5),
    ("cancel", -1.0),
    ("expensive", -0.8),
    ("late", -0.8),
    ("never", -0.5),
    ("useless", -1.5),
    ("angry", -1.5),
    ("boycott", -2.0),
    ("fake", -1.5),
    ("ripoff", -2.0),
];

const INTENSIFIERS: [(&str, f64); 8] = [
    ("very", 1.5),
    ("so", 1.2),
    ("really", 1.3),
    ("extremely", 2.0),
    ("totally", 1.8),
    ("super", 1.5),
    ("absolutely", 2.0),
    ("slightly", 0.7),
];

const NEGATIONS: [&str; 10] = [
    "not", "no", "dont", "didnt", "isnt", "wasnt", "cant", "wont", "nothing", "nobody",
];

/// Lexicon classifier emitting `positive`, `neutral` or `negative`
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    /// Signed score in `[-1, 1]`; zero when no lexicon word is present.
    #[must_use]
    pub fn score(&self, text: &str) -> f64 {
        let words: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();

        let mut total = 0.0;
        let mut hits = 0.0;
        for (i, word) in words.iter().enumerate() {
            let Some(weight) = POSITIVE_WORDS
                .iter()
                .chain(NEGATIVE_WORDS.iter())
                .find(|(w, _)| *w == word.as_str())
                .map(|(_, weight)| *weight)
            else {
                continue;
            };

            let mut sentiment = weight;
            if let Some(prev) = i.checked_sub(1).map(|p| words[p].as_str()) {
                if let Some((_, intensity)) = INTENSIFIERS.iter().find(|(w, _)| *w == prev) {
                    sentiment *= intensity;
                }
            }
            // negation up to two words back flips and dampens
            let negated = words[i.saturating_sub(2)..i]
                .iter()
                .any(|w| NEGATIONS.contains(&w.as_str()));
            if negated {
                sentiment = -sentiment * 0.8;
            }

            total += sentiment;
            hits += 1.0;
        }

        if hits == 0.0 {
            0.0
        } else {
            (total / hits / 2.0).clamp(-1.0, 1.0)
        }
    }
}

#[async_trait]
impl SentimentClassifier for LexiconClassifier {
    async fn classify(&self, text: &str) -> Result<SentimentPrediction> {
        let score = self.score(text);
        let (label, confidence) = if score > NEUTRAL_BAND {
            ("positive", 0.5 + score / 2.0)
        } else if score < -NEUTRAL_BAND {
            ("negative", 0.5 - score / 2.0)
        } else {
            ("neutral", 1.0 - score.abs())
        };

        Ok(SentimentPrediction {
            label: label.to_string(),
            confidence,
        })
    }
}

/// Lexicon classifier emitting `1 star` through `5 stars`
#[derive(Debug, Clone, Copy, Default)]
pub struct StarRatingClassifier;

impl StarRatingClassifier {
    /// Map a lexicon score in `[-1, 1]` onto a rating and its confidence.
    ///
    /// Confidence falls from 1 at a rating's centre to 0.5 at the boundary
    /// with its neighbour.
    #[must_use]
    pub fn rate(score: f64) -> (u8, f64) {
        let position = (score.clamp(-1.0, 1.0) + 1.0) * 2.0 + 1.0;
        let stars = position.round().clamp(1.0, 5.0);
        (stars as u8, 1.0 - (position - stars).abs())
    }
}

#[async_trait]
impl SentimentClassifier for StarRatingClassifier {
    async fn classify(&self, text: &str) -> Result<SentimentPrediction> {
        let (stars, confidence) = Self::rate(LexiconClassifier.score(text));
        Ok(SentimentPrediction {
            label: star_label(stars),
            confidence,
        })
    }
}

/// Built-in classifier whose labels match `preset`
#[must_use]
pub fn classifier_for(preset: ScorePreset) -> Box<dyn SentimentClassifier> {
    match preset {
        ScorePreset::ThreeClass => Box::new(LexiconClassifier),
        ScorePreset::FiveStar => Box::new(StarRatingClassifier),
    }
}

/// Capitalized words that open sentences rather than name things.
const SENTENCE_STARTERS: [&str; 12] = [
    "I", "The", "A", "An", "This", "That", "We", "My", "It", "You", "They", "Our",
];

const ORG_SUFFIXES: [&str; 9] = [
    "Inc", "Corp", "Co", "Ltd", "LLC", "Company", "Group", "Bank", "Airlines",
];

const KNOWN_PLACES: [&str; 16] = [
    "Seattle", "Portland", "Chicago", "Boston", "Toronto", "Vancouver", "London", "Paris",
    "Berlin", "Tokyo", "California", "Texas", "Canada", "Mexico", "York", "Oregon",
];

/// Recognizer that groups runs of capitalized words in English text
#[derive(Debug, Clone, Copy, Default)]
pub struct CapitalizedEntityRecognizer;

impl CapitalizedEntityRecognizer {
    fn spans(text: &str) -> Vec<Vec<&str>> {
        let mut spans = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for (i, word) in text.split_whitespace().enumerate() {
            let capitalized = word.chars().next().is_some_and(char::is_uppercase);
            let starter = i == 0 && SENTENCE_STARTERS.contains(&word);
            if capitalized && !starter {
                current.push(word);
            } else if !current.is_empty() {
                spans.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            spans.push(current);
        }
        spans
    }

    fn classify_span(words: &[&str]) -> &'static str {
        let last = words.last().copied().unwrap_or_default();
        if ORG_SUFFIXES.contains(&last) || words.iter().all(|w| w.len() > 1 && w.chars().all(|c| !c.is_lowercase())) {
            "ORG"
        } else if words.iter().any(|w| KNOWN_PLACES.contains(w)) {
            "LOC"
        } else if words.len() >= 2 {
            "PERSON"
        } else {
            "MISC"
        }
    }
}

#[async_trait]
impl EntityRecognizer for CapitalizedEntityRecognizer {
    async fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>> {
        if let Some(info) = detect(text) {
            if info.lang() != Lang::Eng && info.is_reliable() {
                return Ok(Vec::new());
            }
        }

        Ok(Self::spans(text)
            .into_iter()
            .map(|words| RecognizedEntity::new(words.join(" "), Self::classify_span(&words)))
            .collect())
    }
}
