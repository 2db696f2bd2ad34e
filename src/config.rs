use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub annotation: AnnotationConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
    pub format: String, // "json" or "text"
}

/// Label set a sentiment classifier emits, with its stock score table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorePreset {
    /// `positive`, `neutral` and `negative` scored 1, 0 and -1
    #[default]
    ThreeClass,
    /// `1 star` through `5 stars` scored 1 through 5
    FiveStar,
}

impl ScorePreset {
    /// Stock label to score table for this preset
    #[must_use]
    pub fn scores(self) -> HashMap<String, f64> {
        match self {
            Self::ThreeClass => HashMap::from([
                ("positive".to_string(), 1.0),
                ("neutral".to_string(), 0.0),
                ("negative".to_string(), -1.0),
            ]),
            Self::FiveStar => (1..=5u8)
                .map(|stars| (star_label(stars), f64::from(stars)))
                .collect(),
        }
    }
}

/// Label a five-star classifier gives a rating: `1 star`, `2 stars`, ...
#[must_use]
pub fn star_label(stars: u8) -> String {
    if stars == 1 {
        "1 star".to_string()
    } else {
        format!("{stars} stars")
    }
}

/// Calling discipline for the sentiment and entity collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationConfig {
    /// Budget for a single classifier or recognizer call
    pub timeout_ms: u64,
    /// Entity types dropped before serialization
    pub entity_blacklist: Vec<String>,
    /// Which label set is classified and scored
    #[serde(default)]
    pub score_preset: ScorePreset,
    /// Per-label overrides on top of the preset table
    #[serde(default)]
    pub sentiment_scores: HashMap<String, f64>,
}

impl AnnotationConfig {
    /// Preset table with `sentiment_scores` entries layered over it
    #[must_use]
    pub fn score_table(&self) -> HashMap<String, f64> {
        let mut table = self.score_preset.scores();
        table.extend(self.sentiment_scores.iter().map(|(label, score)| (label.clone(), *score)));
        table
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub directory: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                format: "text".to_string(),
            },
            annotation: AnnotationConfig {
                timeout_ms: 3000,
                entity_blacklist: ["DATE", "TIME", "QUANTITY", "CARDINAL", "Url", "Quantity", "DateTime"]
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
                score_preset: ScorePreset::ThreeClass,
                sentiment_scores: HashMap::new(),
            },
            output: OutputConfig {
                directory: "./output".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence
    pub fn load() -> Result<Self> {
        let defaults = Config::try_from(&Self::default())
            .map_err(|e| anyhow::anyhow!("Failed to serialize default configuration: {}", e))?;

        let config = Config::builder()
            // Start with default values
            .add_source(defaults)
            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(File::with_name("config").required(false))
            // Add environment variables with prefix
            .add_source(
                Environment::with_prefix("SOCIAL_SENTIMENT")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("annotation.entity_blacklist")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize configuration: {}", e))?;

        // Validate configuration
        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        // Validate logging config
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            ));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            ));
        }

        // Validate annotation config
        if self.annotation.timeout_ms == 0 {
            return Err(anyhow::anyhow!("timeout_ms must be greater than 0"));
        }
        if let Some((label, score)) = self
            .annotation
            .sentiment_scores
            .iter()
            .find(|(_, score)| !score.is_finite())
        {
            return Err(anyhow::anyhow!("Score for label {} is not finite: {}", label, score));
        }

        if self.output.directory.trim().is_empty() {
            return Err(anyhow::anyhow!("output directory cannot be empty"));
        }

        Ok(())
    }

    /// Get log level from environment or config
    pub fn get_log_level(&self) -> String {
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| self.logging.level.clone())
    }

    /// Get log file path from environment or config
    pub fn get_log_file(&self) -> Option<String> {
        std::env::var("SOCIAL_SENTIMENT_LOG_FILE")
            .ok()
            .or_else(|| self.logging.file_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.annotation.timeout_ms, 3000);
        assert_eq!(config.annotation.score_preset, ScorePreset::ThreeClass);
        assert_eq!(config.annotation.score_table().get("negative"), Some(&-1.0));
    }

    #[test]
    fn test_five_star_preset_table() {
        let table = ScorePreset::FiveStar.scores();
        assert_eq!(table.len(), 5);
        assert_eq!(table.get("1 star"), Some(&1.0));
        assert_eq!(table.get("4 stars"), Some(&4.0));
        assert!(!table.contains_key("positive"));
    }

    #[test]
    fn test_overrides_layer_over_preset() {
        let mut config = AppConfig::default();
        config.annotation.score_preset = ScorePreset::FiveStar;
        config.annotation.sentiment_scores.insert("3 stars".to_string(), 0.0);

        let table = config.annotation.score_table();
        assert_eq!(table.get("3 stars"), Some(&0.0));
        assert_eq!(table.get("5 stars"), Some(&5.0));
    }

    #[test]
    fn test_config_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let mut config = AppConfig::default();
        config.annotation.timeout_ms = 0;
        assert!(config.validate().is_err());
    }
}
