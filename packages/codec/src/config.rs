use crate::error::ConfigError;
use crate::metrics::{DEFAULT_ELLIPSIS, DEFAULT_EXCERPT_LENGTH, UNTITLED_TITLE};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "scribe.config.json";

/// Average adult silent-reading speed used for reading time estimates
pub const DEFAULT_WORDS_PER_MINUTE: u32 = 225;

pub const DEFAULT_AUTHOR: &str = "Anonymous";

/// Codec and metrics configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodecConfig {
    /// Reading speed for reading time
    #[serde(default = "default_words_per_minute")]
    pub words_per_minute: u32,

    /// Default excerpt length in characters
    #[serde(default = "default_excerpt_length")]
    pub excerpt_length: usize,

    /// Marker appended to truncated excerpts
    #[serde(default = "default_ellipsis")]
    pub ellipsis: String,

    /// Title used when the document has no heading
    #[serde(default = "default_untitled_title")]
    pub untitled_title: String,

    /// Author used when none was entered
    #[serde(default = "default_author")]
    pub default_author: String,
}

fn default_words_per_minute() -> u32 {
    DEFAULT_WORDS_PER_MINUTE
}

fn default_excerpt_length() -> usize {
    DEFAULT_EXCERPT_LENGTH
}

fn default_ellipsis() -> String {
    DEFAULT_ELLIPSIS.to_string()
}

fn default_untitled_title() -> String {
    UNTITLED_TITLE.to_string()
}

fn default_author() -> String {
    DEFAULT_AUTHOR.to_string()
}

impl CodecConfig {
    /// Load config from a directory, falling back to defaults when the
    /// directory has no config file
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config_path = dir.as_ref().join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: CodecConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.words_per_minute == 0 {
            return Err(ConfigError::Invalid(
                "wordsPerMinute must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            words_per_minute: default_words_per_minute(),
            excerpt_length: default_excerpt_length(),
            ellipsis: default_ellipsis(),
            untitled_title: default_untitled_title(),
            default_author: default_author(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "wordsPerMinute": 200,
            "excerptLength": 120,
            "ellipsis": "...",
            "untitledTitle": "Draft"
        }"#;

        let config = CodecConfig::from_json(json).unwrap();
        assert_eq!(config.words_per_minute, 200);
        assert_eq!(config.excerpt_length, 120);
        assert_eq!(config.ellipsis, "...");
        assert_eq!(config.untitled_title, "Draft");
        assert_eq!(config.default_author, "Anonymous");
    }

    #[test]
    fn test_default_config() {
        let config = CodecConfig::default();
        assert_eq!(config.words_per_minute, 225);
        assert_eq!(config.excerpt_length, 160);
        assert_eq!(config.ellipsis, "…");
        assert_eq!(config.untitled_title, "Untitled Article");
    }

    #[test]
    fn test_zero_reading_speed_rejected() {
        let err = CodecConfig::from_json(r#"{ "wordsPerMinute": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(CodecConfig::load(dir.path()).unwrap(), CodecConfig::default());

        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "excerptLength": 40 }"#,
        )
        .unwrap();
        let config = CodecConfig::load(dir.path()).unwrap();
        assert_eq!(config.excerpt_length, 40);
        assert_eq!(config.words_per_minute, DEFAULT_WORDS_PER_MINUTE);
    }
}
