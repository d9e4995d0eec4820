use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunables shared by the frontend and the authoring CLI.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base path (URL prefix or directory) of the content documents
    pub content_base: String,
    /// Quiet period before a search input is evaluated
    pub search_debounce_ms: u32,
    /// Queries shorter than this (after trimming) leave search inactive
    pub min_query_chars: usize,
    /// Snippet context before the first match, in characters
    pub snippet_before: usize,
    /// Snippet context after the start of the first match, in characters
    pub snippet_after: usize,
    /// How long a navigation target stays highlighted
    pub highlight_ms: u32,
    /// Vertical gap between a term control and its popover, in pixels
    pub popover_gap: f64,
    /// Minimum distance kept between the popover and the viewport's right edge
    pub popover_margin: f64,
    /// Speech language for entry text and the primary glossary language
    pub primary_lang: String,
    /// Speech language for the secondary glossary language
    pub secondary_lang: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content_base: "content-json".to_string(),
            search_debounce_ms: 300,
            min_query_chars: 2,
            snippet_before: 50,
            snippet_after: 150,
            highlight_ms: 1500,
            popover_gap: 8.0,
            popover_margin: 16.0,
            primary_lang: "hi-IN".to_string(),
            secondary_lang: "en-US".to_string(),
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_query_chars == 0 {
            return Err(ConfigError::Invalid {
                field: "min_query_chars",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.snippet_after == 0 {
            return Err(ConfigError::Invalid {
                field: "snippet_after",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.popover_gap < 0.0 || self.popover_margin < 0.0 {
            return Err(ConfigError::Invalid {
                field: "popover_gap/popover_margin",
                reason: "must not be negative".to_string(),
            });
        }
        Ok(())
    }

    /// Join a document name onto `content_base`.
    pub fn document_url(&self, name: &str) -> String {
        let base = self.content_base.trim_end_matches('/');
        if base.is_empty() {
            name.to_string()
        } else {
            format!("{base}/{name}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::from_json(r#"{"search_debounce_ms": 250}"#).unwrap();
        assert_eq!(config.search_debounce_ms, 250);
        assert_eq!(config.min_query_chars, 2);
        assert_eq!(config.primary_lang, "hi-IN");
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Config::from_json(r#"{"debounce": 250}"#).is_err());
    }

    #[test]
    fn test_zero_min_query_rejected() {
        let err = Config::from_json(r#"{"min_query_chars": 0}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "min_query_chars",
                ..
            }
        ));
    }

    #[test]
    fn test_document_url() {
        let mut config = Config::default();
        assert_eq!(config.document_url("part.json"), "content-json/part.json");
        config.content_base = "/static/".to_string();
        assert_eq!(config.document_url("part.json"), "/static/part.json");
        config.content_base = String::new();
        assert_eq!(config.document_url("part.json"), "part.json");
    }
}
