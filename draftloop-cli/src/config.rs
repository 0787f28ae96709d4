//! Settings loaded from `~/.draftloop/config.toml`

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use draftloop_core::{AnnotationPolicy, RetryPolicy};

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Falls back to the `OPENAI_API_KEY` environment variable
    pub api_key: Option<String>,
    pub base_url: String,
    pub draft_model: String,
    pub analysis_model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub annotation_policy: AnnotationPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            draft_model: "gpt-4o".to_string(),
            analysis_model: "gpt-4".to_string(),
            temperature: 0.7,
            timeout_secs: 30,
            max_retries: 2,
            retry_backoff_ms: 500,
            annotation_policy: AnnotationPolicy::default(),
        }
    }
}

impl Config {
    /// Load `path`, or the defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Take the API key from the environment when the file has none
    pub fn with_env_key(mut self, env_key: Option<String>) -> Self {
        if self.api_key.as_deref().map_or(true, str::is_empty) {
            self.api_key = env_key.filter(|k| !k.trim().is_empty());
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_file() {
        let config = Config::parse(
            r#"
            draft_model = "gpt-4o-mini"
            timeout_secs = 10
            annotation_policy = "highlight-only"
            "#,
        )
        .unwrap();
        assert_eq!(config.draft_model, "gpt-4o-mini");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.annotation_policy, AnnotationPolicy::HighlightOnly);
        assert_eq!(config.analysis_model, "gpt-4");
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        assert!(Config::parse("modle = \"gpt-4\"").is_err());
    }

    #[test]
    fn test_env_key_fallback() {
        let config = Config::default().with_env_key(Some("sk-env".into()));
        assert_eq!(config.api_key.as_deref(), Some("sk-env"));

        let file_key = Config {
            api_key: Some("sk-file".into()),
            ..Config::default()
        }
        .with_env_key(Some("sk-env".into()));
        assert_eq!(file_key.api_key.as_deref(), Some("sk-file"));

        assert_eq!(Config::default().with_env_key(Some("  ".into())).api_key, None);
    }
}
