//! Runtime configuration for commit message generation.
//!
//! Values come from defaults, then `C4F_*` environment variables, then CLI
//! flags. [`Config::validate`] enforces the accepted ranges.

use std::env;
use std::ops::RangeInclusive;

use tracing::warn;

use crate::error::ConfigError;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Local free LLM gateway exposing an OpenAI-compatible API.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:1337/v1/chat/completions";

pub const ENDPOINT_ENV_VAR: &str = "C4F_ENDPOINT";
pub const API_KEY_ENV_VAR: &str = "C4F_API_KEY";
pub const MODEL_ENV_VAR: &str = "C4F_MODEL";
pub const TIMEOUT_ENV_VAR: &str = "C4F_TIMEOUT";

pub const PROMPT_THRESHOLD_RANGE: RangeInclusive<usize> = 10..=500;
pub const FALLBACK_TIMEOUT_RANGE: RangeInclusive<f64> = 1.0..=60.0;
pub const ATTEMPTS_RANGE: RangeInclusive<u32> = 1..=10;
pub const MAX_WORKERS_RANGE: RangeInclusive<usize> = 1..=16;

/// Settings for the commit message generator.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Require a `(scope)` after the commit type.
    pub force_brackets: bool,
    /// Total diff lines at or above which the comprehensive prompt is used.
    pub prompt_threshold: usize,
    /// Seconds to wait for a single model response.
    pub fallback_timeout: f64,
    /// Comprehensive messages shorter than this are treated as suspicious.
    pub min_comprehensive_length: usize,
    /// Number of generation attempts before the fallback message is used.
    pub attempts: u32,
    /// Lines of each file diff included in the comprehensive prompt.
    pub diff_max_length: usize,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    /// Prefix messages with an icon for their commit type.
    pub icon: bool,
    /// Use ASCII icons even when the terminal can render emoji.
    pub ascii_only: bool,
    /// Concurrent requests while pre-generating messages.
    pub max_workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            force_brackets: false,
            prompt_threshold: 80,
            fallback_timeout: 10.0,
            min_comprehensive_length: 50,
            attempts: 3,
            diff_max_length: 100,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            icon: false,
            ascii_only: false,
            max_workers: 4,
        }
    }
}

impl Config {
    /// Defaults overlaid with any `C4F_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(endpoint) = non_empty_var(ENDPOINT_ENV_VAR) {
            config.endpoint = endpoint;
        }
        if let Some(model) = non_empty_var(MODEL_ENV_VAR) {
            config.model = model;
        }
        config.api_key = non_empty_var(API_KEY_ENV_VAR);
        if let Some(raw) = non_empty_var(TIMEOUT_ENV_VAR) {
            match raw.parse::<f64>() {
                Ok(secs) if FALLBACK_TIMEOUT_RANGE.contains(&secs) => {
                    config.fallback_timeout = secs;
                }
                _ => warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, raw, config.fallback_timeout
                ),
            }
        }

        config
    }

    /// Check every field against its accepted range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !PROMPT_THRESHOLD_RANGE.contains(&self.prompt_threshold) {
            return Err(invalid(format!(
                "prompt_threshold must be an integer between {} and {}",
                PROMPT_THRESHOLD_RANGE.start(),
                PROMPT_THRESHOLD_RANGE.end()
            )));
        }
        if !self.fallback_timeout.is_finite()
            || !FALLBACK_TIMEOUT_RANGE.contains(&self.fallback_timeout)
        {
            return Err(invalid(format!(
                "fallback_timeout must be a number between {:.1} and {:.1}",
                FALLBACK_TIMEOUT_RANGE.start(),
                FALLBACK_TIMEOUT_RANGE.end()
            )));
        }
        if !ATTEMPTS_RANGE.contains(&self.attempts) {
            return Err(invalid(format!(
                "attempt must be an integer between {} and {}",
                ATTEMPTS_RANGE.start(),
                ATTEMPTS_RANGE.end()
            )));
        }
        if !MAX_WORKERS_RANGE.contains(&self.max_workers) {
            return Err(invalid(format!(
                "max_workers must be an integer between {} and {}",
                MAX_WORKERS_RANGE.start(),
                MAX_WORKERS_RANGE.end()
            )));
        }
        if self.model.trim().is_empty() {
            return Err(invalid("model must not be empty".to_string()));
        }
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(invalid(format!(
                "endpoint must be an http(s) URL, got '{}'",
                self.endpoint
            )));
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

fn invalid(msg: String) -> ConfigError {
    ConfigError::Invalid(msg)
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
