//! Explicit configuration for the annotation store core.
//!
//! Everything the mappers and clients need is carried in one `Config` struct
//! passed into constructors. There is no process-wide ambient state: two repos
//! with different configs can coexist in one process.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Public base URI annotations are minted under, e.g.
    /// `https://annotations.example.org/annos`. The root of a persisted
    /// annotation is `{base_uri}/{id}`.
    pub base_uri: String,
    /// LDP store settings.
    pub ldp: LdpConfig,
    /// Search service settings.
    pub search: SearchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_uri: "http://localhost:3000/annotations".into(),
            ldp: LdpConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

/// LDP store connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LdpConfig {
    /// URL of the LDP container all annotations live under,
    /// e.g. `http://localhost:8983/fedora/rest/anno`. No trailing slash.
    pub url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LdpConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080/rest/anno".into(),
            timeout_secs: 30,
        }
    }
}

/// Search service settings, including the retry policy the search client
/// (and only the search client) applies before surfacing an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Base URL of the search core, e.g. `http://localhost:8983/solr/annotations`.
    pub url: String,
    /// Maximum attempts per operation (1 = no retry).
    pub max_attempts: u32,
    /// Initial sleep between attempts, in milliseconds.
    pub base_sleep_ms: u64,
    /// Multiplier applied to the sleep after each failed attempt.
    pub backoff_multiplier: f64,
    /// Upper bound on the sleep between attempts, in milliseconds.
    pub max_sleep_ms: u64,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8983/solr/annotations".into(),
            max_attempts: 5,
            base_sleep_ms: 100,
            backoff_multiplier: 2.0,
            max_sleep_ms: 5_000,
            timeout_secs: 30,
        }
    }
}

impl SearchConfig {
    /// Sleep duration before retry number `attempt` (1-based), with
    /// exponential backoff capped at `max_sleep_ms`.
    pub fn sleep_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);
        let ms = (self.base_sleep_ms as f64 * factor).min(self.max_sleep_ms as f64);
        Duration::from_millis(ms as u64)
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents).map_err(|e| ConfigError::Invalid {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants the rest of the crate relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("base_uri", &self.base_uri),
            ("ldp.url", &self.ldp.url),
            ("search.url", &self.search.url),
        ] {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                return Err(ConfigError::Invalid {
                    message: format!("{name} must be an http(s) URL, got {value:?}"),
                });
            }
            if value.ends_with('/') {
                return Err(ConfigError::Invalid {
                    message: format!("{name} must not end with a slash, got {value:?}"),
                });
            }
        }
        if self.search.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                message: "search.max_attempts must be at least 1".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn from_toml_overrides_fields() {
        let config = Config::from_toml(
            r#"
            base_uri = "https://annos.example.org/annotations"

            [ldp]
            url = "https://fedora.example.org/rest/anno"

            [search]
            url = "https://solr.example.org/solr/annos"
            max_attempts = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.base_uri, "https://annos.example.org/annotations");
        assert_eq!(config.ldp.url, "https://fedora.example.org/rest/anno");
        assert_eq!(config.search.max_attempts, 3);
        // Untouched fields keep defaults.
        assert_eq!(config.search.backoff_multiplier, 2.0);
    }

    #[test]
    fn trailing_slash_rejected() {
        let result = Config::from_toml(r#"base_uri = "http://x.org/annos/""#);
        assert!(result.is_err());
    }

    #[test]
    fn zero_attempts_rejected() {
        let result = Config::from_toml(
            r#"
            [search]
            max_attempts = 0
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn backoff_is_exponential_and_capped() {
        let search = SearchConfig {
            base_sleep_ms: 100,
            backoff_multiplier: 2.0,
            max_sleep_ms: 500,
            ..Default::default()
        };
        assert_eq!(search.sleep_for_attempt(1), Duration::from_millis(100));
        assert_eq!(search.sleep_for_attempt(2), Duration::from_millis(200));
        assert_eq!(search.sleep_for_attempt(3), Duration::from_millis(400));
        assert_eq!(search.sleep_for_attempt(4), Duration::from_millis(500));
    }
}
