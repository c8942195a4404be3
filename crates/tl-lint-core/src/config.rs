//! Configuration types for tl-lint.
//!
//! ```toml
//! [analyzer]
//! root = "./src"
//! exclude = ["**/node_modules/**"]
//!
//! [settings]
//! utils-module = "test-utils"
//! custom-renders = ["renderWithProviders"]
//!
//! [rules.prefer-screen-queries]
//! severity = "warning"
//! custom-queries = ["getByIcon"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Top-level configuration for tl-lint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Shared settings read by every rule (see [`Settings`](crate::Settings)).
    ///
    /// Kept as a raw table so malformed values degrade to defaults instead of
    /// failing the whole config.
    #[serde(default)]
    pub settings: toml::Table,

    /// Per-rule configurations.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a rule is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<crate::Severity> {
        self.rules.get(rule_name).and_then(|c| c.severity)
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Root directory to analyze (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns to exclude from analysis.
    #[serde(default = "default_excludes")]
    pub exclude: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: default_excludes(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_excludes() -> Vec<String> {
    vec!["**/node_modules/**".to_string(), "**/dist/**".to_string()]
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<crate::Severity>,

    /// Rule-specific options, including per-rule overrides of shared settings.
    #[serde(flatten)]
    pub options: toml::Table,
}

impl RuleConfig {
    /// Raw option value.
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&toml::Value> {
        self.options.get(key)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Severity;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analyzer.root, PathBuf::from("."));
        assert!(config.settings.is_empty());
        assert!(config.rules.is_empty());
        assert!(config.is_rule_enabled("anything"));
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[analyzer]
root = "./src"
exclude = ["**/generated/**"]

[settings]
utils-module = "test-utils"

[rules.fake-rule]
enabled = false
severity = "warning"
custom-queries = ["getByIcon"]
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.analyzer.root, PathBuf::from("./src"));
        assert_eq!(config.analyzer.exclude, vec!["**/generated/**"]);
        assert_eq!(
            config.settings.get("utils-module").and_then(toml::Value::as_str),
            Some("test-utils")
        );
        assert!(!config.is_rule_enabled("fake-rule"));
        assert_eq!(config.rule_severity("fake-rule"), Some(Severity::Warning));

        let rule_config = config.rules.get("fake-rule").expect("missing rule");
        assert!(rule_config
            .option("custom-queries")
            .and_then(toml::Value::as_array)
            .is_some());
        assert!(rule_config.option("enabled").is_none());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let err = Config::parse("[settings\n").expect_err("should fail");
        assert!(err.to_string().starts_with("Failed to parse config"));
    }

    #[test]
    fn test_from_missing_file() {
        let err = Config::from_file(std::path::Path::new("/nonexistent/tl-lint.toml"))
            .expect_err("should fail");
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
