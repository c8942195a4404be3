//! Effective detection settings for one rule run.
//!
//! Shared `[settings]` values are merged with the rule's own
//! `[rules.<name>]` options, key by key, the rule winning. Bad values are
//! logged and ignored.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use toml::Value;

use crate::config::RuleConfig;

/// Key naming the custom module re-exporting testing-library utilities.
pub const UTILS_MODULE_KEY: &str = "utils-module";
/// Key listing custom render wrappers.
pub const CUSTOM_RENDERS_KEY: &str = "custom-renders";
/// Key listing custom query names.
pub const CUSTOM_QUERIES_KEY: &str = "custom-queries";
/// Key selecting the framework flavor.
pub const FRAMEWORK_KEY: &str = "framework";

const OFF: &str = "off";

/// Testing-library framework flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    /// `@testing-library/dom`
    Dom,
    /// `@testing-library/angular`
    Angular,
    /// `@testing-library/react`
    React,
    /// `@testing-library/vue`
    Vue,
    /// `@marko/testing-library`
    Marko,
}

impl Framework {
    /// Flag keys, in the order they win when several are set.
    pub const FLAG_PRIORITY: [Self; 5] = [
        Self::Angular,
        Self::React,
        Self::Vue,
        Self::Marko,
        Self::Dom,
    ];

    /// Config key and display name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dom => "dom",
            Self::Angular => "angular",
            Self::React => "react",
            Self::Vue => "vue",
            Self::Marko => "marko",
        }
    }

    /// Parses a framework name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::FLAG_PRIORITY
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for Framework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings the detection engine reads. Computed once per rule per file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Configured framework, `None` meaning unknown/any.
    pub framework: Option<Framework>,
    /// Exact names treated as custom queries.
    pub custom_queries: BTreeSet<String>,
    /// Render wrapper names, on top of `render`.
    pub custom_renders: BTreeSet<String>,
    /// Module specifier of the custom utils module.
    pub custom_module: Option<String>,
    /// Unimported names count as testing-library functions.
    pub aggressive_module_reporting: bool,
    /// Any name containing `render` counts as a render function.
    pub aggressive_render_reporting: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            framework: None,
            custom_queries: BTreeSet::new(),
            custom_renders: BTreeSet::new(),
            custom_module: None,
            aggressive_module_reporting: true,
            aggressive_render_reporting: true,
        }
    }
}

impl Settings {
    /// Merges shared settings with a rule's options.
    #[must_use]
    pub fn resolve(shared: &toml::Table, rule: Option<&RuleConfig>) -> Self {
        let lookup = |key: &str| rule.and_then(|r| r.option(key)).or_else(|| shared.get(key));
        let mut settings = Self::default();

        match lookup(UTILS_MODULE_KEY) {
            None => {}
            Some(Value::String(s)) if s == OFF => settings.aggressive_module_reporting = false,
            Some(Value::String(s)) if !s.is_empty() => {
                settings.custom_module = Some(s.clone());
                settings.aggressive_module_reporting = false;
            }
            Some(other) => warn_ignored(UTILS_MODULE_KEY, other),
        }

        if let Some(names) = name_list(CUSTOM_RENDERS_KEY, lookup(CUSTOM_RENDERS_KEY)) {
            settings.custom_renders = names;
            settings.aggressive_render_reporting = false;
        }

        if let Some(names) = name_list(CUSTOM_QUERIES_KEY, lookup(CUSTOM_QUERIES_KEY)) {
            settings.custom_queries = names;
        }

        settings.framework = match lookup(FRAMEWORK_KEY) {
            Some(Value::String(s)) => {
                let parsed = Framework::from_name(s);
                if parsed.is_none() && s != OFF {
                    tracing::warn!("unknown framework `{}`, ignoring", s);
                }
                parsed
            }
            Some(other) => {
                warn_ignored(FRAMEWORK_KEY, other);
                None
            }
            None => Framework::FLAG_PRIORITY
                .into_iter()
                .find(|f| lookup(f.as_str()).is_some_and(is_truthy)),
        };

        tracing::debug!(?settings, "resolved settings");
        settings
    }

    /// Settings with an explicit custom module and strict module reporting.
    #[must_use]
    pub fn with_custom_module(mut self, module: impl Into<String>) -> Self {
        self.custom_module = Some(module.into());
        self.aggressive_module_reporting = false;
        self
    }

    /// Settings with explicit render wrappers and strict render reporting.
    #[must_use]
    pub fn with_custom_renders<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_renders = names.into_iter().map(Into::into).collect();
        self.aggressive_render_reporting = false;
        self
    }

    /// Settings with the given custom queries.
    #[must_use]
    pub fn with_custom_queries<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_queries = names.into_iter().map(Into::into).collect();
        self
    }
}

/// `None` when the key is absent or unusable, an empty set for `"off"`.
fn name_list(key: &str, value: Option<&Value>) -> Option<BTreeSet<String>> {
    match value? {
        Value::String(s) if s == OFF => Some(BTreeSet::new()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    other => {
                        warn_ignored(key, other);
                        None
                    }
                })
                .collect(),
        ),
        other => {
            warn_ignored(key, other);
            None
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Boolean(b) => *b,
        Value::Integer(i) => *i == 1,
        Value::String(s) => matches!(s.to_ascii_lowercase().as_str(), "true" | "yes" | "on" | "1"),
        _ => false,
    }
}

fn warn_ignored(key: &str, value: &Value) {
    tracing::warn!("ignoring malformed setting `{}` = {}", key, value);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(src: &str) -> toml::Table {
        src.parse().expect("invalid toml")
    }

    fn rule(src: &str) -> RuleConfig {
        toml::from_str(src).expect("invalid rule config")
    }

    #[test]
    fn defaults_are_aggressive() {
        let settings = Settings::resolve(&toml::Table::new(), None);
        assert_eq!(settings, Settings::default());
        assert!(settings.aggressive_module_reporting);
        assert!(settings.aggressive_render_reporting);
        assert!(settings.custom_module.is_none());
        assert!(settings.framework.is_none());
    }

    #[test]
    fn reads_shared_settings() {
        let shared = table(
            r#"
utils-module = "test-utils"
custom-renders = ["renderWithRedux", "renderWithRouter"]
custom-queries = ["getByIcon"]
framework = "react"
"#,
        );
        let settings = Settings::resolve(&shared, None);
        assert_eq!(settings.custom_module.as_deref(), Some("test-utils"));
        assert!(!settings.aggressive_module_reporting);
        assert!(!settings.aggressive_render_reporting);
        assert!(settings.custom_renders.contains("renderWithRedux"));
        assert!(settings.custom_queries.contains("getByIcon"));
        assert_eq!(settings.framework, Some(Framework::React));
    }

    #[test]
    fn rule_options_override_shared() {
        let shared = table("utils-module = \"test-utils\"\ncustom-queries = [\"a\"]\n");
        let rule = rule("custom-queries = [\"getByIcon\"]\nutils-module = \"off\"\n");
        let settings = Settings::resolve(&shared, Some(&rule));
        assert!(settings.custom_module.is_none());
        assert!(!settings.aggressive_module_reporting);
        assert_eq!(
            settings.custom_queries.iter().collect::<Vec<_>>(),
            vec!["getByIcon"]
        );
    }

    #[test]
    fn off_disables_aggressive_reporting() {
        let shared = table("custom-renders = \"off\"\nutils-module = \"off\"\n");
        let settings = Settings::resolve(&shared, None);
        assert!(settings.custom_renders.is_empty());
        assert!(!settings.aggressive_render_reporting);
        assert!(!settings.aggressive_module_reporting);
    }

    #[test]
    fn malformed_values_fall_back() {
        let shared = table(
            r#"
utils-module = 42
custom-renders = { name = "x" }
custom-queries = ["getByIcon", 7]
framework = "svelte-kit"
"#,
        );
        let settings = Settings::resolve(&shared, None);
        assert!(settings.custom_module.is_none());
        assert!(settings.aggressive_module_reporting);
        assert!(settings.aggressive_render_reporting);
        assert_eq!(settings.custom_queries.len(), 1);
        assert!(settings.framework.is_none());
    }

    #[test]
    fn framework_flags_follow_priority() {
        let shared = table("dom = true\nvue = \"yes\"\nreact = false\n");
        assert_eq!(
            Settings::resolve(&shared, None).framework,
            Some(Framework::Vue)
        );

        let shared = table("dom = 1\n");
        assert_eq!(
            Settings::resolve(&shared, None).framework,
            Some(Framework::Dom)
        );

        let shared = table("angular = \"on\"\nmarko = true\n");
        assert_eq!(
            Settings::resolve(&shared, None).framework,
            Some(Framework::Angular)
        );
    }

    #[test]
    fn builders() {
        let settings = Settings::default()
            .with_custom_module("test-utils")
            .with_custom_renders(["renderWithProviders"])
            .with_custom_queries(["getByIcon"]);
        assert!(!settings.aggressive_module_reporting);
        assert!(!settings.aggressive_render_reporting);
        assert!(settings.custom_queries.contains("getByIcon"));
    }
}
