//! Runs rules over JS/TS sources.

use crate::config::{Config, RuleConfig};
use crate::detect::tracking_listeners;
use crate::rule::{Rule, RuleBox, RuleContext};
use crate::settings::Settings;
use crate::types::{LintResult, Violation};

use std::path::{Path, PathBuf};
use thiserror::Error;
use tl_lint_ts::{walk, Dialect, SourceTree};
use tracing::{debug, info, warn};

/// Errors that can occur while linting.
#[derive(Debug, Error)]
pub enum LintError {
    /// IO error reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Source file could not be parsed.
    #[error("Parse error in {path}: {source}")]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Underlying parser error.
        source: tl_lint_ts::ParseError,
    },

    /// Source has syntax errors while `fail_on_parse_error` is set.
    #[error("Syntax error in {path} at {line}:{column}")]
    Syntax {
        /// Path to the file with the error.
        path: PathBuf,
        /// 1-based line of the first error.
        line: usize,
        /// 1-based column of the first error.
        column: usize,
    },

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Builder for configuring a [`Linter`].
#[derive(Default)]
pub struct LinterBuilder {
    root: Option<PathBuf>,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    config: Option<Config>,
    fail_on_parse_error: bool,
}

impl LinterBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a rule.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Loads the configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn config_file(self, path: &Path) -> Result<Self, LintError> {
        Ok(self.config(Config::from_file(path)?))
    }

    /// Sets whether syntax errors fail a file instead of linting the
    /// recovered tree (default: false).
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = fail;
        self
    }

    /// Builds the linter.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be resolved.
    pub fn build(self) -> Result<Linter, LintError> {
        let root = self
            .root
            .or_else(|| self.config.as_ref().map(|c| c.analyzer.root.clone()))
            .unwrap_or_else(|| PathBuf::from("."));

        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let mut exclude_patterns = self.exclude_patterns;
        if let Some(ref config) = self.config {
            exclude_patterns.extend(config.analyzer.exclude.clone());
        }

        if exclude_patterns.is_empty() {
            exclude_patterns.push("**/node_modules/**".to_string());
        }

        Ok(Linter {
            root,
            rules: self.rules,
            exclude_patterns,
            config: self.config.unwrap_or_default(),
            fail_on_parse_error: self.fail_on_parse_error,
        })
    }
}

/// Runs every enabled rule over each source file.
///
/// Use [`Linter::builder()`] to construct an instance.
pub struct Linter {
    root: PathBuf,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    config: Config,
    fail_on_parse_error: bool,
}

impl Linter {
    /// Creates a new builder for configuring a linter.
    #[must_use]
    pub fn builder() -> LinterBuilder {
        LinterBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Gets the rule configuration for a specific rule.
    #[must_use]
    pub fn rule_config(&self, rule_name: &str) -> Option<&RuleConfig> {
        self.config.rules.get(rule_name)
    }

    /// Effective settings for a rule.
    #[must_use]
    pub fn settings_for(&self, rule_name: &str) -> Settings {
        Settings::resolve(&self.config.settings, self.rule_config(rule_name))
    }

    /// Discovers and lints all files under the root.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery fails, or a file has syntax errors
    /// while `fail_on_parse_error` is set. Files that are not valid UTF-8
    /// are skipped with a warning.
    pub fn analyze(&self) -> Result<LintResult, LintError> {
        info!("Starting analysis at {:?}", self.root);

        let mut result = LintResult::new();
        let files = self.discover_files()?;

        info!("Found {} files to analyze", files.len());

        for file_path in &files {
            let display = file_path
                .strip_prefix(&self.root)
                .map_or_else(|_| file_path.clone(), Path::to_path_buf);
            let content = match std::fs::read_to_string(file_path) {
                Ok(content) => content,
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    let shown = display.display();
                    warn!("Skipping {}: {}", shown, e);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            result.violations.extend(self.lint_source(&display, &content)?);
            result.files_checked += 1;
        }

        result.violations.sort_by(|a, b| {
            a.location
                .file
                .cmp(&b.location.file)
                .then(a.location.line.cmp(&b.location.line))
                .then(a.location.column.cmp(&b.location.column))
        });

        info!(
            "Analysis complete: {} violations in {} files",
            result.violations.len(),
            result.files_checked
        );

        Ok(result)
    }

    /// Lints a file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, or as for
    /// [`Linter::lint_source`].
    pub fn lint_file(&self, path: &Path) -> Result<Vec<Violation>, LintError> {
        let source = std::fs::read_to_string(path)?;
        self.lint_source(path, &source)
    }

    /// Lints `source` as if read from `path`.
    ///
    /// The extension of `path` picks the grammar; unknown extensions are
    /// parsed as TSX. Each enabled rule gets its own traversal and state.
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar fails, or the source has syntax
    /// errors while `fail_on_parse_error` is set.
    pub fn lint_source(&self, path: &Path, source: &str) -> Result<Vec<Violation>, LintError> {
        debug!("Linting: {}", path.display());

        let dialect = Dialect::from_path(path).unwrap_or(Dialect::Tsx);
        let tree = SourceTree::parse(source, dialect).map_err(|e| LintError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        if let Some((line, column)) = tree.first_error() {
            if self.fail_on_parse_error {
                return Err(LintError::Syntax {
                    path: path.to_path_buf(),
                    line,
                    column,
                });
            }
            warn!(
                "Syntax error in {} at {}:{}, linting recovered tree",
                path.display(),
                line,
                column
            );
        }

        let mut violations = Vec::new();
        for rule in &self.rules {
            if !self.config.is_rule_enabled(rule.name()) {
                debug!("Skipping disabled rule: {}", rule.name());
                continue;
            }

            let rule_violations = self.run_rule(rule.as_ref(), path, &tree);
            violations.extend(self.apply_severity_override(rule.name(), rule_violations));
        }

        Ok(violations)
    }

    fn run_rule(&self, rule: &dyn Rule, path: &Path, tree: &SourceTree) -> Vec<Violation> {
        let settings = self.settings_for(rule.name());
        let mut ctx = RuleContext::new(rule, path.to_path_buf(), settings);
        let mut listeners = tracking_listeners().chain(rule.create());
        walk(tree, &mut listeners, &mut ctx);
        ctx.into_violations()
    }

    /// Applies severity overrides from configuration.
    fn apply_severity_override(
        &self,
        rule_name: &str,
        mut violations: Vec<Violation>,
    ) -> Vec<Violation> {
        if let Some(severity) = self.config.rule_severity(rule_name) {
            for v in &mut violations {
                v.severity = severity;
            }
        }
        violations
    }

    /// Discovers all JS/TS source files to analyze.
    fn discover_files(&self) -> Result<Vec<PathBuf>, LintError> {
        let mut files = Vec::new();

        for ext in Dialect::EXTENSIONS {
            let pattern = format!("{}/**/*.{}", self.root.display(), ext);
            for entry in glob::glob(&pattern)? {
                let path = entry.map_err(|e| LintError::Io(e.into_error()))?;

                if self.should_exclude(&path) {
                    debug!("Excluding: {}", path.display());
                    continue;
                }

                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        for pattern in &self.exclude_patterns {
            if let Ok(glob_pattern) = glob::Pattern::new(pattern) {
                if glob_pattern.matches(&path_str) {
                    return true;
                }
            }

            // "**/node_modules/**" also matches as a plain substring
            let normalized_pattern = pattern.replace("**", "");
            if !normalized_pattern.is_empty() && path_str.contains(&normalized_pattern) {
                return true;
            }
        }

        false
    }
}
