//! Rule trait and per-file rule context.

use std::path::{Path, PathBuf};

use tl_lint_ts::{JsNode, Listeners};

use crate::detect::{FileState, Helpers};
use crate::settings::Settings;
use crate::types::{Location, Violation};
use crate::Severity;

/// A lint rule consuming the detection helpers.
///
/// Rules return listeners keyed by selector. The linter runs the engine's
/// own listeners before them, so by the time a rule handler sees a node,
/// every import above it has been tracked.
///
/// # Example
///
/// ```ignore
/// use tl_lint_core::{Rule, RuleContext};
/// use tl_lint_ts::{Listeners, Selector, NodeKind};
///
/// pub struct NoDebug;
///
/// impl Rule for NoDebug {
///     fn name(&self) -> &'static str { "no-debugging-utils" }
///     fn code(&self) -> &'static str { "TL010" }
///
///     fn create<'t>(&'t self) -> Listeners<'t, RuleContext<'t>> {
///         Listeners::new().on(
///             Selector::Descendant {
///                 ancestor: NodeKind::CallExpression,
///                 kind: NodeKind::Identifier,
///             },
///             |node, ctx: &mut RuleContext<'t>| {
///                 if ctx.helpers().is_debug_util(node) {
///                     ctx.report(node, "Remove debugging utility");
///                 }
///             },
///         )
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "prefer-screen-queries").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "TL001").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Builds this rule's listeners for one file.
    fn create<'t>(&'t self) -> Listeners<'t, RuleContext<'t>>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

/// Everything a rule handler can see and do while one file is traversed.
#[derive(Debug)]
pub struct RuleContext<'t> {
    rule: &'static str,
    code: &'static str,
    severity: Severity,
    file: PathBuf,
    settings: Settings,
    state: FileState<'t>,
    violations: Vec<Violation>,
}

impl<'t> RuleContext<'t> {
    /// Creates a context for running `rule` over `file`.
    #[must_use]
    pub fn new(rule: &dyn Rule, file: PathBuf, settings: Settings) -> Self {
        Self {
            rule: rule.name(),
            code: rule.code(),
            severity: rule.default_severity(),
            file,
            settings,
            state: FileState::new(),
            violations: Vec::new(),
        }
    }

    /// Detection helpers over the state built so far.
    #[must_use]
    pub fn helpers(&self) -> Helpers<'_, 't> {
        Helpers::new(&self.settings, &self.state)
    }

    /// Effective settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Per-file detection state.
    #[must_use]
    pub fn state(&self) -> &FileState<'t> {
        &self.state
    }

    /// File being linted.
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Records a violation at `node`.
    pub fn report(&mut self, node: JsNode<'_>, message: impl Into<String>) {
        self.violations.push(Violation::new(
            self.code,
            self.rule,
            self.severity,
            Location::from_node(self.file.clone(), &node),
            message,
        ));
    }

    /// Violations reported so far.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes the context, returning its violations.
    #[must_use]
    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    pub(crate) fn observe_import(&mut self, node: JsNode<'t>) {
        self.state.observe_import(node, &self.settings);
    }

    pub(crate) fn observe_require(&mut self, node: JsNode<'t>) {
        self.state.observe_require(node, &self.settings);
    }

    pub(crate) fn finish(&mut self) {
        self.state.finish();
    }
}
