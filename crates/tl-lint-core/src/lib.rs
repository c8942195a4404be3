//! # tl-lint-core
//!
//! Testing Library usage detection for JS/TS lint rules.
//!
//! Rules do not match syntax patterns themselves. They ask the detection
//! engine what a node is: a render call, an async utility, a query variant,
//! a user-event method, a presence or absence assertion. The engine resolves
//! import aliases and configured settings for the current file.
//!
//! - [`Rule`] and [`RuleContext`] for writing rules
//! - [`Helpers`] for classification queries
//! - [`Settings`] and [`Config`] for configuration
//! - [`Linter`] for running rules over sources
//!
//! ## Example
//!
//! ```ignore
//! use tl_lint_core::{Config, Linter};
//!
//! let linter = Linter::builder()
//!     .root("./src")
//!     .config(Config::from_file("tl-lint.toml".as_ref())?)
//!     .rule(MyRule)
//!     .build()?;
//!
//! let result = linter.analyze()?;
//! println!("{}", result.summary());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
pub mod detect;
mod linter;
mod rule;
mod settings;
mod types;

pub use config::{AnalyzerConfig, Config, ConfigError, RuleConfig};
pub use detect::{
    BindingKind, CallCheck, CanonicalBinding, Category, FileState, Helpers, ImportRecord,
    ImportTracker,
};
pub use linter::{LintError, Linter, LinterBuilder};
pub use rule::{Rule, RuleBox, RuleContext};
pub use settings::{Framework, Settings};
pub use types::{LintResult, Location, Severity, Violation, ViolationDiagnostic};
