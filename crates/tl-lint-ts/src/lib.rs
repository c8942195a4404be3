//! # tl-lint-ts
//!
//! Tree-sitter host for tl-lint.
//!
//! Parses JavaScript and TypeScript (with or without JSX) and drives
//! selector-keyed callbacks over the syntax tree in document order:
//!
//! - [`SourceTree`] and [`Dialect`] for parsing
//! - [`JsNode`] and [`NodeKind`] for ESTree-flavored node access
//! - [`Selector`], [`Listeners`] and [`walk`] for traversal

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod node;
pub mod parser;
pub mod traverse;

pub use node::{JsNode, NodeKind};
pub use parser::{Dialect, ParseError, SourceTree};
pub use traverse::{walk, Handler, Listeners, Selector, SelectorError};
