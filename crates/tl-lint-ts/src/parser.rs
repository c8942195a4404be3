//! JS/TS parsing with the tree-sitter TypeScript grammars.

use std::path::Path;
use tree_sitter::{Language, Parser, Tree};

use crate::node::JsNode;

/// Source dialect, selecting which grammar parses the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Plain TypeScript (`.ts`, `.mts`, `.cts`).
    TypeScript,
    /// TypeScript or JavaScript with JSX (`.tsx`, `.js`, `.jsx`, `.mjs`, `.cjs`).
    Tsx,
}

impl Dialect {
    /// File extensions handled by the host, without the leading dot.
    pub const EXTENSIONS: &'static [&'static str] =
        &["js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts"];

    /// Picks the dialect from a file extension.
    ///
    /// Returns `None` for files the host does not handle.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" | "js" | "jsx" | "mjs" | "cjs" => Some(Self::Tsx),
            _ => None,
        }
    }

    fn language(self) -> Language {
        match self {
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// Errors raised while producing a syntax tree.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The grammar could not be loaded into the parser.
    #[error("failed to load {dialect:?} grammar: {message}")]
    Language {
        /// Dialect whose grammar failed.
        dialect: Dialect,
        /// Error reported by tree-sitter.
        message: String,
    },
    /// The parser gave up without producing a tree.
    #[error("tree-sitter produced no tree")]
    NoTree,
}

/// A parsed source file: the text plus its syntax tree.
pub struct SourceTree {
    source: String,
    tree: Tree,
    dialect: Dialect,
}

impl SourceTree {
    /// Parses `source` with the grammar for `dialect`.
    ///
    /// Syntax errors do not fail the parse; the tree contains error nodes
    /// and [`SourceTree::has_errors`] reports them.
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar cannot be loaded or no tree is produced.
    pub fn parse(source: impl Into<String>, dialect: Dialect) -> Result<Self, ParseError> {
        let source = source.into();
        let mut parser = Parser::new();
        parser
            .set_language(&dialect.language())
            .map_err(|e| ParseError::Language {
                dialect,
                message: e.to_string(),
            })?;

        let tree = parser.parse(&source, None).ok_or(ParseError::NoTree)?;
        if tree.root_node().has_error() {
            tracing::debug!("syntax errors in {:?} source, continuing", dialect);
        }

        Ok(Self {
            source,
            tree,
            dialect,
        })
    }

    /// Source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Dialect used for parsing.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Whether the tree contains syntax errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// 1-based line and column of the first syntax error, if any.
    #[must_use]
    pub fn first_error(&self) -> Option<(usize, usize)> {
        let mut node = self.tree.root_node();
        if !node.has_error() {
            return None;
        }
        while !(node.is_error() || node.is_missing()) {
            let mut cursor = node.walk();
            let Some(child) = node.children(&mut cursor).find(tree_sitter::Node::has_error) else {
                break;
            };
            node = child;
        }
        let start = node.start_position();
        Some((start.row + 1, start.column + 1))
    }

    /// Root `program` node.
    #[must_use]
    pub fn root(&self) -> JsNode<'_> {
        JsNode::new(self.tree.root_node(), &self.source)
    }

    pub(crate) fn root_ts(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }
}

impl std::fmt::Debug for SourceTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceTree")
            .field("dialect", &self.dialect)
            .field("len", &self.source.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    #[test]
    fn dialect_from_extension() {
        assert_eq!(
            Dialect::from_path(Path::new("a/b.test.ts")),
            Some(Dialect::TypeScript)
        );
        assert_eq!(Dialect::from_path(Path::new("b.spec.tsx")), Some(Dialect::Tsx));
        assert_eq!(Dialect::from_path(Path::new("b.test.js")), Some(Dialect::Tsx));
        assert_eq!(Dialect::from_path(Path::new("b.mjs")), Some(Dialect::Tsx));
        assert_eq!(Dialect::from_path(Path::new("Cargo.toml")), None);
        assert_eq!(Dialect::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn parses_program() {
        let tree = SourceTree::parse("import { render } from 'x';\n", Dialect::TypeScript)
            .expect("parse failed");
        assert_eq!(tree.root().kind(), NodeKind::Program);
        assert!(!tree.has_errors());
    }

    #[test]
    fn parses_jsx() {
        let tree =
            SourceTree::parse("render(<App title=\"x\" />);\n", Dialect::Tsx).expect("parse failed");
        assert!(!tree.has_errors());
    }

    #[test]
    fn broken_source_still_yields_tree() {
        let tree = SourceTree::parse("render(;\n", Dialect::TypeScript).expect("parse failed");
        assert!(tree.has_errors());
        assert_eq!(tree.root().kind(), NodeKind::Program);
    }

    #[test]
    fn first_error_locates_broken_line() {
        let tree = SourceTree::parse("ok();\nrender(;\n", Dialect::TypeScript).expect("parse failed");
        assert_eq!(tree.first_error().map(|(line, _)| line), Some(2));

        let clean = SourceTree::parse("ok();\n", Dialect::TypeScript).expect("parse failed");
        assert_eq!(clean.first_error(), None);
    }
}
