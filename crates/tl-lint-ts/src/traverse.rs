//! Selector-keyed traversal.
//!
//! Handlers are registered per [`Selector`]. Any number of handlers may share
//! a selector; all of them run, in registration order, once per matching
//! node. [`Listeners::chain`] composes two listener sets so that an
//! engine-level set and a rule's own set observe the same nodes without either
//! replacing the other.

use std::str::FromStr;

use crate::node::{JsNode, NodeKind};
use crate::parser::SourceTree;

/// Which nodes a handler is invoked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// Every node of the kind (`"CallExpression"`).
    Kind(NodeKind),
    /// Nodes of `kind` with an ancestor of `ancestor` (`"CallExpression Identifier"`).
    Descendant {
        /// Required ancestor kind.
        ancestor: NodeKind,
        /// Kind of the matched node.
        kind: NodeKind,
    },
    /// Once, after the whole tree was visited (`"Program:exit"`).
    ProgramExit,
}

impl Selector {
    fn matches(&self, kind: NodeKind, ancestors: &[NodeKind]) -> bool {
        match *self {
            Self::Kind(k) => k == kind,
            Self::Descendant {
                ancestor,
                kind: k,
            } => k == kind && ancestors.contains(&ancestor),
            Self::ProgramExit => false,
        }
    }
}

/// Error for selector strings the host does not understand.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    /// A node-type name is not known.
    #[error("unknown node type `{0}` in selector")]
    UnknownNodeType(String),
    /// The selector has an unsupported shape.
    #[error("unsupported selector `{0}`")]
    Unsupported(String),
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lookup = |name: &str| {
            NodeKind::from_estree_name(name)
                .ok_or_else(|| SelectorError::UnknownNodeType(name.to_owned()))
        };

        if s.trim() == "Program:exit" {
            return Ok(Self::ProgramExit);
        }

        let parts: Vec<&str> = s.split_whitespace().collect();
        match parts.as_slice() {
            [kind] => Ok(Self::Kind(lookup(kind)?)),
            [ancestor, kind] => Ok(Self::Descendant {
                ancestor: lookup(ancestor)?,
                kind: lookup(kind)?,
            }),
            _ => Err(SelectorError::Unsupported(s.to_owned())),
        }
    }
}

/// A handler receiving one node and the traversal context.
pub type Handler<'t, C> = Box<dyn FnMut(JsNode<'t>, &mut C) + 't>;

/// Handlers keyed by selector.
pub struct Listeners<'t, C> {
    entries: Vec<(Selector, Handler<'t, C>)>,
}

impl<'t, C> Default for Listeners<'t, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'t, C> Listeners<'t, C> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers a handler for `selector`.
    #[must_use]
    pub fn on<F>(mut self, selector: Selector, handler: F) -> Self
    where
        F: FnMut(JsNode<'t>, &mut C) + 't,
    {
        self.entries.push((selector, Box::new(handler)));
        self
    }

    /// Appends all of `other`'s handlers after this set's handlers.
    ///
    /// For a node matched by both sets, this set's handlers run first.
    #[must_use]
    pub fn chain(mut self, other: Self) -> Self {
        self.entries.extend(other.entries);
        self
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn dispatch(&mut self, node: JsNode<'t>, ancestors: &[NodeKind], ctx: &mut C) {
        let kind = node.kind();
        for (selector, handler) in &mut self.entries {
            if selector.matches(kind, ancestors) {
                handler(node, ctx);
            }
        }
    }

    fn dispatch_exit(&mut self, root: JsNode<'t>, ctx: &mut C) {
        for (selector, handler) in &mut self.entries {
            if *selector == Selector::ProgramExit {
                handler(root, ctx);
            }
        }
    }
}

/// Visits every named node of `tree` depth-first in document order, then
/// runs the `Program:exit` handlers with the root node.
pub fn walk<'t, C>(tree: &'t SourceTree, listeners: &mut Listeners<'t, C>, ctx: &mut C) {
    let root = tree.root();
    let source = tree.source();
    let mut cursor = tree.root_ts().walk();
    let mut ancestors: Vec<NodeKind> = Vec::new();

    'outer: loop {
        let node = cursor.node();
        let kind = NodeKind::from_raw(node.kind());
        if node.is_named() {
            listeners.dispatch(JsNode::new(node, source), &ancestors, ctx);
        }

        if cursor.goto_first_child() {
            ancestors.push(kind);
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                continue 'outer;
            }
            if !cursor.goto_parent() {
                break 'outer;
            }
            ancestors.pop();
        }
    }

    listeners.dispatch_exit(root, ctx);
}
