//! Syntax node wrapper with ESTree-flavored kinds.

use tree_sitter::Node;

/// Node kinds the engine dispatches on.
///
/// Tree-sitter kinds are folded into the ESTree names rules are written
/// against; everything else is [`NodeKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// `program`
    Program,
    /// `import_statement`
    ImportDeclaration,
    /// `call_expression`
    CallExpression,
    /// `member_expression`
    MemberExpression,
    /// Plain, property and shorthand identifiers.
    Identifier,
    /// `variable_declarator`
    VariableDeclarator,
    /// `string`
    StringLiteral,
    /// Any other node.
    Other,
}

impl NodeKind {
    /// Maps a tree-sitter kind to a [`NodeKind`].
    #[must_use]
    pub fn from_raw(kind: &str) -> Self {
        match kind {
            "program" => Self::Program,
            "import_statement" => Self::ImportDeclaration,
            "call_expression" => Self::CallExpression,
            "member_expression" => Self::MemberExpression,
            "identifier"
            | "property_identifier"
            | "shorthand_property_identifier"
            | "shorthand_property_identifier_pattern" => Self::Identifier,
            "variable_declarator" => Self::VariableDeclarator,
            "string" => Self::StringLiteral,
            _ => Self::Other,
        }
    }

    /// Looks up a kind by its ESTree node-type name (e.g. `"CallExpression"`).
    #[must_use]
    pub fn from_estree_name(name: &str) -> Option<Self> {
        let kind = match name {
            "Program" => Self::Program,
            "ImportDeclaration" => Self::ImportDeclaration,
            "CallExpression" => Self::CallExpression,
            "MemberExpression" => Self::MemberExpression,
            "Identifier" => Self::Identifier,
            "VariableDeclarator" => Self::VariableDeclarator,
            "Literal" => Self::StringLiteral,
            _ => return None,
        };
        Some(kind)
    }
}

/// A node of a [`SourceTree`](crate::SourceTree), bound to its source text.
#[derive(Clone, Copy)]
pub struct JsNode<'t> {
    node: Node<'t>,
    source: &'t str,
}

impl<'t> JsNode<'t> {
    pub(crate) fn new(node: Node<'t>, source: &'t str) -> Self {
        Self { node, source }
    }

    /// ESTree-flavored kind.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        NodeKind::from_raw(self.node.kind())
    }

    /// Raw tree-sitter kind (e.g. `"property_identifier"`).
    #[must_use]
    pub fn raw_kind(&self) -> &'static str {
        self.node.kind()
    }

    /// Whether this node has the given kind.
    #[must_use]
    pub fn is(&self, kind: NodeKind) -> bool {
        self.kind() == kind
    }

    /// Node identity, unique within one tree.
    #[must_use]
    pub fn id(&self) -> usize {
        self.node.id()
    }

    /// Source text covered by this node.
    #[must_use]
    pub fn text(&self) -> &'t str {
        self.source.get(self.node.byte_range()).unwrap_or("")
    }

    /// Unquoted contents of a string literal node.
    #[must_use]
    pub fn string_value(&self) -> Option<&'t str> {
        if self.kind() != NodeKind::StringLiteral {
            return None;
        }
        let text = self.text();
        let inner = text
            .strip_prefix(['\'', '"'])
            .and_then(|t| t.strip_suffix(['\'', '"']))?;
        Some(inner)
    }

    /// Parent node, if any.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.node.parent().map(|n| Self::new(n, self.source))
    }

    /// Child stored under a grammar field (e.g. `"function"`, `"object"`).
    #[must_use]
    pub fn field(&self, name: &str) -> Option<Self> {
        self.node
            .child_by_field_name(name)
            .map(|n| Self::new(n, self.source))
    }

    /// Named children in source order.
    #[must_use]
    pub fn named_children(&self) -> Vec<Self> {
        let mut cursor = self.node.walk();
        self.node
            .named_children(&mut cursor)
            .map(|n| Self::new(n, self.source))
            .collect()
    }

    /// First named child of the given raw tree-sitter kind.
    #[must_use]
    pub fn child_of_raw_kind(&self, raw: &str) -> Option<Self> {
        self.named_children().into_iter().find(|c| c.raw_kind() == raw)
    }

    /// This node and all named descendants, in document order.
    #[must_use]
    pub fn descendants(&self) -> Vec<Self> {
        let mut out = Vec::new();
        let mut stack = vec![*self];
        while let Some(node) = stack.pop() {
            out.push(node);
            let mut children = node.named_children();
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Line number (1-indexed).
    #[must_use]
    pub fn line(&self) -> usize {
        self.node.start_position().row + 1
    }

    /// Column (1-indexed, in bytes).
    #[must_use]
    pub fn column(&self) -> usize {
        self.node.start_position().column + 1
    }

    /// Byte offset of the node start.
    #[must_use]
    pub fn start_byte(&self) -> usize {
        self.node.start_byte()
    }

    /// Length of the node in bytes.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.node.end_byte() - self.node.start_byte()
    }
}

impl PartialEq for JsNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl Eq for JsNode<'_> {}

impl std::fmt::Debug for JsNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}@{}:{} {:?}",
            self.raw_kind(),
            self.line(),
            self.column(),
            self.text()
        )
    }
}
