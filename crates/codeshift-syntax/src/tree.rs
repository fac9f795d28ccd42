// Copyright (c) the codeshift contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Generic source tree model.
//!
//! A parsed file is a [`SourceTree`]: an ordered list of statement-level
//! [`Node`]s. Leaves hold token text; branches hold children. Nodes built by
//! the parser carry two markers that survive cloning:
//!
//! - an origin [`NodeId`], used by the printer to recognise nodes that still
//!   match the original tree
//! - a [`Span`] into the original text, used to reuse the whitespace between
//!   siblings
//!
//! Nodes created by codemods have neither and are printed fresh.

use serde::Serialize;

use crate::dump;
use crate::printer;

// ============================================================================
// Identity and Position
// ============================================================================

/// Identity marker assigned to every node of an original tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

/// Byte range in the original source (start inclusive, end exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Node
// ============================================================================

/// One node of a source tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<Node>,
    #[serde(skip)]
    origin: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    span: Option<Span>,
}

impl Node {
    /// Create a fresh leaf holding token text.
    pub fn leaf(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            field: None,
            text: Some(text.into()),
            children: Vec::new(),
            origin: None,
            span: None,
        }
    }

    /// Create a fresh branch node.
    pub fn branch(kind: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            kind: kind.into(),
            field: None,
            text: None,
            children,
            origin: None,
            span: None,
        }
    }

    /// Set the field name this node occupies in its parent.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub(crate) fn parsed(
        kind: &str,
        field: Option<&str>,
        text: Option<String>,
        children: Vec<Node>,
        origin: NodeId,
        span: Span,
    ) -> Self {
        Self {
            kind: kind.to_string(),
            field: field.map(str::to_string),
            text,
            children,
            origin: Some(origin),
            span: Some(span),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Token text, for leaves.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_leaf(&self) -> bool {
        self.text.is_some()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Identity marker of the original node this one was cloned from.
    pub fn origin(&self) -> Option<NodeId> {
        self.origin
    }

    /// Position in the original text.
    pub fn span(&self) -> Option<Span> {
        self.span
    }

    /// Turn this node into a leaf with the given text.
    ///
    /// Identity and position are kept, so the printer still reuses the
    /// surrounding whitespace while emitting the new text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
        self.children.clear();
    }

    /// Replace this node in place, keeping its position and field name.
    ///
    /// The replacement keeps its own identity, so a fresh node is printed
    /// fresh while an original node moved here prints its original text.
    pub fn replace_with(&mut self, replacement: Node) {
        let span = self.span;
        let field = self.field.take();
        *self = replacement;
        if self.span.is_none() {
            self.span = span;
        }
        if self.field.is_none() {
            self.field = field;
        }
    }

    pub fn child_by_field(&self, field: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.field() == Some(field))
    }

    pub fn child_by_field_mut(&mut self, field: &str) -> Option<&mut Node> {
        self.children.iter_mut().find(|c| c.field() == Some(field))
    }

    /// First node of `kind` in pre-order, starting with this node.
    pub fn find_first(&self, kind: &str) -> Option<&Node> {
        if self.kind == kind {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_first(kind))
    }

    /// Mutable variant of [`Node::find_first`].
    pub fn find_first_mut(&mut self, kind: &str) -> Option<&mut Node> {
        if self.kind == kind {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_first_mut(kind))
    }

    /// Every node of `kind` in pre-order, including this node.
    pub fn find_all<'a>(&'a self, kind: &str) -> Vec<&'a Node> {
        let mut found = Vec::new();
        self.collect_kind(kind, &mut found);
        found
    }

    fn collect_kind<'a>(&'a self, kind: &str, found: &mut Vec<&'a Node>) {
        if self.kind == kind {
            found.push(self);
        }
        for child in &self.children {
            child.collect_kind(kind, found);
        }
    }

    /// Render this node without reference to any original text.
    pub fn to_code(&self) -> String {
        printer::render(self)
    }
}

// ============================================================================
// SourceTree
// ============================================================================

/// Ordered statement-level nodes of one source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceTree {
    statements: Vec<Node>,
}

impl SourceTree {
    pub fn new(statements: Vec<Node>) -> Self {
        Self { statements }
    }

    pub fn statements(&self) -> &[Node] {
        &self.statements
    }

    pub fn statements_mut(&mut self) -> &mut Vec<Node> {
        &mut self.statements
    }

    pub fn into_statements(self) -> Vec<Node> {
        self.statements
    }

    pub fn push(&mut self, statement: Node) {
        self.statements.push(statement);
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// First node of `kind` anywhere in the tree, in document order.
    pub fn find_first(&self, kind: &str) -> Option<&Node> {
        self.statements.iter().find_map(|s| s.find_first(kind))
    }

    pub fn find_first_mut(&mut self, kind: &str) -> Option<&mut Node> {
        self.statements.iter_mut().find_map(|s| s.find_first_mut(kind))
    }

    pub fn find_all<'a>(&'a self, kind: &str) -> Vec<&'a Node> {
        let mut found = Vec::new();
        for statement in &self.statements {
            statement.collect_kind(kind, &mut found);
        }
        found
    }

    /// Human-readable, indented rendering of the tree.
    pub fn dump(&self) -> String {
        dump::dump_tree(self)
    }
}

// ============================================================================
// Tokens
// ============================================================================

/// One leaf token of the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: String,
    pub span: Span,
}

/// The original text together with its leaf tokens in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    source: String,
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new(source: impl Into<String>, tokens: Vec<Token>) -> Self {
        Self {
            source: source.into(),
            tokens,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Original text of a token.
    pub fn text(&self, token: &Token) -> &str {
        self.source
            .get(token.span.start..token.span.end)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Output of a successful parse: the original tree and its token stream.
#[derive(Debug, Clone)]
pub struct ParsedSource {
    pub tree: SourceTree,
    pub tokens: TokenStream,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SourceTree {
        SourceTree::new(vec![
            Node::branch(
                "function_definition",
                vec![
                    Node::leaf("function", "function"),
                    Node::leaf("name", "first").with_field("name"),
                ],
            ),
            Node::branch(
                "function_definition",
                vec![
                    Node::leaf("function", "function"),
                    Node::leaf("name", "second").with_field("name"),
                ],
            ),
        ])
    }

    #[test]
    fn find_first_is_document_order() {
        let tree = sample();
        let found = tree
            .find_first("function_definition")
            .and_then(|f| f.child_by_field("name"))
            .and_then(Node::text);
        assert_eq!(found, Some("first"));
        assert_eq!(tree.find_all("name").len(), 2);
        assert!(tree.find_first("class_declaration").is_none());
    }

    #[test]
    fn find_first_mut_edits_in_place() {
        let mut tree = sample();
        if let Some(name) = tree.find_first_mut("name") {
            name.set_text("renamed");
        }
        let names: Vec<_> = tree.find_all("name").iter().filter_map(|n| n.text()).collect();
        assert_eq!(names, vec!["renamed", "second"]);
    }

    #[test]
    fn replace_with_keeps_position_and_field() {
        let mut node = Node::parsed(
            "string",
            Some("value"),
            None,
            vec![Node::leaf("'", "'")],
            NodeId(4),
            Span::new(10, 17),
        );
        node.replace_with(Node::leaf("encapsed_string", "\"foo\""));
        assert_eq!(node.kind(), "encapsed_string");
        assert_eq!(node.span(), Some(Span::new(10, 17)));
        assert_eq!(node.field(), Some("value"));
        assert_eq!(node.origin(), None);
    }

    #[test]
    fn set_text_collapses_children() {
        let mut node = Node::branch("pair", vec![Node::leaf("a", "a"), Node::leaf("b", "b")]);
        node.set_text("ab");
        assert!(node.is_leaf());
        assert!(node.children().is_empty());
        assert_eq!(node.text(), Some("ab"));
    }

    #[test]
    fn token_text_reads_source() {
        let tokens = TokenStream::new(
            "<?php echo",
            vec![Token {
                kind: "echo".to_string(),
                span: Span::new(6, 10),
            }],
        );
        assert_eq!(tokens.text(&tokens.tokens()[0]), "echo");
        assert_eq!(tokens.len(), 1);
    }
}
