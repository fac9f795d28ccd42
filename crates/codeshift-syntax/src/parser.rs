// Copyright (c) the codeshift contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! tree-sitter-php adapter.
//!
//! Converts a tree-sitter concrete syntax tree into a [`SourceTree`]. Every
//! tree-sitter node becomes a [`Node`]: nodes without children become leaves
//! holding their source text, everything else becomes a branch. Each node gets
//! a fresh [`NodeId`] in pre-order and keeps its byte span. The children of
//! the root `program` node are the statement-level nodes.
//!
//! Any `ERROR` or `MISSING` node in the tree is reported as a [`ParseError`]
//! pointing at the first such node in document order.

use thiserror::Error;
use tree_sitter::{Node as TsNode, Parser, TreeCursor};

use codeshift_core::text::{byte_offset_to_position, line_text, truncate_chars};

use crate::tree::{Node, NodeId, ParsedSource, SourceTree, Span, Token, TokenStream};

const SNIPPET_CHARS: usize = 24;

/// Failure to parse source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at line {line}, column {column}")]
pub struct ParseError {
    /// Human-readable description of the problem.
    pub message: String,
    /// 1-indexed line of the offending token.
    pub line: u32,
    /// 1-indexed column of the offending token.
    pub column: u32,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

/// Parse PHP source text into a tree and its token stream.
pub fn parse_php(text: &str) -> Result<ParsedSource, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_php::LANGUAGE_PHP.into())
        .map_err(|e| ParseError::new(format!("failed to load PHP grammar: {e}"), 1, 1))?;

    let ts_tree = parser
        .parse(text, None)
        .ok_or_else(|| ParseError::new("parser produced no tree", 1, 1))?;

    let root = ts_tree.root_node();
    if root.has_error() {
        return Err(describe_error(root, text));
    }

    let mut builder = TreeBuilder {
        source: text,
        next_id: 0,
        tokens: Vec::new(),
    };
    let mut statements = Vec::new();
    let mut cursor = root.walk();
    if cursor.goto_first_child() {
        loop {
            statements.push(builder.build(&mut cursor));
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }

    Ok(ParsedSource {
        tree: SourceTree::new(statements),
        tokens: TokenStream::new(text, builder.tokens),
    })
}

// ============================================================================
// Tree Conversion
// ============================================================================

struct TreeBuilder<'src> {
    source: &'src str,
    next_id: u32,
    tokens: Vec<Token>,
}

impl TreeBuilder<'_> {
    /// Convert the node under the cursor, leaving the cursor where it started.
    fn build(&mut self, cursor: &mut TreeCursor<'_>) -> Node {
        let ts_node = cursor.node();
        let field = cursor.field_name();
        let id = NodeId(self.next_id);
        self.next_id += 1;
        let span = Span::new(ts_node.start_byte(), ts_node.end_byte());

        if ts_node.child_count() == 0 {
            let text = self
                .source
                .get(span.start..span.end)
                .unwrap_or_default()
                .to_string();
            self.tokens.push(Token {
                kind: ts_node.kind().to_string(),
                span,
            });
            return Node::parsed(ts_node.kind(), field, Some(text), Vec::new(), id, span);
        }

        let mut children = Vec::with_capacity(ts_node.child_count());
        if cursor.goto_first_child() {
            loop {
                children.push(self.build(cursor));
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
            cursor.goto_parent();
        }
        Node::parsed(ts_node.kind(), field, None, children, id, span)
    }
}

// ============================================================================
// Error Reporting
// ============================================================================

fn describe_error(root: TsNode<'_>, text: &str) -> ParseError {
    let Some(bad) = first_error(root) else {
        return ParseError::new("syntax error", 1, 1);
    };

    let (line, column) = byte_offset_to_position(text, bad.start_byte());
    let message = if bad.is_missing() {
        format!("syntax error, missing `{}`", bad.kind())
    } else {
        let snippet = text
            .get(bad.start_byte()..bad.end_byte())
            .map(|s| s.lines().next().unwrap_or_default().trim())
            .filter(|s| !s.is_empty())
            .map(|s| truncate_chars(s, SNIPPET_CHARS));
        match snippet {
            Some(snippet) => format!("syntax error, unexpected `{snippet}`"),
            None => match line_text(text, line) {
                Some(source_line) => format!(
                    "syntax error near `{}`",
                    truncate_chars(source_line.trim(), SNIPPET_CHARS)
                ),
                None => "syntax error, unexpected end of file".to_string(),
            },
        }
    };
    ParseError::new(message, line, column)
}

/// First `ERROR` or `MISSING` node in document order.
fn first_error(node: TsNode<'_>) -> Option<TsNode<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<TsNode<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error() || child.is_missing())
        .find_map(first_error)
}

// ============================================================================
// Tests
// ============================================================================
