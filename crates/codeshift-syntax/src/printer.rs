// Copyright (c) the codeshift contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Format-preserving printer.
//!
//! Given the original tree, its token stream and a working tree derived from
//! it, the printer re-emits source text:
//!
//! - A node is **pristine** when it has an origin marker, the original node
//!   with that marker has the same kind and text, and its children are the
//!   same original nodes in the same order, each pristine themselves. A
//!   pristine node prints as its original source slice, byte for byte.
//! - Any other node is rebuilt from its children. Between two siblings the
//!   original whitespace is reused when both have spans and the original
//!   text between them is pure whitespace; otherwise a separator is chosen
//!   from the kinds and text on either side.
//!
//! An entirely pristine tree prints as the original source.

use std::collections::HashMap;

use crate::tree::{Node, NodeId, SourceTree, Span, TokenStream};

/// Re-emit `new` using original text wherever it still matches `original`.
pub fn print_preserving_format(
    original: &SourceTree,
    tokens: &TokenStream,
    new: &SourceTree,
) -> String {
    let source = tokens.source();
    let printer = Printer::new(source, original);

    let fragments: Vec<Fragment> = new
        .statements()
        .iter()
        .map(|statement| printer.fragment(statement))
        .collect();

    let unchanged = new.len() == original.len()
        && new
            .statements()
            .iter()
            .zip(original.statements())
            .all(|(n, o)| n.origin().is_some() && n.origin() == o.origin())
        && fragments.iter().all(Fragment::is_pristine);
    if unchanged {
        return source.to_string();
    }

    let (lead_end, trail_start) = match (
        original.statements().first().and_then(Node::span),
        original.statements().last().and_then(Node::span),
    ) {
        (Some(first), Some(last)) => (first.start, last.end),
        _ => (source.len(), source.len()),
    };

    let mut out = String::with_capacity(source.len());
    out.push_str(source.get(..lead_end).unwrap_or_default());
    printer.join(new.statements(), &fragments, true, &mut out);
    out.push_str(source.get(trail_start..).unwrap_or_default());
    out
}

/// Render a node with no original text to draw on.
pub(crate) fn render(node: &Node) -> String {
    let empty = SourceTree::default();
    let printer = Printer::new("", &empty);
    let fragment = printer.fragment(node);
    printer.materialize(&fragment).into_owned()
}

// ============================================================================
// Printer
// ============================================================================

enum Fragment {
    Pristine(Span),
    Fresh(String),
}

impl Fragment {
    fn is_pristine(&self) -> bool {
        matches!(self, Fragment::Pristine(_))
    }
}

struct Printer<'a> {
    source: &'a str,
    originals: HashMap<NodeId, &'a Node>,
}

impl<'a> Printer<'a> {
    fn new(source: &'a str, original: &'a SourceTree) -> Self {
        let mut originals = HashMap::new();
        for statement in original.statements() {
            index(statement, &mut originals);
        }
        Self { source, originals }
    }

    fn fragment(&self, node: &Node) -> Fragment {
        let original = node.origin().and_then(|id| self.originals.get(&id).copied());

        if let Some(text) = node.text() {
            return match original {
                Some(orig) if orig.kind() == node.kind() && orig.text() == Some(text) => orig
                    .span()
                    .map(Fragment::Pristine)
                    .unwrap_or_else(|| Fragment::Fresh(text.to_string())),
                _ => Fragment::Fresh(text.to_string()),
            };
        }

        let children: Vec<Fragment> = node.children().iter().map(|c| self.fragment(c)).collect();

        if let Some(orig) = original {
            let same_shape = orig.kind() == node.kind()
                && !orig.is_leaf()
                && orig.children().len() == node.children().len()
                && orig
                    .children()
                    .iter()
                    .zip(node.children())
                    .all(|(o, n)| n.origin().is_some() && n.origin() == o.origin());
            if same_shape && children.iter().all(Fragment::is_pristine) {
                if let Some(span) = orig.span() {
                    return Fragment::Pristine(span);
                }
            }
        }

        let (lead, trail) = self.edge_text(node);
        let mut out = String::new();
        out.push_str(lead);
        self.join(node.children(), &children, false, &mut out);
        out.push_str(trail);
        Fragment::Fresh(out)
    }

    fn materialize<'f>(&self, fragment: &'f Fragment) -> std::borrow::Cow<'f, str>
    where
        'a: 'f,
    {
        match fragment {
            Fragment::Pristine(span) => self
                .source
                .get(span.start..span.end)
                .unwrap_or_default()
                .into(),
            Fragment::Fresh(text) => text.as_str().into(),
        }
    }

    fn join(&self, nodes: &[Node], fragments: &[Fragment], statements: bool, out: &mut String) {
        for (i, (node, fragment)) in nodes.iter().zip(fragments).enumerate() {
            let text = self.materialize(fragment);
            if i > 0 {
                let prev = &nodes[i - 1];
                let separator = match self.original_gap(prev, node) {
                    Some(gap) => gap,
                    None => fallback_separator(prev, node, statements, out.as_str(), &text),
                };
                out.push_str(separator);
            }
            out.push_str(&text);
        }
    }

    /// Original whitespace between two nodes, when it is still meaningful.
    fn original_gap(&self, prev: &Node, next: &Node) -> Option<&'a str> {
        self.whitespace_between(prev.span()?.end, next.span()?.start)
    }

    /// Original whitespace inside `node` before its first child and after
    /// its last one. Heredoc bodies start with such a newline.
    fn edge_text(&self, node: &Node) -> (&'a str, &'a str) {
        let (Some(span), Some(first), Some(last)) = (
            node.span(),
            node.children().first().and_then(Node::span),
            node.children().last().and_then(Node::span),
        ) else {
            return ("", "");
        };
        (
            self.whitespace_between(span.start, first.start).unwrap_or_default(),
            self.whitespace_between(last.end, span.end).unwrap_or_default(),
        )
    }

    fn whitespace_between(&self, start: usize, end: usize) -> Option<&'a str> {
        if start > end {
            return None;
        }
        let gap = self.source.get(start..end)?;
        gap.chars().all(char::is_whitespace).then_some(gap)
    }
}

fn index<'a>(node: &'a Node, originals: &mut HashMap<NodeId, &'a Node>) {
    if let Some(id) = node.origin() {
        originals.insert(id, node);
    }
    for child in node.children() {
        index(child, originals);
    }
}

// ============================================================================
// Separators
// ============================================================================

fn is_statement_like(node: &Node) -> bool {
    let kind = node.kind();
    kind == "comment"
        || kind.ends_with("_statement")
        || kind.ends_with("_definition")
        || kind.ends_with("_declaration")
}

fn fallback_separator(
    prev: &Node,
    next: &Node,
    statements: bool,
    printed: &str,
    next_text: &str,
) -> &'static str {
    if statements || is_statement_like(prev) || is_statement_like(next) {
        return "\n";
    }
    token_gap(printed, next_text)
}

fn token_gap(printed: &str, next: &str) -> &'static str {
    let (Some(p), Some(n)) = (printed.chars().last(), next.chars().next()) else {
        return "";
    };
    if p.is_whitespace() || n.is_whitespace() {
        return "";
    }
    if matches!(p, '(' | '[' | '$' | '\\')
        || matches!(n, ';' | ',' | ')' | ']' | '(' | '[')
        || printed.ends_with("->")
        || printed.ends_with("::")
        || next.starts_with("->")
        || next.starts_with("?->")
        || next.starts_with("::")
    {
        return "";
    }
    " "
}

// ============================================================================
// Tests
// ============================================================================
