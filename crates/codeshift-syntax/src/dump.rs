// Copyright (c) the codeshift contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Human-readable tree dumps.
//!
//! One line per node, indented two spaces per level:
//!
//! ```text
//! function_definition [6..40]
//!   function "function" [6..14]
//!   name: name "greet" [15..20]
//! ```
//!
//! Nodes without a position (created by a codemod) are marked `(new)`.

use std::fmt::Write;

use crate::tree::{Node, SourceTree};

pub(crate) fn dump_tree(tree: &SourceTree) -> String {
    let mut out = String::new();
    for statement in tree.statements() {
        dump_node(statement, 0, &mut out);
    }
    out
}

fn dump_node(node: &Node, depth: usize, out: &mut String) {
    let _ = write!(out, "{:indent$}", "", indent = depth * 2);
    if let Some(field) = node.field() {
        let _ = write!(out, "{field}: ");
    }
    out.push_str(node.kind());
    if let Some(text) = node.text() {
        let _ = write!(out, " {text:?}");
    }
    match node.span() {
        Some(span) => {
            let _ = write!(out, " [{}..{}]", span.start, span.end);
        }
        None => out.push_str(" (new)"),
    }
    out.push('\n');
    for child in node.children() {
        dump_node(child, depth + 1, out);
    }
}
