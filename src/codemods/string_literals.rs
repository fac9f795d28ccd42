use codeshift_syntax::visitor::{Transform, VisitResult, Visitor};
use codeshift_syntax::Node;

use crate::codemod::{Codemod, TraversalPlan};
use crate::registry::CodemodInit;

/// Literal kinds produced by the PHP grammar.
const LITERAL_KINDS: &[&str] = &["string", "encapsed_string", "heredoc", "nowdoc"];

/// Replaces every string literal with one double-quoted literal.
#[derive(Debug, Clone)]
pub struct ReplaceStringLiterals {
    replacement: String,
}

impl ReplaceStringLiterals {
    pub const NAME: &'static str = "replace-string-literals";
    pub const DEFAULT_REPLACEMENT: &'static str = "foo";

    pub fn new(replacement: impl Into<String>) -> Self {
        Self {
            replacement: replacement.into(),
        }
    }

    /// Build from manifest options (`replacement`, optional).
    pub fn from_init(init: &CodemodInit<'_>) -> anyhow::Result<Self> {
        let replacement = init
            .string_option("replacement")?
            .unwrap_or_else(|| Self::DEFAULT_REPLACEMENT.to_string());
        Ok(Self::new(replacement))
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }
}

impl Codemod for ReplaceStringLiterals {
    fn setup(&mut self, plan: &mut TraversalPlan) -> anyhow::Result<()> {
        plan.add_visitor(StringLiteralReplacer::new(&self.replacement));
        Ok(())
    }
}

/// Visitor swapping string literal nodes for a fixed double-quoted literal.
#[derive(Debug, Clone)]
pub struct StringLiteralReplacer {
    literal: String,
    replaced: usize,
}

impl StringLiteralReplacer {
    pub fn new(value: &str) -> Self {
        Self {
            literal: double_quoted(value),
            replaced: 0,
        }
    }

    /// Literals replaced so far.
    pub fn replaced(&self) -> usize {
        self.replaced
    }
}

impl Visitor for StringLiteralReplacer {
    fn enter(&mut self, node: &mut Node) -> anyhow::Result<VisitResult> {
        if is_literal(node) {
            return Ok(VisitResult::SkipChildren);
        }
        Ok(VisitResult::Continue)
    }

    fn leave(&mut self, node: &mut Node) -> anyhow::Result<Transform> {
        if is_literal(node) {
            node.replace_with(Node::leaf("encapsed_string", self.literal.as_str()));
            self.replaced += 1;
        }
        Ok(Transform::Keep)
    }
}

fn is_literal(node: &Node) -> bool {
    LITERAL_KINDS.contains(&node.kind())
}

/// Quote `value` so PHP reads it back verbatim inside double quotes.
fn double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' | '"' | '$' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
