use std::sync::Arc;

use codeshift_core::tracer::Tracer;
use codeshift_syntax::{Node, SourceTree};
use tracing::debug;

use crate::codemod::{Codemod, TransformContext};
use crate::registry::CodemodInit;

const FUNCTION_KIND: &str = "function_definition";

/// Renames one declared function.
///
/// Works on the tree directly in `before_traversal`; no visitor is involved.
/// Call sites are not renamed.
pub struct RenameFunction {
    from: Option<String>,
    to: String,
    tracer: Arc<dyn Tracer>,
}

impl RenameFunction {
    pub const NAME: &'static str = "rename-function";

    pub fn new(from: Option<String>, to: impl Into<String>, tracer: Arc<dyn Tracer>) -> Self {
        Self {
            from,
            to: to.into(),
            tracer,
        }
    }

    /// Build from manifest options (`to` required, `from` optional).
    pub fn from_init(init: CodemodInit<'_>) -> anyhow::Result<Self> {
        let to = init.required_string("to")?;
        if !is_identifier(&to) {
            anyhow::bail!("option `to` is not a valid function name: {to:?}");
        }
        let from = init.string_option("from")?;
        Ok(Self::new(from, to, init.tracer))
    }

    fn target<'t>(&self, tree: &'t mut SourceTree) -> Option<&'t mut Node> {
        match &self.from {
            None => tree
                .find_first_mut(FUNCTION_KIND)
                .and_then(|f| f.child_by_field_mut("name")),
            Some(from) => tree
                .statements_mut()
                .iter_mut()
                .find_map(|statement| find_named(statement, from)),
        }
    }
}

impl Codemod for RenameFunction {
    fn before_traversal(
        &mut self,
        mut tree: SourceTree,
        cx: &TransformContext,
    ) -> anyhow::Result<SourceTree> {
        match self.target(&mut tree) {
            Some(name) => {
                debug!(from = name.text().unwrap_or_default(), to = %self.to, "renaming function");
                name.set_text(self.to.as_str());
            }
            None => {
                let file = cx
                    .input_file()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<text>".to_string());
                let what = match &self.from {
                    Some(from) => format!("no function named `{from}`"),
                    None => "no function declaration".to_string(),
                };
                self.tracer.warn(&format!("{what} in {file}"));
            }
        }
        Ok(tree)
    }
}

/// Name node of the first function declared as `name`, in pre-order.
fn find_named<'n>(node: &'n mut Node, name: &str) -> Option<&'n mut Node> {
    let matches = node.kind() == FUNCTION_KIND
        && node.child_by_field("name").and_then(Node::text) == Some(name);
    if matches {
        return node.child_by_field_mut("name");
    }
    node.children_mut()
        .iter_mut()
        .find_map(|child| find_named(child, name))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeshift_core::tracer::MemoryTracer;
    use codeshift_syntax::{parse_php, print_preserving_format};

    fn rename(source: &str, from: Option<&str>, to: &str) -> (String, Vec<String>) {
        let tracer = Arc::new(MemoryTracer::new());
        let mut codemod = RenameFunction::new(from.map(str::to_string), to, tracer.clone());
        let parsed = parse_php(source).unwrap();
        let working = codemod
            .before_traversal(parsed.tree.clone(), &TransformContext::new())
            .unwrap();
        (
            print_preserving_format(&parsed.tree, &parsed.tokens, &working),
            tracer.error_lines(),
        )
    }

    #[test]
    fn renames_first_declaration() {
        let source = "<?php\nfunction a() {}\nfunction b() {}\n";
        let (out, warnings) = rename(source, None, "first");
        assert_eq!(out, "<?php\nfunction first() {}\nfunction b() {}\n");
        assert!(warnings.is_empty());
    }

    #[test]
    fn renames_named_declaration() {
        let source = "<?php\nfunction a() {}\nfunction b() { return a(); }\n";
        let (out, _) = rename(source, Some("b"), "second");
        assert_eq!(out, "<?php\nfunction a() {}\nfunction second() { return a(); }\n");
    }

    #[test]
    fn missing_function_warns_and_keeps_text() {
        let source = "<?php\necho 1;\n";
        let (out, warnings) = rename(source, Some("nope"), "x");
        assert_eq!(out, source);
        assert_eq!(warnings, vec!["warning: no function named `nope` in <text>"]);
    }

    #[test]
    fn identifiers_are_validated() {
        assert!(is_identifier("snake_case2"));
        assert!(is_identifier("_private"));
        assert!(!is_identifier("2fast"));
        assert!(!is_identifier("has space"));
        assert!(!is_identifier(""));
    }
}
