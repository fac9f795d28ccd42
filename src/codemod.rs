//! The codemod lifecycle contract.
//!
//! A codemod is a user-authored transformation with a fixed lifecycle:
//!
//! 1. [`Codemod::setup`] runs exactly once, when the codemod is prepared.
//!    It registers traversal steps on a [`TraversalPlan`]. No
//!    [`TransformContext`] exists at this point.
//! 2. For every file, [`PreparedCodemod::transform`] runs, in this order:
//!    [`Codemod::before_traversal`], each registered traversal step in
//!    registration order, then [`Codemod::after_traversal`].
//!
//! The composed `transform` lives on [`PreparedCodemod`] so implementors can
//! mix manual and visitor-based edits freely but can never reorder the
//! phases.
//!
//! # Example
//!
//! ```ignore
//! use codeshift::codemod::{Codemod, TransformContext};
//! use codeshift_syntax::{Node, SourceTree};
//!
//! struct AppendMarker;
//!
//! impl Codemod for AppendMarker {
//!     fn after_traversal(
//!         &mut self,
//!         mut tree: SourceTree,
//!         _cx: &TransformContext,
//!     ) -> anyhow::Result<SourceTree> {
//!         tree.push(Node::leaf("comment", "// processed"));
//!         Ok(tree)
//!     }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use codeshift_core::error::{ShiftError, ShiftResult};
use codeshift_syntax::visitor::{Traverser, Visitor};
use codeshift_syntax::SourceTree;

// ============================================================================
// TransformContext
// ============================================================================

/// Named attributes describing the file currently being transformed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformContext {
    attributes: BTreeMap<String, String>,
}

impl TransformContext {
    /// Attribute holding the absolute input file path.
    pub const INPUT_FILE: &'static str = "input_file";
    /// Attribute holding the absolute output file path.
    pub const OUTPUT_FILE: &'static str = "output_file";

    pub fn new() -> Self {
        Self::default()
    }

    /// Context for one file, carrying both absolute paths.
    pub fn for_file(input: &Path, output: &Path) -> Self {
        let mut cx = Self::new();
        cx.set(Self::INPUT_FILE, input.display().to_string());
        cx.set(Self::OUTPUT_FILE, output.display().to_string());
        cx
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn input_file(&self) -> Option<PathBuf> {
        self.get(Self::INPUT_FILE).map(PathBuf::from)
    }

    pub fn output_file(&self) -> Option<PathBuf> {
        self.get(Self::OUTPUT_FILE).map(PathBuf::from)
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// ============================================================================
// Traversal Steps
// ============================================================================

/// One full tree walk applying an ordered set of visitors.
pub struct TraversalStep {
    visitors: Vec<Box<dyn Visitor>>,
}

impl TraversalStep {
    pub fn new(visitors: Vec<Box<dyn Visitor>>) -> Self {
        Self { visitors }
    }

    pub fn len(&self) -> usize {
        self.visitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visitors.is_empty()
    }

    fn run(&mut self, tree: SourceTree) -> anyhow::Result<SourceTree> {
        Traverser::new(&mut self.visitors).traverse(tree)
    }
}

impl fmt::Debug for TraversalStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraversalStep")
            .field("visitors", &self.visitors.len())
            .finish()
    }
}

/// Ordered traversal steps registered during setup.
#[derive(Debug, Default)]
pub struct TraversalPlan {
    steps: Vec<TraversalStep>,
}

impl TraversalPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a traversal step made of several visitors.
    pub fn add_traversal(&mut self, visitors: Vec<Box<dyn Visitor>>) {
        self.steps.push(TraversalStep::new(visitors));
    }

    /// Register a traversal step with a single visitor.
    pub fn add_visitor(&mut self, visitor: impl Visitor + 'static) {
        self.add_traversal(vec![Box::new(visitor)]);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

// ============================================================================
// Codemod
// ============================================================================

/// Overridable hooks of a codemod.
///
/// Every hook has a default, so an empty `impl` is a valid identity codemod.
pub trait Codemod {
    /// One-time setup. Register traversal steps on `plan` here.
    fn setup(&mut self, _plan: &mut TraversalPlan) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs on the freshly cloned working tree, before any traversal step.
    fn before_traversal(
        &mut self,
        tree: SourceTree,
        _cx: &TransformContext,
    ) -> anyhow::Result<SourceTree> {
        Ok(tree)
    }

    /// Runs after the last traversal step.
    fn after_traversal(
        &mut self,
        tree: SourceTree,
        _cx: &TransformContext,
    ) -> anyhow::Result<SourceTree> {
        Ok(tree)
    }
}

// ============================================================================
// PreparedCodemod
// ============================================================================

/// A codemod whose setup has run, ready to transform files.
pub struct PreparedCodemod {
    name: String,
    path: PathBuf,
    codemod: Box<dyn Codemod>,
    plan: TraversalPlan,
    context: TransformContext,
}

impl PreparedCodemod {
    /// Run setup once and wrap the codemod.
    ///
    /// A setup failure is reported as [`ShiftError::CodemodFailed`] with no
    /// file attached.
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        mut codemod: Box<dyn Codemod>,
    ) -> ShiftResult<Self> {
        let mut plan = TraversalPlan::new();
        codemod
            .setup(&mut plan)
            .map_err(|source| ShiftError::CodemodFailed { file: None, source })?;
        Ok(Self {
            name: name.into(),
            path: path.into(),
            codemod,
            plan,
            context: TransformContext::new(),
        })
    }

    /// Registry name of the codemod.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path the codemod was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of traversal steps registered during setup.
    pub fn traversal_count(&self) -> usize {
        self.plan.len()
    }

    /// Set the context for the next `transform` call; `None` clears it.
    pub fn set_context(&mut self, context: Option<TransformContext>) {
        self.context = context.unwrap_or_default();
    }

    pub fn context(&self) -> &TransformContext {
        &self.context
    }

    /// Apply every phase to `tree`: before, each traversal step, after.
    pub fn transform(&mut self, tree: SourceTree) -> anyhow::Result<SourceTree> {
        let mut tree = self.codemod.before_traversal(tree, &self.context)?;
        for step in &mut self.plan.steps {
            tree = step.run(tree)?;
        }
        self.codemod.after_traversal(tree, &self.context)
    }
}

impl fmt::Debug for PreparedCodemod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedCodemod")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("plan", &self.plan)
            .field("context", &self.context)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use codeshift_syntax::visitor::Visitor;
    use codeshift_syntax::Node;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn marker(tree: &mut SourceTree, label: &str) {
        tree.push(Node::leaf("comment", format!("// {label}")));
    }

    fn markers(tree: &SourceTree) -> Vec<String> {
        tree.statements()
            .iter()
            .filter_map(|n| n.text())
            .map(str::to_string)
            .collect()
    }

    struct AppendOnce(&'static str);

    impl Visitor for AppendOnce {
        fn after_traverse(&mut self, tree: &mut SourceTree) -> anyhow::Result<()> {
            marker(tree, self.0);
            Ok(())
        }
    }

    struct Ordered;

    impl Codemod for Ordered {
        fn setup(&mut self, plan: &mut TraversalPlan) -> anyhow::Result<()> {
            plan.add_visitor(AppendOnce("B"));
            plan.add_visitor(AppendOnce("C"));
            Ok(())
        }

        fn before_traversal(
            &mut self,
            mut tree: SourceTree,
            _cx: &TransformContext,
        ) -> anyhow::Result<SourceTree> {
            marker(&mut tree, "A");
            Ok(tree)
        }

        fn after_traversal(
            &mut self,
            mut tree: SourceTree,
            _cx: &TransformContext,
        ) -> anyhow::Result<SourceTree> {
            marker(&mut tree, "D");
            Ok(tree)
        }
    }

    #[test]
    fn phases_run_in_fixed_order() {
        let mut codemod = PreparedCodemod::new("ordered", "ordered.toml", Box::new(Ordered)).unwrap();
        assert_eq!(codemod.traversal_count(), 2);

        for _ in 0..2 {
            let tree = codemod.transform(SourceTree::default()).unwrap();
            assert_eq!(markers(&tree), vec!["// A", "// B", "// C", "// D"]);
        }
    }

    struct Identity;
    impl Codemod for Identity {}

    #[test]
    fn default_hooks_are_identity() {
        let mut codemod = PreparedCodemod::new("identity", "identity.toml", Box::new(Identity)).unwrap();
        let tree = SourceTree::new(vec![Node::leaf("comment", "// keep")]);
        assert_eq!(codemod.transform(tree.clone()).unwrap(), tree);
        assert_eq!(codemod.traversal_count(), 0);
    }

    struct SeesContext {
        seen_in_setup: Rc<RefCell<Option<bool>>>,
        seen: Rc<RefCell<Vec<Option<String>>>>,
    }

    impl Codemod for SeesContext {
        fn setup(&mut self, _plan: &mut TraversalPlan) -> anyhow::Result<()> {
            // setup has no context to look at
            *self.seen_in_setup.borrow_mut() = Some(true);
            Ok(())
        }

        fn before_traversal(
            &mut self,
            tree: SourceTree,
            cx: &TransformContext,
        ) -> anyhow::Result<SourceTree> {
            self.seen
                .borrow_mut()
                .push(cx.get(TransformContext::INPUT_FILE).map(str::to_string));
            Ok(tree)
        }
    }

    #[test]
    fn context_reflects_current_file_only() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let setup = Rc::new(RefCell::new(None));
        let mut codemod = PreparedCodemod::new(
            "ctx",
            "ctx.toml",
            Box::new(SeesContext {
                seen_in_setup: setup.clone(),
                seen: seen.clone(),
            }),
        )
        .unwrap();
        assert_eq!(*setup.borrow(), Some(true));
        assert!(codemod.context().is_empty());

        codemod.set_context(Some(TransformContext::for_file(
            Path::new("/in/a.php"),
            Path::new("/out/a.php"),
        )));
        codemod.transform(SourceTree::default()).unwrap();
        codemod.set_context(None);
        codemod.transform(SourceTree::default()).unwrap();

        assert_eq!(
            seen.borrow().as_slice(),
            [Some("/in/a.php".to_string()), None]
        );
    }

    struct FailingSetup;

    impl Codemod for FailingSetup {
        fn setup(&mut self, _plan: &mut TraversalPlan) -> anyhow::Result<()> {
            anyhow::bail!("no steps for you")
        }
    }

    #[test]
    fn setup_failure_is_codemod_failure() {
        let err = PreparedCodemod::new("bad", "bad.toml", Box::new(FailingSetup)).unwrap_err();
        match err {
            ShiftError::CodemodFailed { file, source } => {
                assert!(file.is_none());
                assert_eq!(source.to_string(), "no steps for you");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    struct FailingAfter;

    impl Codemod for FailingAfter {
        fn after_traversal(
            &mut self,
            _tree: SourceTree,
            _cx: &TransformContext,
        ) -> anyhow::Result<SourceTree> {
            anyhow::bail!("after failed")
        }
    }

    #[test]
    fn hook_errors_propagate() {
        let mut codemod = PreparedCodemod::new("after", "after.toml", Box::new(FailingAfter)).unwrap();
        let err = codemod.transform(SourceTree::default()).unwrap_err();
        assert_eq!(err.to_string(), "after failed");
    }

    #[test]
    fn context_for_file_sets_both_paths() {
        let cx = TransformContext::for_file(Path::new("/a/in.php"), Path::new("/b/out.php"));
        assert_eq!(cx.input_file(), Some(PathBuf::from("/a/in.php")));
        assert_eq!(cx.output_file(), Some(PathBuf::from("/b/out.php")));
        assert_eq!(cx.iter().count(), 2);
    }
}
