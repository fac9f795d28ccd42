// Copyright (c) the codeshift contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitor infrastructure for full-tree traversal.
//!
//! A [`Traverser`] walks a [`SourceTree`] once, applying an ordered list of
//! [`Visitor`]s to every node.
//!
//! # Traversal Order
//!
//! - `before_traverse` for every visitor, in order
//! - **Depth-first, pre-order** `enter` calls, every visitor in order per node
//! - **Post-order** `leave` calls, every visitor in order per node
//! - `after_traverse` for every visitor, in order
//!
//! Children are visited in source order.
//!
//! # Controlling the Walk
//!
//! `enter` returns a [`VisitResult`]. If any visitor asks to skip children,
//! the children are skipped for all of them; `Stop` ends the walk
//! immediately and no further `enter` or `leave` calls are made.
//!
//! `leave` returns a [`Transform`] that can keep, remove or replace the node
//! in its parent's list. The first visitor that does not keep the node
//! decides; later visitors are not called for it.
//!
//! # Example
//!
//! ```ignore
//! use codeshift_syntax::visitor::{Transform, Visitor};
//! use codeshift_syntax::Node;
//!
//! struct DropEcho;
//!
//! impl Visitor for DropEcho {
//!     fn leave(&mut self, node: &mut Node) -> anyhow::Result<Transform> {
//!         if node.kind() == "echo_statement" {
//!             return Ok(Transform::Remove);
//!         }
//!         Ok(Transform::Keep)
//!     }
//! }
//! ```

use crate::tree::{Node, SourceTree};

/// Result of entering a node - controls traversal behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisitResult {
    /// Continue traversal into children.
    #[default]
    Continue,
    /// Skip children, continue with siblings. `leave` is still called.
    SkipChildren,
    /// Stop traversal entirely.
    Stop,
}

/// Result of leaving a node - controls what stays in the parent list.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Transform {
    /// Keep the (possibly mutated) node.
    #[default]
    Keep,
    /// Remove the node from its parent.
    Remove,
    /// Replace the node with zero or more nodes.
    Flatten(Vec<Node>),
}

/// Hooks invoked during one traversal.
///
/// All methods have no-op defaults; implement the ones you need. Errors
/// abort the traversal and propagate to the caller.
pub trait Visitor {
    fn before_traverse(&mut self, _tree: &mut SourceTree) -> anyhow::Result<()> {
        Ok(())
    }

    fn enter(&mut self, _node: &mut Node) -> anyhow::Result<VisitResult> {
        Ok(VisitResult::Continue)
    }

    fn leave(&mut self, _node: &mut Node) -> anyhow::Result<Transform> {
        Ok(Transform::Keep)
    }

    fn after_traverse(&mut self, _tree: &mut SourceTree) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Runs one full walk of a tree with a list of visitors.
pub struct Traverser<'v> {
    visitors: &'v mut [Box<dyn Visitor>],
    stopped: bool,
}

impl<'v> Traverser<'v> {
    pub fn new(visitors: &'v mut [Box<dyn Visitor>]) -> Self {
        Self {
            visitors,
            stopped: false,
        }
    }

    /// Walk `tree` once and return it.
    pub fn traverse(mut self, mut tree: SourceTree) -> anyhow::Result<SourceTree> {
        for visitor in self.visitors.iter_mut() {
            visitor.before_traverse(&mut tree)?;
        }
        self.walk_list(tree.statements_mut())?;
        for visitor in self.visitors.iter_mut() {
            visitor.after_traverse(&mut tree)?;
        }
        Ok(tree)
    }

    fn walk_list(&mut self, nodes: &mut Vec<Node>) -> anyhow::Result<()> {
        let pending = std::mem::take(nodes);
        let mut kept = Vec::with_capacity(pending.len());
        for mut node in pending {
            if self.stopped {
                kept.push(node);
                continue;
            }
            match self.walk_node(&mut node)? {
                Transform::Keep => kept.push(node),
                Transform::Remove => {}
                Transform::Flatten(replacement) => kept.extend(replacement),
            }
        }
        *nodes = kept;
        Ok(())
    }

    fn walk_node(&mut self, node: &mut Node) -> anyhow::Result<Transform> {
        let mut skip_children = false;
        for visitor in self.visitors.iter_mut() {
            match visitor.enter(node)? {
                VisitResult::Continue => {}
                VisitResult::SkipChildren => skip_children = true,
                VisitResult::Stop => {
                    self.stopped = true;
                    return Ok(Transform::Keep);
                }
            }
        }

        if !skip_children {
            self.walk_list(node.children_mut())?;
            if self.stopped {
                return Ok(Transform::Keep);
            }
        }

        for visitor in self.visitors.iter_mut() {
            match visitor.leave(node)? {
                Transform::Keep => {}
                other => return Ok(other),
            }
        }
        Ok(Transform::Keep)
    }
}

/// Convenience wrapper: walk `tree` once with `visitors`.
pub fn traverse(tree: SourceTree, visitors: &mut [Box<dyn Visitor>]) -> anyhow::Result<SourceTree> {
    Traverser::new(visitors).traverse(tree)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn tree() -> SourceTree {
        SourceTree::new(vec![
            Node::branch(
                "block",
                vec![Node::leaf("a", "a"), Node::leaf("b", "b")],
            ),
            Node::leaf("c", "c"),
        ])
    }

    struct Recorder {
        tag: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Visitor for Recorder {
        fn before_traverse(&mut self, _tree: &mut SourceTree) -> anyhow::Result<()> {
            self.log.borrow_mut().push(format!("{}:before", self.tag));
            Ok(())
        }

        fn enter(&mut self, node: &mut Node) -> anyhow::Result<VisitResult> {
            self.log.borrow_mut().push(format!("{}:enter:{}", self.tag, node.kind()));
            Ok(VisitResult::Continue)
        }

        fn leave(&mut self, node: &mut Node) -> anyhow::Result<Transform> {
            self.log.borrow_mut().push(format!("{}:leave:{}", self.tag, node.kind()));
            Ok(Transform::Keep)
        }

        fn after_traverse(&mut self, _tree: &mut SourceTree) -> anyhow::Result<()> {
            self.log.borrow_mut().push(format!("{}:after", self.tag));
            Ok(())
        }
    }

    #[test]
    fn hooks_run_pre_and_post_order_per_visitor() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut visitors: Vec<Box<dyn Visitor>> = vec![
            Box::new(Recorder { tag: "1", log: log.clone() }),
            Box::new(Recorder { tag: "2", log: log.clone() }),
        ];
        traverse(tree(), &mut visitors).unwrap();

        let log = log.borrow();
        assert_eq!(
            log.as_slice(),
            [
                "1:before", "2:before",
                "1:enter:block", "2:enter:block",
                "1:enter:a", "2:enter:a", "1:leave:a", "2:leave:a",
                "1:enter:b", "2:enter:b", "1:leave:b", "2:leave:b",
                "1:leave:block", "2:leave:block",
                "1:enter:c", "2:enter:c", "1:leave:c", "2:leave:c",
                "1:after", "2:after",
            ]
        );
    }

    struct Editor;

    impl Visitor for Editor {
        fn enter(&mut self, node: &mut Node) -> anyhow::Result<VisitResult> {
            if node.kind() == "block" {
                return Ok(VisitResult::SkipChildren);
            }
            Ok(VisitResult::Continue)
        }

        fn leave(&mut self, node: &mut Node) -> anyhow::Result<Transform> {
            match node.kind() {
                "a" => Ok(Transform::Remove),
                "c" => Ok(Transform::Flatten(vec![
                    Node::leaf("x", "x"),
                    Node::leaf("y", "y"),
                ])),
                _ => Ok(Transform::Keep),
            }
        }
    }

    #[test]
    fn leave_can_remove_and_flatten() {
        let mut visitors: Vec<Box<dyn Visitor>> = vec![Box::new(Editor)];
        let result = traverse(tree(), &mut visitors).unwrap();
        let kinds: Vec<_> = result.statements().iter().map(Node::kind).collect();
        assert_eq!(kinds, vec!["block", "x", "y"]);
        // children of `block` were skipped, so `a` survived
        assert_eq!(result.statements()[0].children().len(), 2);
    }

    struct StopAt(&'static str, usize);

    impl Visitor for StopAt {
        fn enter(&mut self, node: &mut Node) -> anyhow::Result<VisitResult> {
            self.1 += 1;
            if node.kind() == self.0 {
                return Ok(VisitResult::Stop);
            }
            Ok(VisitResult::Continue)
        }

        fn leave(&mut self, _node: &mut Node) -> anyhow::Result<Transform> {
            Ok(Transform::Remove)
        }
    }

    #[test]
    fn stop_ends_the_walk_without_losing_nodes() {
        let mut visitors: Vec<Box<dyn Visitor>> = vec![Box::new(StopAt("a", 0))];
        let result = traverse(tree(), &mut visitors).unwrap();
        // nothing after the stop is entered or left, so nothing is removed
        assert_eq!(result.statements().len(), 2);
        assert_eq!(result.statements()[0].children().len(), 2);
    }

    struct Fails;

    impl Visitor for Fails {
        fn enter(&mut self, node: &mut Node) -> anyhow::Result<VisitResult> {
            if node.kind() == "b" {
                anyhow::bail!("cannot handle {}", node.kind());
            }
            Ok(VisitResult::Continue)
        }
    }

    #[test]
    fn visitor_errors_propagate() {
        let mut visitors: Vec<Box<dyn Visitor>> = vec![Box::new(Fails)];
        let err = traverse(tree(), &mut visitors).unwrap_err();
        assert_eq!(err.to_string(), "cannot handle b");
    }
}
