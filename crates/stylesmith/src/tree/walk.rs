//! Pre-order traversal over a [`StyleTree`].
//!
//! Every pass over the tree (validation, compilation, detection, BEM checks,
//! fingerprinting) goes through [`Walk`]. Passes differ only in the depth
//! ceiling they set and in which visits they keep, which they express with
//! [`Walk::max_depth`] and ordinary iterator adapters.
//!
//! Visits come out in document order: a node, then its children from first
//! to last, recursively.

use super::{NodePath, StyleNode, StyleTree};

/// One node reached by a [`Walk`].
#[derive(Debug, Clone)]
pub struct Visit<'a> {
    /// The node itself.
    pub node: &'a StyleNode,
    /// Nesting depth; roots are at depth 1.
    pub depth: usize,
    /// Index path of the node.
    pub path: NodePath,
    /// Identifiers from the root down to (and including) this node.
    pub lineage: Vec<&'a str>,
}

impl Visit<'_> {
    /// Human-readable location, e.g. `.card > &:hover`.
    pub fn breadcrumb(&self) -> String {
        self.lineage.join(" > ")
    }

    /// Returns true for top-level nodes.
    pub fn is_root(&self) -> bool {
        self.depth == 1
    }
}

struct Frame<'a> {
    node: &'a StyleNode,
    path: NodePath,
    lineage: Vec<&'a str>,
}

/// Pre-order iterator over the nodes of a tree.
///
/// With a depth ceiling set, nodes deeper than the ceiling are neither
/// yielded nor descended into.
pub struct Walk<'a> {
    stack: Vec<Frame<'a>>,
    max_depth: Option<usize>,
}

impl<'a> Walk<'a> {
    pub(crate) fn new(tree: &'a StyleTree) -> Self {
        let stack = tree
            .roots
            .iter()
            .enumerate()
            .rev()
            .map(|(index, node)| Frame {
                node,
                path: NodePath::root(index),
                lineage: vec![node.identifier.as_str()],
            })
            .collect();

        Self {
            stack,
            max_depth: None,
        }
    }

    /// Limits the walk to nodes at depth `max_depth` or shallower.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        if max_depth == 0 {
            self.stack.clear();
        }
        self
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = Visit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.stack.pop()?;
        let depth = frame.path.depth();

        let descend = self.max_depth.map_or(true, |max| depth < max);
        if descend {
            for (index, child) in frame.node.children.iter().enumerate().rev() {
                let mut lineage = Vec::with_capacity(frame.lineage.len() + 1);
                lineage.extend_from_slice(&frame.lineage);
                lineage.push(child.identifier.as_str());
                self.stack.push(Frame {
                    node: child,
                    path: frame.path.child(index),
                    lineage,
                });
            }
        }

        Some(Visit {
            node: frame.node,
            depth,
            path: frame.path,
            lineage: frame.lineage,
        })
    }
}
