//! The parsed style tree.
//!
//! A [`StyleTree`] is the in-memory form of a style document: an ordered list
//! of root [`StyleNode`]s, each carrying an identifier (a selector fragment
//! such as `.card` or `&:hover`), an ordered list of [`Declaration`]s and an
//! ordered list of nested children.
//!
//! Order matters everywhere. Declarations keep their source order because the
//! cascade depends on it, and children keep theirs because compiled output is
//! emitted in traversal order.
//!
//! # Building Trees
//!
//! Trees usually come out of [`parse_stylesheet`](crate::parse_stylesheet), but
//! they can also be assembled by hand:
//!
//! ```rust
//! use stylesmith::{StyleNode, StyleTree};
//!
//! let tree = StyleTree::new()
//!     .root(
//!         StyleNode::new(".card")
//!             .declare("padding", "4px")
//!             .child(StyleNode::new("&:hover").declare("color", "blue")),
//!     );
//!
//! assert_eq!(tree.node_count(), 2);
//! ```
//!
//! # Module Structure
//!
//! - [`walk`]: the single pre-order traversal used by every pass
//! - [`fingerprint`]: structural content hashing for cache keys

pub mod fingerprint;
pub mod walk;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

pub use fingerprint::Fingerprint;
pub use walk::{Visit, Walk};

/// A single `property: value` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Declaration {
    /// CSS property name.
    pub property: String,
    /// Raw property value, emitted verbatim.
    pub value: String,
}

impl Declaration {
    /// Creates a declaration.
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property, self.value)
    }
}

/// A node of the style tree.
///
/// Children are owned, so a node can never appear among its own descendants.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyleNode {
    /// Selector fragment for this node.
    pub identifier: String,
    /// Declarations in source order.
    pub declarations: Vec<Declaration>,
    /// Nested nodes in source order.
    pub children: Vec<StyleNode>,
}

impl StyleNode {
    /// Creates a node with no declarations and no children.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            declarations: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Appends a declaration (builder style).
    pub fn declare(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.declarations.push(Declaration::new(property, value));
        self
    }

    /// Appends a child node (builder style).
    pub fn child(mut self, child: StyleNode) -> Self {
        self.children.push(child);
        self
    }

    /// Returns true if the node neither declares anything nor nests anything.
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty() && self.children.is_empty()
    }
}

/// A parsed style document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyleTree {
    /// Top-level nodes in source order. Roots sit at depth 1.
    pub roots: Vec<StyleNode>,
    /// File the tree was loaded from, if any. Not part of the fingerprint.
    pub source: Option<PathBuf>,
}

impl StyleTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tree from a list of roots.
    pub fn from_roots(roots: Vec<StyleNode>) -> Self {
        Self {
            roots,
            source: None,
        }
    }

    /// Appends a root node (builder style).
    pub fn root(mut self, node: StyleNode) -> Self {
        self.roots.push(node);
        self
    }

    /// Records the file this tree came from.
    pub fn with_source(mut self, path: impl AsRef<Path>) -> Self {
        self.source = Some(path.as_ref().to_path_buf());
        self
    }

    /// Returns true if the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Starts a pre-order traversal over every node.
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(self)
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.walk().count()
    }

    /// Looks up a node by its index path.
    pub fn node(&self, path: &NodePath) -> Option<&StyleNode> {
        let (first, rest) = path.indices().split_first()?;
        let mut node = self.roots.get(*first)?;
        for index in rest {
            node = node.children.get(*index)?;
        }
        Some(node)
    }

    /// Structural content hash of the tree.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of_tree(self)
    }
}

/// Index path from the roots to a node, e.g. `[0, 2]` for the third child
/// of the first root.
///
/// Paths order lexicographically, which coincides with pre-order traversal
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(transparent)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// The path of the `index`-th root.
    pub fn root(index: usize) -> Self {
        Self(vec![index])
    }

    /// The path of this node's `index`-th child.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = Vec::with_capacity(self.0.len() + 1);
        indices.extend_from_slice(&self.0);
        indices.push(index);
        Self(indices)
    }

    /// The path of the parent node, or `None` for roots.
    pub fn parent(&self) -> Option<NodePath> {
        match self.0.len() {
            0 | 1 => None,
            len => Some(Self(self.0[..len - 1].to_vec())),
        }
    }

    /// Nesting depth (roots are at depth 1).
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Raw indices.
    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", index)?;
        }
        Ok(())
    }
}
