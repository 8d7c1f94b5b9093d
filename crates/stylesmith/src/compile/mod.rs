//! Lowering a validated style tree to flat CSS rules.
//!
//! The [`Compiler`] walks the tree depth-first and emits one
//! [`CompiledRule`] per node that has declarations. Each rule's selector is
//! the node's fully-qualified selector (see [`crate::selector`] for the
//! combination rule). Nodes without declarations emit nothing but still
//! qualify the selectors of their descendants.
//!
//! Output order is traversal order. Recompiling an unchanged tree yields
//! byte-identical output, and [`CompiledStylesheet::to_css`] preserves that
//! order exactly.

mod css;

use serde::Serialize;

use crate::error::{CompileError, SourceLocation};
use crate::selector::{qualify_lineage, QualifyError};
use crate::tree::{Declaration, NodePath, StyleTree};

/// One flattened rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledRule {
    /// Fully-qualified selector.
    pub selector: String,
    /// Declarations in source order.
    pub declarations: Vec<Declaration>,
    /// Node the rule was compiled from.
    pub source: NodePath,
}

/// Ordered output of the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct CompiledStylesheet {
    rules: Vec<CompiledRule>,
}

impl CompiledStylesheet {
    /// Rules in output order.
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// Number of rules (and therefore selectors).
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if nothing was emitted.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Total declarations across all rules.
    pub fn declaration_count(&self) -> usize {
        self.rules.iter().map(|r| r.declarations.len()).sum()
    }

    /// Finds the rule compiled from a given node.
    pub fn rule_for(&self, source: &NodePath) -> Option<&CompiledRule> {
        self.rules.iter().find(|r| &r.source == source)
    }
}

impl IntoIterator for CompiledStylesheet {
    type Item = CompiledRule;
    type IntoIter = std::vec::IntoIter<CompiledRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.into_iter()
    }
}

/// Compiles style trees to CSS rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compiler;

impl Compiler {
    /// Creates a compiler.
    pub fn new() -> Self {
        Self
    }

    /// Compiles a validated tree.
    ///
    /// # Errors
    ///
    /// Fails only on trees the [`Validator`](crate::Validator) would reject
    /// (empty identifiers, `&` at the top level, oversized selector lists). That is a caller contract
    /// violation, not a condition to recover from.
    pub fn compile(&self, tree: &StyleTree) -> Result<CompiledStylesheet, CompileError> {
        let location = tree.source.as_ref().map(SourceLocation::file);
        let mut rules = Vec::new();

        for visit in tree.walk() {
            let selector = qualify_lineage(&visit.lineage).map_err(|err| {
                let path = visit.breadcrumb();
                let location = location.clone();
                match err {
                    QualifyError::EmptyIdentifier => CompileError::EmptyIdentifier { path, location },
                    QualifyError::ParentReferenceAtRoot => {
                        CompileError::UnresolvedParentReference { path, location }
                    }
                    QualifyError::TooManySelectors => {
                        CompileError::SelectorListTooLarge { path, location }
                    }
                }
            })?;

            if visit.node.declarations.is_empty() {
                continue;
            }

            rules.push(CompiledRule {
                selector,
                declarations: visit.node.declarations.clone(),
                source: visit.path,
            });
        }

        tracing::debug!(rules = rules.len(), "compiled stylesheet");
        Ok(CompiledStylesheet { rules })
    }
}
