//! Repeated declaration-set detection.
//!
//! Both detectors group nodes by the [`Signature`] of their declarations and
//! report every group that occurs at least `minimum_frequency` times. They
//! differ only in scope:
//!
//! - [`GeneralPatternDetector`] looks at every node of the tree as one pool.
//! - [`HierarchicalPatternDetector`] stops at `max_depth` and only compares
//!   siblings (nodes sharing a parent; the roots are one sibling group). It
//!   finds the local repetition that can be folded into a shared parent rule.
//!
//! Candidates are ordered by frequency, most frequent first, with ties going
//! to whichever pattern appears first in the document.

use std::collections::HashMap;

use serde::Serialize;

use super::options::AnalysisOptions;
use super::signature::{canonicalize, Signature};
use crate::selector::qualify_lineage;
use crate::tree::{Declaration, NodePath, StyleTree, Visit};

/// A node that carries a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRef {
    /// Structural path of the node.
    pub path: NodePath,
    /// Qualified selector of the node.
    pub selector: String,
}

/// A declaration set that occurs more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternCandidate {
    /// Canonical signature of [`declarations`](Self::declarations).
    pub signature: Signature,
    /// The shared declarations, canonically ordered.
    pub declarations: Vec<Declaration>,
    /// Nodes carrying the declarations, in traversal order.
    pub occurrences: Vec<NodeRef>,
    /// How many times the pattern was seen.
    pub frequency: usize,
}

impl PatternCandidate {
    fn first_occurrence(&self) -> Option<&NodePath> {
        self.occurrences.iter().map(|o| &o.path).min()
    }
}

/// A strategy for finding repeated declaration sets.
pub trait PatternDetector: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Finds candidates in a tree.
    fn detect(&self, tree: &StyleTree, options: &AnalysisOptions) -> Vec<PatternCandidate>;
}

/// Whole-tree detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneralPatternDetector;

impl PatternDetector for GeneralPatternDetector {
    fn name(&self) -> &'static str {
        "general"
    }

    fn detect(&self, tree: &StyleTree, options: &AnalysisOptions) -> Vec<PatternCandidate> {
        let candidates = group_by_signature(tree.walk(), |_| None, options);
        tracing::debug!(detector = self.name(), candidates = candidates.len(), "detection done");
        candidates
    }
}

/// Depth-limited, per-sibling-group detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct HierarchicalPatternDetector;

impl PatternDetector for HierarchicalPatternDetector {
    fn name(&self) -> &'static str {
        "hierarchical"
    }

    fn detect(&self, tree: &StyleTree, options: &AnalysisOptions) -> Vec<PatternCandidate> {
        let walk = tree.walk().max_depth(options.max_depth());
        let candidates = group_by_signature(walk, |visit| visit.path.parent(), options);
        tracing::debug!(detector = self.name(), candidates = candidates.len(), "detection done");
        candidates
    }
}

struct Group {
    signature: Signature,
    declarations: Vec<Declaration>,
    occurrences: Vec<NodeRef>,
}

fn group_by_signature<'a>(
    walk: impl Iterator<Item = Visit<'a>>,
    scope: impl Fn(&Visit<'a>) -> Option<NodePath>,
    options: &AnalysisOptions,
) -> Vec<PatternCandidate> {
    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<(Option<NodePath>, Signature), usize> = HashMap::new();

    for visit in walk {
        if visit.node.declarations.is_empty() {
            continue;
        }
        let declarations = canonicalize(&visit.node.declarations);
        let signature = Signature::of_canonical(&declarations);
        let occurrence = NodeRef {
            selector: qualify_lineage(&visit.lineage).unwrap_or_else(|_| visit.breadcrumb()),
            path: visit.path.clone(),
        };

        let key = (scope(&visit), signature.clone());
        match index.get(&key) {
            Some(&i) => groups[i].occurrences.push(occurrence),
            None => {
                index.insert(key, groups.len());
                groups.push(Group {
                    signature,
                    declarations,
                    occurrences: vec![occurrence],
                });
            }
        }
    }

    let mut candidates: Vec<PatternCandidate> = groups
        .into_iter()
        .filter(|g| g.occurrences.len() >= options.minimum_frequency())
        .map(|g| PatternCandidate {
            frequency: g.occurrences.len(),
            signature: g.signature,
            declarations: g.declarations,
            occurrences: g.occurrences,
        })
        .collect();
    sort_candidates(&mut candidates);
    candidates
}

/// Frequency descending, then first occurrence in traversal order.
fn sort_candidates(candidates: &mut [PatternCandidate]) {
    candidates.sort_by(|a, b| {
        b.frequency
            .cmp(&a.frequency)
            .then_with(|| a.first_occurrence().cmp(&b.first_occurrence()))
    });
}

/// Merges the outputs of several detectors into one list.
///
/// Candidates with the same signature collapse into one: frequencies are
/// summed and occurrences are unioned (deduplicated by path, first-seen
/// order). The result is filtered by the frequency floor again and re-sorted.
pub fn merge_candidates<I>(lists: I, options: &AnalysisOptions) -> Vec<PatternCandidate>
where
    I: IntoIterator<Item = Vec<PatternCandidate>>,
{
    let mut merged: Vec<PatternCandidate> = Vec::new();
    let mut index: HashMap<Signature, usize> = HashMap::new();

    for candidate in lists.into_iter().flatten() {
        match index.get(&candidate.signature) {
            Some(&i) => {
                let target = &mut merged[i];
                target.frequency += candidate.frequency;
                for occurrence in candidate.occurrences {
                    if !target.occurrences.iter().any(|o| o.path == occurrence.path) {
                        target.occurrences.push(occurrence);
                    }
                }
            }
            None => {
                index.insert(candidate.signature.clone(), merged.len());
                merged.push(candidate);
            }
        }
    }

    merged.retain(|c| c.frequency >= options.minimum_frequency());
    sort_candidates(&mut merged);
    merged
}
