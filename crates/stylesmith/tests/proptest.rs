//! Property-based tests for stylesmith using proptest.

use std::collections::HashSet;

use proptest::prelude::*;
use stylesmith::{
    AnalysisOptions, ClusterAnalyzer, Compiler, Declaration, GeneralPatternDetector,
    HierarchicalPatternDetector, PatternDetector, StyleAnalyzer, StyleNode, StyleTree,
};

// ============================================================================
// Test helpers
// ============================================================================

// Small vocabularies so that generated trees actually repeat themselves
fn declaration_strategy() -> impl Strategy<Value = (String, String)> {
    (
        prop::sample::select(vec!["color", "margin", "padding", "display"]),
        prop::sample::select(vec!["0", "red", "4px", "block"]),
    )
        .prop_map(|(p, v)| (p.to_string(), v.to_string()))
}

fn node_strategy() -> impl Strategy<Value = StyleNode> {
    let leaf = prop::collection::vec(declaration_strategy(), 1..4).prop_map(|decls| {
        decls
            .into_iter()
            .fold(StyleNode::new(".leaf"), |node, (p, v)| node.declare(p, v))
    });
    leaf.prop_recursive(3, 24, 4, |inner| {
        (
            prop::collection::vec(declaration_strategy(), 0..3),
            prop::collection::vec(inner, 1..4),
        )
            .prop_map(|(decls, children)| {
                let node = decls
                    .into_iter()
                    .fold(StyleNode::new(".group"), |node, (p, v)| node.declare(p, v));
                children.into_iter().fold(node, StyleNode::child)
            })
    })
}

/// Gives every sibling a distinct identifier so the tree validates.
fn number_identifiers(nodes: &mut [StyleNode], prefix: &str) {
    for (i, node) in nodes.iter_mut().enumerate() {
        let identifier = format!("{}-{}", prefix, i);
        number_identifiers(&mut node.children, &identifier);
        node.identifier = format!(".{}", identifier);
    }
}

fn tree_strategy() -> impl Strategy<Value = StyleTree> {
    prop::collection::vec(node_strategy(), 1..5).prop_map(|mut roots| {
        number_identifiers(&mut roots, "n");
        StyleTree::from_roots(roots)
    })
}

/// Jaccard index over `(property, value)` pairs.
fn declaration_similarity(a: &[Declaration], b: &[Declaration]) -> f64 {
    let a: HashSet<(&str, &str)> = a.iter().map(|d| (d.property.as_str(), d.value.as_str())).collect();
    let b: HashSet<(&str, &str)> = b.iter().map(|d| (d.property.as_str(), d.value.as_str())).collect();
    let union = a.union(&b).count();
    if union == 0 {
        return 1.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

fn options_strategy() -> impl Strategy<Value = AnalysisOptions> {
    (0.0f64..=1.0, 1usize..4, 1usize..5).prop_map(|(cohesion, frequency, depth)| {
        AnalysisOptions::builder()
            .minimum_cohesion(cohesion)
            .minimum_frequency(frequency)
            .max_depth(depth)
            .build()
            .unwrap()
    })
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Compiling or analyzing the same tree twice gives identical output.
    #[test]
    fn output_is_deterministic(tree in tree_strategy(), options in options_strategy()) {
        let first = Compiler::new().compile(&tree).unwrap();
        let second = Compiler::new().compile(&tree.clone()).unwrap();
        prop_assert_eq!(first.to_css(), second.to_css());

        let analyzer = StyleAnalyzer::new(options);
        prop_assert_eq!(analyzer.analyze(&tree).unwrap(), analyzer.analyze(&tree).unwrap());
    }

    /// No detector reports a pattern below the frequency floor.
    #[test]
    fn candidates_respect_frequency_floor(tree in tree_strategy(), options in options_strategy()) {
        let detectors: [&dyn PatternDetector; 2] = [&GeneralPatternDetector, &HierarchicalPatternDetector];
        for detector in detectors {
            for candidate in detector.detect(&tree, &options) {
                prop_assert!(candidate.frequency >= options.minimum_frequency());
                prop_assert_eq!(candidate.frequency, candidate.occurrences.len());
            }
        }
        let report = StyleAnalyzer::new(options).analyze(&tree).unwrap();
        for candidate in &report.candidates {
            prop_assert!(candidate.frequency >= options.minimum_frequency());
        }
    }

    /// Candidates come out most frequent first.
    #[test]
    fn candidates_sorted_by_frequency(tree in tree_strategy(), options in options_strategy()) {
        let found = GeneralPatternDetector.detect(&tree, &options);
        for pair in found.windows(2) {
            prop_assert!(pair[0].frequency >= pair[1].frequency);
        }
    }

    /// Every pair of members in a cluster is at least as similar as required,
    /// and the reported cohesion is the weakest of those pairs.
    #[test]
    fn clusters_meet_minimum_cohesion(tree in tree_strategy(), options in options_strategy()) {
        let candidates = GeneralPatternDetector.detect(&tree, &options);
        let clusters = ClusterAnalyzer::new().cluster(&candidates, &options);
        for cluster in &clusters {
            let mut weakest = 1.0_f64;
            for (i, a) in cluster.members.iter().enumerate() {
                for b in &cluster.members[i + 1..] {
                    let similarity = declaration_similarity(&a.declarations, &b.declarations);
                    prop_assert!(
                        similarity >= options.minimum_cohesion(),
                        "members {} and {} are only {} similar",
                        a.signature,
                        b.signature,
                        similarity
                    );
                    weakest = weakest.min(similarity);
                }
            }
            prop_assert_eq!(cluster.cohesion, weakest);
            prop_assert!(cluster
                .members
                .iter()
                .any(|m| m.signature == cluster.representative));
        }
        for pair in clusters.windows(2) {
            prop_assert!(pair[0].cohesion >= pair[1].cohesion);
        }
    }

    /// Hierarchical occurrences never sit below the depth ceiling.
    #[test]
    fn hierarchical_respects_max_depth(tree in tree_strategy(), options in options_strategy()) {
        for candidate in HierarchicalPatternDetector.detect(&tree, &options) {
            for occurrence in &candidate.occurrences {
                prop_assert!(occurrence.path.depth() <= options.max_depth());
                prop_assert_eq!(occurrence.path.parent(), candidate.occurrences[0].path.parent());
            }
        }
    }

    /// Fingerprints depend on content only.
    #[test]
    fn fingerprint_ignores_source(tree in tree_strategy()) {
        let located = tree.clone().with_source("somewhere.yaml");
        prop_assert_eq!(tree.fingerprint(), located.fingerprint());
    }
}
