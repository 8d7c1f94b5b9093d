//! Size, duplication and selector-cost metrics over compiled output.

use std::collections::BTreeSet;

use serde::Serialize;

use super::cluster::Cluster;
use crate::compile::CompiledStylesheet;
use crate::selector::SelectorProfile;
use crate::tree::NodePath;

/// Declaration and selector statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StyleMetrics {
    /// Declarations across all compiled rules.
    pub total_declarations: usize,
    /// Declarations of rules whose source node belongs to some cluster.
    pub covered_declarations: usize,
    /// `covered_declarations / total_declarations`, 0 when empty.
    pub duplication_ratio: f64,
    /// Compiled selectors.
    pub selector_count: usize,
    /// Selectors left if every cluster were extracted into one shared rule.
    pub estimated_selector_count: usize,
    /// Mean specificity weight (`100·ids + 10·classes + types`).
    pub average_specificity: f64,
    /// Highest specificity weight.
    pub max_specificity: u32,
}

impl StyleMetrics {
    /// Computes metrics for a compiled stylesheet and its clusters.
    pub fn compute(compiled: &CompiledStylesheet, clusters: &[Cluster]) -> Self {
        let rules = compiled.rules();
        if rules.is_empty() {
            return Self::default();
        }

        let clustered: BTreeSet<&NodePath> = clusters
            .iter()
            .flat_map(|c| c.occurrences())
            .map(|o| &o.path)
            .collect();

        let total_declarations = compiled.declaration_count();
        let covered_declarations = rules
            .iter()
            .filter(|r| clustered.contains(&r.source))
            .map(|r| r.declarations.len())
            .sum();

        let sources: BTreeSet<&NodePath> = rules.iter().map(|r| &r.source).collect();

        // Each cluster collapses its compiled nodes into one rule
        let saved: usize = clusters
            .iter()
            .map(|c| {
                c.occurrences()
                    .iter()
                    .filter(|o| sources.contains(&o.path))
                    .count()
                    .saturating_sub(1)
            })
            .sum();

        let weights: Vec<u32> = rules
            .iter()
            .map(|r| SelectorProfile::of(&r.selector).specificity.weight())
            .collect();

        Self {
            total_declarations,
            covered_declarations,
            duplication_ratio: ratio(covered_declarations, total_declarations),
            selector_count: rules.len(),
            estimated_selector_count: rules.len().saturating_sub(saved),
            average_specificity: weights.iter().map(|&w| f64::from(w)).sum::<f64>()
                / weights.len() as f64,
            max_specificity: weights.iter().copied().max().unwrap_or(0),
        }
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Rough matching-cost indicators for compiled selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PerformanceMetrics {
    /// Sum over rules of compound selectors × declarations (at least 1).
    pub estimated_render_cost: usize,
    /// Most compound selectors in one selector.
    pub longest_selector_chain: usize,
    /// Universal (`*`) selectors across all rules.
    pub universal_selectors: usize,
}

impl PerformanceMetrics {
    /// Computes performance indicators for a compiled stylesheet.
    pub fn compute(compiled: &CompiledStylesheet) -> Self {
        compiled
            .rules()
            .iter()
            .fold(Self::default(), |mut acc, rule| {
                let profile = SelectorProfile::of(&rule.selector);
                acc.estimated_render_cost += profile.compounds * rule.declarations.len().max(1);
                acc.longest_selector_chain = acc.longest_selector_chain.max(profile.compounds);
                acc.universal_selectors += profile.universal;
                acc
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::detect::{GeneralPatternDetector, PatternDetector};
    use crate::analysis::{AnalysisOptions, ClusterAnalyzer};
    use crate::compile::Compiler;
    use crate::tree::{StyleNode, StyleTree};

    fn metrics_for(tree: &StyleTree) -> (StyleMetrics, PerformanceMetrics) {
        let options = AnalysisOptions::default();
        let candidates = GeneralPatternDetector.detect(tree, &options);
        let clusters = ClusterAnalyzer::new().cluster(&candidates, &options);
        let compiled = Compiler::new().compile(tree).unwrap();
        (
            StyleMetrics::compute(&compiled, &clusters),
            PerformanceMetrics::compute(&compiled),
        )
    }

    #[test]
    fn test_empty_input_is_zero() {
        let (style, perf) = metrics_for(&StyleTree::new());
        assert_eq!(style, StyleMetrics::default());
        assert_eq!(perf, PerformanceMetrics::default());
    }

    #[test]
    fn test_duplication_and_estimate() {
        let tree = StyleTree::new()
            .root(StyleNode::new(".a").declare("color", "red").declare("margin", "0"))
            .root(StyleNode::new(".b").declare("margin", "0").declare("color", "red"))
            .root(StyleNode::new(".c").declare("display", "block"))
            .root(StyleNode::new(".d").declare("margin", "0").declare("color", "red"));
        let (style, _) = metrics_for(&tree);
        assert_eq!(style.total_declarations, 7);
        assert_eq!(style.covered_declarations, 6);
        assert!((style.duplication_ratio - 6.0 / 7.0).abs() < 1e-9);
        assert_eq!(style.selector_count, 4);
        assert_eq!(style.estimated_selector_count, 2);
    }

    #[test]
    fn test_estimate_counts_only_compiled_occurrences() {
        let tree = StyleTree::new()
            .root(StyleNode::new(".a").declare("color", "red"))
            .root(StyleNode::new(".b").declare("color", "red"))
            .root(StyleNode::new(".c").declare("color", "red"));
        let options = AnalysisOptions::default();
        let candidates = GeneralPatternDetector.detect(&tree, &options);
        let clusters = ClusterAnalyzer::new().cluster(&candidates, &options);

        // A sheet holding only the first rule saves nothing
        let partial = StyleTree::new().root(StyleNode::new(".a").declare("color", "red"));
        let compiled = Compiler::new().compile(&partial).unwrap();
        let style = StyleMetrics::compute(&compiled, &clusters);
        assert_eq!(style.selector_count, 1);
        assert_eq!(style.estimated_selector_count, 1);
        assert_eq!(style.covered_declarations, 1);
    }

    #[test]
    fn test_specificity_stats() {
        let tree = StyleTree::new()
            .root(StyleNode::new("#main").declare("margin", "0"))
            .root(StyleNode::new("div").declare("margin", "1px"));
        let (style, _) = metrics_for(&tree);
        assert_eq!(style.max_specificity, 100);
        assert_eq!(style.average_specificity, 50.5);
        assert_eq!(style.covered_declarations, 0);
    }

    #[test]
    fn test_performance_metrics() {
        let tree = StyleTree::new()
            .root(
                StyleNode::new(".nav")
                    .declare("margin", "0")
                    .declare("padding", "0")
                    .child(StyleNode::new("* > li").declare("color", "red")),
            );
        let (_, perf) = metrics_for(&tree);
        // .nav: 1 compound × 2 declarations; .nav * > li: 3 compounds × 1
        assert_eq!(perf.estimated_render_cost, 5);
        assert_eq!(perf.longest_selector_chain, 3);
        assert_eq!(perf.universal_selectors, 1);
    }
}
