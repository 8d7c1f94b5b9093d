//! Structural analysis of style trees.
//!
//! [`StyleAnalyzer`] is the entry point. It validates the tree and then
//! combines the individual passes:
//!
//! - [`detect`]: repeated declaration sets, whole-tree and per sibling group
//! - [`bem`]: class-name convention checks
//! - [`cluster`]: grouping of similar patterns by Jaccard similarity
//! - [`metrics`]: duplication, specificity and selector-cost figures
//!
//! Every pass is a pure function of the tree and the [`AnalysisOptions`], so
//! a report can be cached under the fingerprints of the two.

pub mod bem;
pub mod cluster;
pub mod detect;
pub mod metrics;

mod analyzer;
mod options;
mod report;
mod signature;

pub use analyzer::StyleAnalyzer;
pub use bem::{BemAnalyzer, BemViolationKind, NamingViolation};
pub use cluster::{Cluster, ClusterAnalyzer};
pub use detect::{
    merge_candidates, GeneralPatternDetector, HierarchicalPatternDetector, NodeRef,
    PatternCandidate, PatternDetector,
};
pub use metrics::{PerformanceMetrics, StyleMetrics};
pub use options::{
    AnalysisOptions, AnalysisOptionsBuilder, OptionsError, DEFAULT_MAX_DEPTH,
    DEFAULT_MINIMUM_COHESION, DEFAULT_MINIMUM_FREQUENCY,
};
pub use report::AnalysisReport;
pub use signature::{canonicalize, Signature};
