//! Stylesmith - Compile nested YAML style definitions to CSS and analyze them.
//!
//! Style definitions are written as nested YAML mappings. Stylesmith turns
//! them into flat CSS rules and, alongside, looks for structural problems:
//!
//! - Declaration sets repeated across the document (pattern candidates)
//! - Groups of near-identical patterns worth extracting (clusters)
//! - Class names that break the BEM convention
//! - Duplication, specificity and selector-cost metrics
//!
//! # Quick Start
//!
//! ```rust
//! use stylesmith::StylePipeline;
//!
//! let yaml = r#"
//! .card:
//!   padding: 4px
//!   "&:hover":
//!     color: blue
//! .button:
//!   padding: 4px
//! "#;
//!
//! let pipeline = StylePipeline::builder().build();
//! let result = pipeline.run(yaml).unwrap();
//!
//! let css = result.compiled.as_ref().unwrap().to_css();
//! assert!(css.contains(".card:hover {"));
//!
//! let report = result.analysis.unwrap();
//! assert_eq!(report.candidates.len(), 1);
//! ```
//!
//! # Pipeline
//!
//! ```text
//! YAML ──parse──▶ StyleTree ──validate──▶ errors? ──yes──▶ findings only
//!                                            │
//!                                            no
//!                                            ├──▶ Compiler ──▶ CompiledStylesheet
//!                                            └──▶ AnalysisCache ─▶ StyleAnalyzer ─▶ AnalysisReport
//! ```
//!
//! Compilation and analysis of a valid tree run in parallel. Analysis results
//! are cached by content, and concurrent requests for the same tree and
//! options are computed once.
//!
//! # Module Structure
//!
//! - [`tree`]: the style tree, its traversal and fingerprints
//! - [`stylesheet`]: YAML loading
//! - [`selector`]: selector qualification and specificity
//! - [`validate`]: structural checks
//! - [`compile`]: CSS generation
//! - [`analysis`]: detectors, naming checks, clustering, metrics
//! - [`cache`]: the single-flight analysis cache
//! - [`pipeline`]: orchestration

pub mod analysis;
pub mod cache;
pub mod compile;
pub mod pipeline;
pub mod selector;
pub mod stylesheet;
pub mod tree;
pub mod validate;

mod error;

// Re-export public API
pub use analysis::{
    AnalysisOptions, AnalysisOptionsBuilder, AnalysisReport, BemAnalyzer, BemViolationKind,
    Cluster, ClusterAnalyzer, GeneralPatternDetector, HierarchicalPatternDetector,
    NamingViolation, NodeRef, OptionsError, PatternCandidate, PatternDetector,
    PerformanceMetrics, Signature, StyleAnalyzer, StyleMetrics,
};
pub use cache::{AnalysisCache, CacheKey, CacheStats};
pub use compile::{CompiledRule, CompiledStylesheet, Compiler};
pub use error::{AnalysisError, CompileError, PipelineError, SourceLocation};
pub use pipeline::{PipelineResult, StylePipeline, StylePipelineBuilder};
pub use stylesheet::{
    parse_stylesheet, parse_stylesheet_file, StyleParser, StylesheetError, YamlStyleParser,
};
pub use tree::{Declaration, Fingerprint, NodePath, StyleNode, StyleTree};
pub use validate::{Severity, ValidationError, Validator};
