use super::bem::BemAnalyzer;
use super::cluster::ClusterAnalyzer;
use super::detect::{
    merge_candidates, GeneralPatternDetector, HierarchicalPatternDetector, PatternDetector,
};
use super::metrics::{PerformanceMetrics, StyleMetrics};
use super::options::AnalysisOptions;
use super::report::AnalysisReport;
use crate::compile::Compiler;
use crate::error::AnalysisError;
use crate::tree::StyleTree;
use crate::validate::{has_errors, Severity, ValidationError, Validator};

/// Runs every analysis pass over a tree and aggregates the results.
///
/// The detectors and the naming analyzer are independent and run in
/// parallel; clustering and metrics run once they are done.
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleAnalyzer {
    options: AnalysisOptions,
}

impl StyleAnalyzer {
    /// Creates an analyzer with the given options.
    pub fn new(options: AnalysisOptions) -> Self {
        Self { options }
    }

    /// The options in use.
    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Analyzes a tree.
    ///
    /// The tree is validated and compiled here even when the caller has
    /// already done so: the report must be computable from the tree alone,
    /// since it is what the cache stores. Callers holding validation results
    /// can skip the first step with [`analyze_validated`](Self::analyze_validated).
    ///
    /// # Errors
    ///
    /// [`AnalysisError::InvalidTree`] if validation reports errors, carrying
    /// just the error-severity findings.
    pub fn analyze(&self, tree: &StyleTree) -> Result<AnalysisReport, AnalysisError> {
        let findings = Validator::new().validate(tree);
        if has_errors(&findings) {
            let errors = findings.into_iter().filter(|f| f.is_error()).collect();
            return Err(AnalysisError::InvalidTree(errors));
        }
        self.analyze_validated(tree, findings)
    }

    /// Analyzes a tree the caller has already validated, carrying its
    /// warning findings into the report.
    ///
    /// Error-severity entries in `findings` are dropped; the tree is assumed
    /// to have passed validation.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::Compile`] if the tree was not actually valid.
    pub fn analyze_validated(
        &self,
        tree: &StyleTree,
        findings: Vec<ValidationError>,
    ) -> Result<AnalysisReport, AnalysisError> {
        let warnings: Vec<_> = findings
            .into_iter()
            .filter(|f| f.severity == Severity::Warning)
            .collect();

        let options = &self.options;
        let (general, (hierarchical, naming_violations)) = rayon::join(
            || GeneralPatternDetector.detect(tree, options),
            || {
                rayon::join(
                    || HierarchicalPatternDetector.detect(tree, options),
                    || BemAnalyzer::new().analyze(tree),
                )
            },
        );

        let candidates = merge_candidates([general, hierarchical], options);
        let clusters = ClusterAnalyzer::new().cluster(&candidates, options);
        let compiled = Compiler::new().compile(tree)?;
        let metrics = StyleMetrics::compute(&compiled, &clusters);
        let performance = PerformanceMetrics::compute(&compiled);

        tracing::debug!(
            warnings = warnings.len(),
            candidates = candidates.len(),
            clusters = clusters.len(),
            violations = naming_violations.len(),
            "analysis complete"
        );

        Ok(AnalysisReport {
            warnings,
            candidates,
            clusters,
            naming_violations,
            metrics,
            performance,
        })
    }
}
