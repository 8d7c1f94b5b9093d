//! End-to-end orchestration: parse, validate, then compile and analyze.
//!
//! ```rust
//! use stylesmith::StylePipeline;
//!
//! let pipeline = StylePipeline::builder().build();
//! let result = pipeline.run(".x:\n  color: red\n").unwrap();
//!
//! assert!(result.is_success());
//! assert_eq!(result.compiled.unwrap().to_css(), ".x {\n  color: red;\n}\n");
//! ```
//!
//! A tree with error-severity findings is never compiled or analyzed; the
//! findings come back as data in [`PipelineResult::validation`]. Compilation
//! and the (cached) analysis of a valid tree run in parallel.

use std::sync::Arc;

use crate::analysis::{AnalysisOptions, AnalysisReport, StyleAnalyzer};
use crate::cache::{AnalysisCache, DEFAULT_CAPACITY};
use crate::compile::{CompiledStylesheet, Compiler};
use crate::error::PipelineError;
use crate::stylesheet::{StyleParser, YamlStyleParser};
use crate::tree::StyleTree;
use crate::validate::{has_errors, ValidationError, Validator};

/// Outcome of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Every validation finding, in traversal order.
    pub validation: Vec<ValidationError>,
    /// Compiled output; `None` when validation reported errors.
    pub compiled: Option<CompiledStylesheet>,
    /// Analysis report; `None` when validation reported errors.
    pub analysis: Option<Arc<AnalysisReport>>,
}

impl PipelineResult {
    /// True when the tree was valid and both stages produced output.
    pub fn is_success(&self) -> bool {
        !has_errors(&self.validation) && self.compiled.is_some() && self.analysis.is_some()
    }

    /// Error-severity findings.
    pub fn errors(&self) -> impl Iterator<Item = &ValidationError> {
        self.validation.iter().filter(|f| f.is_error())
    }

    /// Warning-severity findings.
    pub fn warnings(&self) -> impl Iterator<Item = &ValidationError> {
        self.validation.iter().filter(|f| !f.is_error())
    }
}

/// Parses, validates, compiles and analyzes style documents.
pub struct StylePipeline {
    parser: Box<dyn StyleParser>,
    options: AnalysisOptions,
    cache: Arc<AnalysisCache>,
}

impl std::fmt::Debug for StylePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StylePipeline")
            .field("options", &self.options)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl Default for StylePipeline {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl StylePipeline {
    /// Starts a builder with the YAML parser, default options and a fresh
    /// cache.
    pub fn builder() -> StylePipelineBuilder {
        StylePipelineBuilder::default()
    }

    /// The analysis options.
    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// The shared analysis cache.
    pub fn cache(&self) -> &Arc<AnalysisCache> {
        &self.cache
    }

    /// Parses `input` and runs the pipeline on the result.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Parse`] if the input is not a valid document, or a
    /// compile/analysis failure on a tree that passed validation. Validation
    /// findings are never errors.
    pub fn run(&self, input: &str) -> Result<PipelineResult, PipelineError> {
        let tree = self.parser.parse(input)?;
        self.run_tree(tree)
    }

    /// Runs the pipeline on an already-built tree.
    pub fn run_tree(&self, tree: StyleTree) -> Result<PipelineResult, PipelineError> {
        let validation = Validator::new().validate(&tree);
        if has_errors(&validation) {
            tracing::debug!(
                findings = validation.len(),
                "validation failed; skipping compile and analysis"
            );
            return Ok(PipelineResult {
                validation,
                compiled: None,
                analysis: None,
            });
        }

        let analyzer = StyleAnalyzer::new(self.options);
        let mut compiled = Ok(CompiledStylesheet::default());
        // The cache may block this thread on another caller's computation, so
        // the lookup stays on the calling thread rather than a pool worker.
        let analysis = rayon::in_place_scope(|scope| {
            scope.spawn(|_| compiled = Compiler::new().compile(&tree));
            self.cache.get_or_compute(&tree, &self.options, || {
                analyzer.analyze_validated(&tree, validation.clone())
            })
        });

        let result = PipelineResult {
            validation,
            compiled: Some(compiled?),
            analysis: Some(analysis?),
        };
        tracing::debug!(
            warnings = result.validation.len(),
            "pipeline run complete"
        );
        Ok(result)
    }
}

/// Builder for [`StylePipeline`].
#[derive(Default)]
pub struct StylePipelineBuilder {
    parser: Option<Box<dyn StyleParser>>,
    options: Option<AnalysisOptions>,
    cache: Option<Arc<AnalysisCache>>,
    cache_capacity: Option<usize>,
}

impl StylePipelineBuilder {
    /// Set the analysis options.
    pub fn options(mut self, options: AnalysisOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Share an existing cache. Takes precedence over
    /// [`cache_capacity`](Self::cache_capacity).
    pub fn cache(mut self, cache: Arc<AnalysisCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Capacity of the cache created by [`build`](Self::build).
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = Some(capacity);
        self
    }

    /// Replace the document parser.
    pub fn parser(mut self, parser: impl StyleParser + 'static) -> Self {
        self.parser = Some(Box::new(parser));
        self
    }

    /// Build the pipeline.
    pub fn build(self) -> StylePipeline {
        let capacity = self.cache_capacity.unwrap_or(DEFAULT_CAPACITY);
        StylePipeline {
            parser: self.parser.unwrap_or_else(|| Box::new(YamlStyleParser)),
            options: self.options.unwrap_or_default(),
            cache: self
                .cache
                .unwrap_or_else(|| Arc::new(AnalysisCache::new(capacity))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stylesheet::StylesheetError;
    use crate::tree::StyleNode;

    struct FixedParser(StyleTree);

    impl StyleParser for FixedParser {
        fn parse(&self, _text: &str) -> Result<StyleTree, StylesheetError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_errors_gate_compile_and_analysis() {
        let pipeline = StylePipeline::default();
        let result = pipeline.run(".a:\n  color: red\n\"&:hover\":\n  color: blue\n").unwrap();
        assert!(!result.is_success());
        assert!(result.compiled.is_none());
        assert!(result.analysis.is_none());
        assert_eq!(result.errors().count(), 1);
        assert!(pipeline.cache().is_empty());
    }

    #[test]
    fn test_warnings_do_not_gate() {
        let pipeline = StylePipeline::default();
        let result = pipeline.run(".a:\n  color: red\n.b: {}\n").unwrap();
        assert!(result.is_success());
        assert_eq!(result.warnings().count(), 1);
        let analysis = result.analysis.unwrap();
        assert_eq!(analysis.warnings.len(), 1);
    }

    #[test]
    fn test_parse_error_is_pipeline_error() {
        let err = StylePipeline::default().run("- just\n- a list\n").unwrap_err();
        assert!(matches!(err, PipelineError::Parse(_)));
        assert_eq!(err.code(), "pipeline/parse");
    }

    #[test]
    fn test_custom_parser_and_shared_cache() {
        let cache = Arc::new(AnalysisCache::new(8));
        let tree = StyleTree::new().root(StyleNode::new(".x").declare("color", "red"));
        let pipeline = StylePipeline::builder()
            .parser(FixedParser(tree))
            .cache(Arc::clone(&cache))
            .build();

        pipeline.run("ignored").unwrap();
        pipeline.run("also ignored").unwrap();
        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_builder_options_and_capacity() {
        let options = AnalysisOptions::builder().max_depth(5).build().unwrap();
        let pipeline = StylePipeline::builder()
            .options(options)
            .cache_capacity(3)
            .build();
        assert_eq!(pipeline.options().max_depth(), 5);
        assert_eq!(pipeline.cache().capacity(), 3);
    }
}
