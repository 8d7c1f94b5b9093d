//! Error types for compilation, analysis and the pipeline.
//!
//! Validation findings are *not* errors: they are returned as data in
//! [`PipelineResult`](crate::PipelineResult). The types here describe
//! contract violations (compiling an invalid tree) and failures of the
//! analysis computation.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::stylesheet::StylesheetError;
use crate::validate::ValidationError;

/// Where in the input a failure can be attributed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// Source file, when the tree was loaded from one.
    pub file: Option<PathBuf>,
    /// 1-based line.
    pub line: Option<usize>,
    /// 1-based column.
    pub column: Option<usize>,
}

impl SourceLocation {
    /// A location naming only the file.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(path.into()),
            line: None,
            column: None,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}", file.display())?,
            None => f.write_str("<input>")?,
        }
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
            if let Some(column) = self.column {
                write!(f, ":{}", column)?;
            }
        }
        Ok(())
    }
}

fn at(location: &Option<SourceLocation>) -> String {
    location
        .as_ref()
        .map(|l| format!(" ({})", l))
        .unwrap_or_default()
}

/// The compiler was handed a tree that does not satisfy validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A node has an empty identifier.
    #[error("empty selector identifier at '{path}'{}", at(location))]
    EmptyIdentifier {
        /// Breadcrumb of the node.
        path: String,
        /// Source location, if known.
        location: Option<SourceLocation>,
    },

    /// A top-level identifier uses `&` with no parent to attach to.
    #[error("parent reference without a parent at '{path}'{}", at(location))]
    UnresolvedParentReference {
        /// Breadcrumb of the node.
        path: String,
        /// Source location, if known.
        location: Option<SourceLocation>,
    },

    /// Nested selector lists expand past
    /// [`MAX_SELECTOR_LIST`](crate::selector::MAX_SELECTOR_LIST) selectors.
    #[error("selector list too large at '{path}'{}", at(location))]
    SelectorListTooLarge {
        /// Breadcrumb of the node.
        path: String,
        /// Source location, if known.
        location: Option<SourceLocation>,
    },
}

impl CompileError {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::EmptyIdentifier { .. } => "compile/empty-identifier",
            CompileError::UnresolvedParentReference { .. } => "compile/unresolved-parent-reference",
            CompileError::SelectorListTooLarge { .. } => "compile/selector-list-too-large",
        }
    }

    /// Breadcrumb of the offending node.
    pub fn path(&self) -> &str {
        match self {
            CompileError::EmptyIdentifier { path, .. }
            | CompileError::UnresolvedParentReference { path, .. }
            | CompileError::SelectorListTooLarge { path, .. } => path,
        }
    }

    /// Source location, if known.
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            CompileError::EmptyIdentifier { location, .. }
            | CompileError::UnresolvedParentReference { location, .. }
            | CompileError::SelectorListTooLarge { location, .. } => location.as_ref(),
        }
    }
}

/// Failure of an analysis run.
///
/// `Clone` so that a single failed computation can be handed to every caller
/// that was waiting on it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// The tree has error-severity validation findings.
    #[error("cannot analyze a tree with {} validation error(s)", .0.len())]
    InvalidTree(Vec<ValidationError>),

    /// Compilation failed while computing metrics.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// The analysis computation panicked.
    #[error("analysis computation panicked: {0}")]
    ComputationPanicked(String),
}

impl AnalysisError {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::InvalidTree(_) => "analysis/invalid-tree",
            AnalysisError::Compile(err) => err.code(),
            AnalysisError::ComputationPanicked(_) => "analysis/panicked",
        }
    }
}

/// Pipeline-level failure, distinct from validation failure.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input could not be parsed into a tree.
    #[error(transparent)]
    Parse(#[from] StylesheetError),

    /// Compilation of a validated tree failed.
    #[error("compilation failed: {0}")]
    Compile(#[from] CompileError),

    /// Analysis of a validated tree failed.
    #[error("analysis failed: {0}")]
    Analysis(#[from] AnalysisError),
}

impl PipelineError {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::Parse(_) => "pipeline/parse",
            PipelineError::Compile(err) => err.code(),
            PipelineError::Analysis(err) => err.code(),
        }
    }
}
