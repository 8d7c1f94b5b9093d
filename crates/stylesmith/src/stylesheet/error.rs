//! Error types for stylesheet loading.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for stylesheet loading failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StylesheetError {
    /// YAML parse error.
    #[error("failed to parse stylesheet{}: {message}", describe_location(path, *line, *column))]
    Parse {
        /// Optional source file path.
        path: Option<PathBuf>,
        /// Error message from the YAML parser.
        message: String,
        /// 1-based line, when the parser reports one.
        line: Option<usize>,
        /// 1-based column, when the parser reports one.
        column: Option<usize>,
    },

    /// The document parsed but does not have the shape of a style tree.
    #[error("invalid definition for '{selector}'{}: {message}", describe_location(path, None, None))]
    InvalidDefinition {
        /// Breadcrumb of the offending node (or the key that could not be read).
        selector: String,
        /// Description of what was wrong.
        message: String,
        /// Optional source file path.
        path: Option<PathBuf>,
    },

    /// The stylesheet file could not be read.
    #[error("failed to load stylesheet {}: {message}", path.display())]
    Load {
        /// Path that failed to load.
        path: PathBuf,
        /// Error message from the file system.
        message: String,
    },
}

impl StylesheetError {
    pub(crate) fn from_yaml(err: &serde_yaml::Error) -> Self {
        let location = err.location();
        StylesheetError::Parse {
            path: None,
            message: err.to_string(),
            line: location.as_ref().map(|l| l.line()),
            column: location.as_ref().map(|l| l.column()),
        }
    }

    pub(crate) fn invalid(selector: impl Into<String>, message: impl Into<String>) -> Self {
        StylesheetError::InvalidDefinition {
            selector: selector.into(),
            message: message.into(),
            path: None,
        }
    }

    /// Attaches the source file to errors that carry an optional path.
    pub fn with_path(self, file: impl Into<PathBuf>) -> Self {
        match self {
            StylesheetError::Parse {
                message,
                line,
                column,
                ..
            } => StylesheetError::Parse {
                path: Some(file.into()),
                message,
                line,
                column,
            },
            StylesheetError::InvalidDefinition {
                selector, message, ..
            } => StylesheetError::InvalidDefinition {
                selector,
                message,
                path: Some(file.into()),
            },
            other => other,
        }
    }
}

fn describe_location(path: &Option<PathBuf>, line: Option<usize>, column: Option<usize>) -> String {
    let mut out = String::new();
    if let Some(p) = path {
        out.push_str(&format!(" {}", p.display()));
    }
    match (line, column) {
        (Some(line), Some(column)) => out.push_str(&format!(" at line {} column {}", line, column)),
        (Some(line), None) => out.push_str(&format!(" at line {}", line)),
        _ => {}
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display_with_location() {
        let err = StylesheetError::Parse {
            path: Some(PathBuf::from("theme.yaml")),
            message: "mapping values are not allowed".to_string(),
            line: Some(3),
            column: Some(7),
        };
        let msg = err.to_string();
        assert!(msg.contains("theme.yaml"));
        assert!(msg.contains("line 3 column 7"));
        assert!(msg.contains("mapping values"));
    }

    #[test]
    fn test_invalid_definition_display() {
        let err = StylesheetError::invalid(".card", "top-level entries must be mappings");
        let msg = err.to_string();
        assert!(msg.contains(".card"));
        assert!(msg.contains("must be mappings"));
    }

    #[test]
    fn test_with_path_fills_location() {
        let err = StylesheetError::invalid(".card", "bad").with_path("a.yaml");
        assert!(matches!(
            err,
            StylesheetError::InvalidDefinition { path: Some(ref p), .. } if p == &PathBuf::from("a.yaml")
        ));
    }
}
