//! Structural validation of style trees.
//!
//! The [`Validator`] walks the tree once and returns every finding in
//! traversal order. Callers must not assume the list is sorted by severity.
//!
//! Any [`Severity::Error`] finding means the tree must not be compiled or
//! analyzed. Warnings are advisory and travel along with the results.
//!
//! # Checks
//!
//! | Severity | Finding |
//! |----------|---------|
//! | Error | Two siblings with the same identifier (one finding per colliding pair) |
//! | Error | Empty identifier |
//! | Error | Empty property name or empty value |
//! | Error | Nesting deeper than [`MAX_NESTING_DEPTH`] |
//! | Error | A top-level identifier starting with `&` |
//! | Error | Nested selector lists expanding past [`MAX_SELECTOR_LIST`] selectors |
//! | Warning | The same property declared twice in one rule |
//! | Warning | A rule with neither declarations nor children |
//! | Warning | A value the CSS tokenizer reports as malformed |

use std::collections::HashSet;
use std::fmt;

use cssparser::{Parser, ParserInput, Token};
use serde::Serialize;

use crate::selector::{expanded_len, is_fused, MAX_SELECTOR_LIST};
use crate::tree::{StyleNode, StyleTree, Visit};

/// Hard structural ceiling on nesting depth.
///
/// This is a safety limit, independent of the analysis `max_depth` setting.
pub const MAX_NESTING_DEPTH: usize = 32;

/// Severity of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory; does not block compilation or analysis.
    Warning,
    /// Blocks compilation and analysis.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Breadcrumb of the node, e.g. `.card > &:hover`.
    pub path: String,
    /// Declaration name, or the node identifier for structural findings.
    pub property: String,
    /// What is wrong.
    pub message: String,
    /// Whether the finding blocks downstream stages.
    pub severity: Severity,
}

impl ValidationError {
    /// Creates an error-severity finding.
    pub fn error(
        path: impl Into<String>,
        property: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            property: property.into(),
            message: message.into(),
            severity: Severity::Error,
        }
    }

    /// Creates a warning-severity finding.
    pub fn warning(
        path: impl Into<String>,
        property: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(path, property, message)
        }
    }

    /// Returns true for error-severity findings.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} [{}]", self.severity, self.message, self.path)
    }
}

/// Returns true if any finding is an error.
pub fn has_errors(findings: &[ValidationError]) -> bool {
    findings.iter().any(ValidationError::is_error)
}

/// Checks style trees against the structural rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    /// Creates a validator.
    pub fn new() -> Self {
        Self
    }

    /// Validates a tree, returning all findings in traversal order.
    pub fn validate(&self, tree: &StyleTree) -> Vec<ValidationError> {
        let mut findings = Vec::new();

        check_siblings(&tree.roots, &[], &mut findings);

        for visit in tree.walk().max_depth(MAX_NESTING_DEPTH + 1) {
            if visit.depth > MAX_NESTING_DEPTH {
                findings.push(ValidationError::error(
                    visit.breadcrumb(),
                    visit.node.identifier.clone(),
                    format!(
                        "nesting depth {} exceeds the limit of {}",
                        visit.depth, MAX_NESTING_DEPTH
                    ),
                ));
                continue;
            }
            check_node(&visit, &mut findings);
            check_siblings(&visit.node.children, &visit.lineage, &mut findings);
        }

        findings
    }
}

fn check_node(visit: &Visit<'_>, findings: &mut Vec<ValidationError>) {
    let node = visit.node;
    let path = visit.breadcrumb();

    if node.identifier.trim().is_empty() {
        findings.push(ValidationError::error(
            &path,
            &node.identifier,
            "selector identifier is empty",
        ));
    } else if visit.is_root() && is_fused(&node.identifier) {
        findings.push(ValidationError::error(
            &path,
            &node.identifier,
            format!(
                "'{}' references a parent selector but has no parent",
                node.identifier
            ),
        ));
    }

    // Reported where the limit is first crossed, not on every descendant
    let expanded = expanded_len(&visit.lineage);
    let parent = &visit.lineage[..visit.lineage.len().saturating_sub(1)];
    if expanded > MAX_SELECTOR_LIST && expanded_len(parent) <= MAX_SELECTOR_LIST {
        findings.push(ValidationError::error(
            &path,
            &node.identifier,
            format!(
                "nested selector lists expand to more than {} selectors",
                MAX_SELECTOR_LIST
            ),
        ));
    }

    let mut seen = HashSet::new();
    for declaration in &node.declarations {
        let property = declaration.property.trim();
        if property.is_empty() {
            findings.push(ValidationError::error(
                &path,
                &declaration.property,
                "property name is empty",
            ));
            continue;
        }
        if declaration.value.trim().is_empty() {
            findings.push(ValidationError::error(
                &path,
                property,
                format!("'{}' has an empty value", property),
            ));
        } else if let Some(problem) = malformed_value(&declaration.value) {
            findings.push(ValidationError::warning(
                &path,
                property,
                format!("value of '{}' {}", property, problem),
            ));
        }
        if !seen.insert(property) {
            findings.push(ValidationError::warning(
                &path,
                property,
                format!("'{}' is declared more than once; the last value wins", property),
            ));
        }
    }

    if node.is_empty() {
        findings.push(ValidationError::warning(
            &path,
            &node.identifier,
            "rule has no declarations and no nested rules",
        ));
    }
}

/// One error per pair of siblings sharing an identifier.
fn check_siblings(siblings: &[StyleNode], lineage: &[&str], findings: &mut Vec<ValidationError>) {
    for (i, first) in siblings.iter().enumerate() {
        let identifier = first.identifier.trim();
        if identifier.is_empty() {
            continue;
        }
        for (j, second) in siblings.iter().enumerate().skip(i + 1) {
            if second.identifier.trim() == identifier {
                let mut path = lineage.to_vec();
                path.push(identifier);
                findings.push(ValidationError::error(
                    path.join(" > "),
                    identifier,
                    format!(
                        "duplicate selector '{}' (siblings {} and {})",
                        identifier,
                        i + 1,
                        j + 1
                    ),
                ));
            }
        }
    }
}

/// Describes the first tokenizer-level problem in a value, if any.
fn malformed_value(value: &str) -> Option<&'static str> {
    let mut input = ParserInput::new(value);
    let mut parser = Parser::new(&mut input);

    while let Ok(token) = parser.next_including_whitespace() {
        match token {
            Token::BadString(_) => return Some("contains an unterminated string"),
            Token::BadUrl(_) => return Some("contains a malformed url()"),
            Token::CloseParenthesis | Token::CloseSquareBracket | Token::CloseCurlyBracket => {
                return Some("has an unbalanced closing bracket")
            }
            _ => {}
        }
    }
    None
}
