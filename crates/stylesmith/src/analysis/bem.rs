//! BEM naming checks.
//!
//! Class names are expected to follow `block(__element)?(--modifier)?`. The
//! analyzer pulls class names out of every identifier, resolves fused
//! suffixes (`&__title`, `&--active`) against the parent's last class, and
//! reports the first rule each name breaks. Only names that contain a BEM
//! separator are checked; plain names such as `card` or `is-active` pass.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::selector::{class_refs, split_list, ClassRef};
use crate::tree::{NodePath, StyleTree};

const ELEMENT_SEPARATOR: &str = "__";
const MODIFIER_SEPARATOR: &str = "--";

/// What is wrong with a class name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BemViolationKind {
    /// A separator with nothing on one side (`block--`, `__x`).
    EmptySegment,
    /// A segment that starts or ends with `_` or `-` (`block___elem`).
    MalformedSeparator,
    /// More than one element (`block__a__b`).
    MultipleElements,
    /// More than one modifier (`block--a--b`).
    MultipleModifiers,
    /// A modifier ahead of the element (`block--mod__elem`).
    ModifierBeforeElement,
}

impl fmt::Display for BemViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BemViolationKind::EmptySegment => "empty-segment",
            BemViolationKind::MalformedSeparator => "malformed-separator",
            BemViolationKind::MultipleElements => "multiple-elements",
            BemViolationKind::MultipleModifiers => "multiple-modifiers",
            BemViolationKind::ModifierBeforeElement => "modifier-before-element",
        })
    }
}

/// A class name that breaks the naming convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamingViolation {
    /// Breadcrumb of the node.
    pub path: String,
    /// Identifier as written.
    pub identifier: String,
    /// Class name after fused-suffix resolution.
    pub class_name: String,
    /// The rule broken.
    pub kind: BemViolationKind,
    /// Human-readable explanation.
    pub message: String,
}

impl fmt::Display for NamingViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.class_name, self.path, self.message)
    }
}

/// Checks class names against BEM.
#[derive(Debug, Clone, Copy, Default)]
pub struct BemAnalyzer;

impl BemAnalyzer {
    /// Creates an analyzer.
    pub fn new() -> Self {
        Self
    }

    /// Reports naming violations in traversal order.
    pub fn analyze(&self, tree: &StyleTree) -> Vec<NamingViolation> {
        let mut last_class: HashMap<NodePath, String> = HashMap::new();
        let mut violations = Vec::new();

        for visit in tree.walk() {
            let parent_class = visit
                .path
                .parent()
                .and_then(|parent| last_class.get(&parent).cloned());

            let mut names: Vec<String> = Vec::new();
            for member in split_list(&visit.node.identifier) {
                for class in class_refs(member) {
                    let name = match class {
                        ClassRef::Class(name) => name,
                        ClassRef::FusedSuffix(suffix) => match &parent_class {
                            Some(parent) => format!("{}{}", parent, suffix),
                            None => continue,
                        },
                    };
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
            }

            for name in &names {
                if let Some(kind) = check_class_name(name) {
                    violations.push(NamingViolation {
                        path: visit.breadcrumb(),
                        identifier: visit.node.identifier.clone(),
                        class_name: name.clone(),
                        kind,
                        message: describe(kind, name),
                    });
                }
            }

            if let Some(name) = names.pop() {
                last_class.insert(visit.path, name);
            }
        }

        tracing::debug!(violations = violations.len(), "naming analysis done");
        violations
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Separator {
    Element,
    Modifier,
}

/// Splits a class name at `__` and `--`, left to right.
fn segments(name: &str) -> (Vec<&str>, Vec<Separator>) {
    let mut parts = Vec::new();
    let mut separators = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < name.len() {
        let rest = &name[i..];
        let separator = if rest.starts_with(ELEMENT_SEPARATOR) {
            Some(Separator::Element)
        } else if rest.starts_with(MODIFIER_SEPARATOR) {
            Some(Separator::Modifier)
        } else {
            None
        };
        match separator {
            Some(separator) => {
                parts.push(&name[start..i]);
                separators.push(separator);
                i += 2;
                start = i;
            }
            None => i += rest.chars().next().map_or(1, char::len_utf8),
        }
    }
    parts.push(&name[start..]);

    (parts, separators)
}

/// Returns the first rule a class name breaks, if any.
pub fn check_class_name(name: &str) -> Option<BemViolationKind> {
    let (parts, separators) = segments(name);
    if separators.is_empty() {
        return None;
    }

    if parts.iter().any(|p| p.is_empty()) {
        return Some(BemViolationKind::EmptySegment);
    }
    let ragged = |c: char| c == '_' || c == '-';
    if parts
        .iter()
        .any(|p| p.starts_with(ragged) || p.ends_with(ragged))
    {
        return Some(BemViolationKind::MalformedSeparator);
    }

    let elements = separators.iter().filter(|s| **s == Separator::Element).count();
    let modifiers = separators.len() - elements;
    if elements > 1 {
        return Some(BemViolationKind::MultipleElements);
    }
    if modifiers > 1 {
        return Some(BemViolationKind::MultipleModifiers);
    }
    if separators.first() == Some(&Separator::Modifier) && elements == 1 {
        return Some(BemViolationKind::ModifierBeforeElement);
    }
    None
}

fn describe(kind: BemViolationKind, name: &str) -> String {
    match kind {
        BemViolationKind::EmptySegment => {
            format!("'{}' has a separator with an empty name beside it", name)
        }
        BemViolationKind::MalformedSeparator => {
            format!("'{}' has a separator that is not exactly '__' or '--'", name)
        }
        BemViolationKind::MultipleElements => {
            format!("'{}' nests elements; use a single '__element'", name)
        }
        BemViolationKind::MultipleModifiers => {
            format!("'{}' chains modifiers; use one '--modifier' per class", name)
        }
        BemViolationKind::ModifierBeforeElement => {
            format!("'{}' puts the modifier before the element", name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::StyleNode;

    // =========================================================================
    // Class name rules
    // =========================================================================

    #[test]
    fn test_valid_names() {
        for name in ["block", "block__elem", "block--mod", "block__elem--mod", "is-active", "my-block__my-elem"] {
            assert_eq!(check_class_name(name), None, "{}", name);
        }
    }

    #[test]
    fn test_multiple_elements() {
        assert_eq!(
            check_class_name("block__elem__elem2"),
            Some(BemViolationKind::MultipleElements)
        );
    }

    #[test]
    fn test_modifier_before_element() {
        assert_eq!(
            check_class_name("block--mod__elem"),
            Some(BemViolationKind::ModifierBeforeElement)
        );
    }

    #[test]
    fn test_multiple_modifiers() {
        assert_eq!(
            check_class_name("block--a--b"),
            Some(BemViolationKind::MultipleModifiers)
        );
    }

    #[test]
    fn test_empty_segments() {
        for name in ["block____x", "__x", "block--", "block__"] {
            assert_eq!(
                check_class_name(name),
                Some(BemViolationKind::EmptySegment),
                "{}",
                name
            );
        }
    }

    #[test]
    fn test_malformed_separators() {
        assert_eq!(
            check_class_name("block___elem"),
            Some(BemViolationKind::MalformedSeparator)
        );
        assert_eq!(
            check_class_name("block---mod"),
            Some(BemViolationKind::MalformedSeparator)
        );
    }

    // =========================================================================
    // Tree analysis
    // =========================================================================

    #[test]
    fn test_analyze_reports_in_traversal_order() {
        let tree = StyleTree::new()
            .root(StyleNode::new(".block__a__b").declare("color", "red"))
            .root(StyleNode::new(".ok").child(StyleNode::new(".x--m__e")));
        let found = BemAnalyzer::new().analyze(&tree);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].kind, BemViolationKind::MultipleElements);
        assert_eq!(found[1].kind, BemViolationKind::ModifierBeforeElement);
        assert_eq!(found[1].path, ".ok > .x--m__e");
    }

    #[test]
    fn test_fused_suffix_resolves_against_parent() {
        let tree = StyleTree::new().root(
            StyleNode::new(".card").child(
                StyleNode::new("&__title")
                    .child(StyleNode::new("&__icon"))
                    .child(StyleNode::new("&--big")),
            ),
        );
        let found = BemAnalyzer::new().analyze(&tree);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].class_name, "card__title__icon");
        assert_eq!(found[0].identifier, "&__icon");
        assert_eq!(found[0].kind, BemViolationKind::MultipleElements);
    }

    #[test]
    fn test_pseudo_classes_and_negations_ignored() {
        let tree = StyleTree::new().root(
            StyleNode::new(".btn")
                .child(StyleNode::new("&:hover"))
                .child(StyleNode::new("&:not(.a__b__c)")),
        );
        assert!(BemAnalyzer::new().analyze(&tree).is_empty());
    }

    #[test]
    fn test_selector_lists() {
        let tree = StyleTree::new().root(
            StyleNode::new(".nav").child(StyleNode::new("&__item, &--a--b")),
        );
        let found = BemAnalyzer::new().analyze(&tree);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].class_name, "nav--a--b");
    }

    #[test]
    fn test_fused_suffix_without_parent_class_skipped() {
        let tree = StyleTree::new().root(StyleNode::new("div").child(StyleNode::new("&__a__b")));
        assert!(BemAnalyzer::new().analyze(&tree).is_empty());
    }
}
