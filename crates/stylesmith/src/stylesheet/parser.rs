//! YAML → [`StyleTree`] loader.
//!
//! Parsing happens in two steps: the text is read into a [`RawNode`], a YAML
//! value whose mappings are plain entry lists, then the value is lowered into
//! nodes. Mappings keep document order and repeated keys, so the tree mirrors
//! the file exactly and duplicate selectors reach the validator.

use std::fmt;
use std::path::Path;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_yaml::Value;

use super::error::StylesheetError;
use crate::tree::{Declaration, StyleNode, StyleTree};

/// YAML value that keeps every mapping entry in document order.
///
/// `serde_yaml::Value` rejects repeated keys while deserializing, which would
/// turn a duplicate selector into a parse failure.
#[derive(Debug, Clone, PartialEq)]
enum RawNode {
    Scalar(Value),
    Sequence(Vec<RawNode>),
    Mapping(Vec<(RawNode, RawNode)>),
}

impl<'de> Deserialize<'de> for RawNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawNodeVisitor)
    }
}

struct RawNodeVisitor;

impl<'de> Visitor<'de> for RawNodeVisitor {
    type Value = RawNode;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a YAML scalar, sequence or mapping")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<RawNode, E> {
        Ok(RawNode::Scalar(Value::Bool(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<RawNode, E> {
        Ok(RawNode::Scalar(Value::Number(v.into())))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<RawNode, E> {
        Ok(RawNode::Scalar(Value::Number(v.into())))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<RawNode, E> {
        Ok(RawNode::Scalar(Value::Number(v.into())))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RawNode, E> {
        Ok(RawNode::Scalar(Value::String(v.to_owned())))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<RawNode, E> {
        Ok(RawNode::Scalar(Value::String(v)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<RawNode, E> {
        Ok(RawNode::Scalar(Value::Null))
    }

    fn visit_none<E: de::Error>(self) -> Result<RawNode, E> {
        Ok(RawNode::Scalar(Value::Null))
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<RawNode, D::Error> {
        RawNode::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<RawNode, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(RawNode::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawNode, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(entry) = map.next_entry()? {
            entries.push(entry);
        }
        Ok(RawNode::Mapping(entries))
    }
}

/// Parser collaborator used by the pipeline to turn raw text into a tree.
///
/// The default implementation is [`YamlStyleParser`]; embedders with their own
/// front end (a different format, an editor buffer with spans) plug in here.
pub trait StyleParser: Send + Sync {
    /// Parses raw text into a style tree.
    fn parse(&self, text: &str) -> Result<StyleTree, StylesheetError>;
}

/// [`StyleParser`] for the YAML stylesheet format.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlStyleParser;

impl StyleParser for YamlStyleParser {
    fn parse(&self, text: &str) -> Result<StyleTree, StylesheetError> {
        parse_stylesheet(text)
    }
}

/// Parses a YAML stylesheet into a style tree.
///
/// # Errors
///
/// Returns `StylesheetError` if:
/// - YAML parsing fails
/// - the root is not a mapping
/// - a key is not a string or number
/// - a top-level entry or a declaration value has an unsupported shape
///
/// Semantic problems (empty values, duplicate selectors) are *not* errors
/// here; they are reported by the [`Validator`](crate::Validator).
///
/// # Example
///
/// ```rust
/// use stylesmith::parse_stylesheet;
///
/// let tree = parse_stylesheet(r#"
/// .card:
///   padding: 4px
///   "&:hover":
///     color: blue
/// "#).unwrap();
///
/// assert_eq!(tree.roots[0].identifier, ".card");
/// assert_eq!(tree.roots[0].children[0].identifier, "&:hover");
/// ```
pub fn parse_stylesheet(yaml: &str) -> Result<StyleTree, StylesheetError> {
    let root: RawNode =
        serde_yaml::from_str(yaml).map_err(|e| StylesheetError::from_yaml(&e))?;

    let entries = match root {
        // An empty document is an empty stylesheet
        RawNode::Scalar(Value::Null) => return Ok(StyleTree::new()),
        RawNode::Mapping(entries) => entries,
        _ => {
            return Err(StylesheetError::Parse {
                path: None,
                message: "stylesheet must be a YAML mapping".to_string(),
                line: None,
                column: None,
            })
        }
    };

    let mut roots = Vec::with_capacity(entries.len());
    for (key, value) in &entries {
        let identifier = key_to_string(key, "")?;
        let node = match value {
            RawNode::Mapping(body) => parse_node(identifier, body, &[])?,
            RawNode::Scalar(Value::Null) => StyleNode::new(identifier),
            other => {
                return Err(StylesheetError::invalid(
                    identifier,
                    format!(
                        "top-level entries must be mappings of declarations, got {}",
                        describe(other)
                    ),
                ))
            }
        };
        roots.push(node);
    }

    Ok(StyleTree::from_roots(roots))
}

/// Reads and parses a stylesheet file, recording the path on the tree and on
/// any error.
pub fn parse_stylesheet_file(path: impl AsRef<Path>) -> Result<StyleTree, StylesheetError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| StylesheetError::Load {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    parse_stylesheet(&content)
        .map(|tree| tree.with_source(path))
        .map_err(|e| e.with_path(path))
}

fn parse_node(
    identifier: String,
    body: &[(RawNode, RawNode)],
    ancestors: &[&str],
) -> Result<StyleNode, StylesheetError> {
    let mut node = StyleNode::new(identifier);
    let mut lineage = ancestors.to_vec();
    lineage.push(node.identifier.as_str());
    let breadcrumb = lineage.join(" > ");

    let mut declarations = Vec::new();
    let mut children = Vec::new();

    for (key, value) in body {
        let name = key_to_string(key, &breadcrumb)?;
        match value {
            RawNode::Mapping(nested) => children.push(parse_node(name, nested, &lineage)?),
            scalar => {
                let value = scalar_to_string(scalar, &breadcrumb, &name)?;
                declarations.push(Declaration::new(name, value));
            }
        }
    }

    node.declarations = declarations;
    node.children = children;
    Ok(node)
}

fn key_to_string(key: &RawNode, breadcrumb: &str) -> Result<String, StylesheetError> {
    match key {
        RawNode::Scalar(Value::String(s)) => Ok(s.clone()),
        RawNode::Scalar(Value::Number(n)) => Ok(n.to_string()),
        other => Err(StylesheetError::invalid(
            breadcrumb,
            format!("keys must be strings, got {}", describe(other)),
        )),
    }
}

/// Lowers a declaration value to its CSS text.
///
/// Sequences become comma lists (`[Inter, sans-serif]` → `Inter, sans-serif`);
/// null becomes an empty value, which the validator rejects with a location.
fn scalar_to_string(
    value: &RawNode,
    breadcrumb: &str,
    property: &str,
) -> Result<String, StylesheetError> {
    match value {
        RawNode::Scalar(Value::String(s)) => Ok(s.clone()),
        RawNode::Scalar(Value::Number(n)) => Ok(n.to_string()),
        RawNode::Scalar(Value::Bool(b)) => Ok(b.to_string()),
        RawNode::Scalar(Value::Null) => Ok(String::new()),
        RawNode::Sequence(items) => {
            let parts = items
                .iter()
                .map(|item| match item {
                    RawNode::Sequence(_) | RawNode::Mapping(_) => Err(StylesheetError::invalid(
                        breadcrumb,
                        format!("list items of '{}' must be scalars", property),
                    )),
                    scalar => scalar_to_string(scalar, breadcrumb, property),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(parts.join(", "))
        }
        other => Err(StylesheetError::invalid(
            breadcrumb,
            format!("unsupported value for '{}': {}", property, describe(other)),
        )),
    }
}

fn describe(value: &RawNode) -> &'static str {
    match value {
        RawNode::Scalar(Value::Null) => "null",
        RawNode::Scalar(Value::Bool(_)) => "a boolean",
        RawNode::Scalar(Value::Number(_)) => "a number",
        RawNode::Scalar(Value::String(_)) => "a string",
        RawNode::Scalar(_) => "a tagged value",
        RawNode::Sequence(_) => "a sequence",
        RawNode::Mapping(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // parse_stylesheet basic tests
    // =========================================================================

    #[test]
    fn test_parse_empty_stylesheet() {
        assert!(parse_stylesheet("{}").unwrap().is_empty());
        assert!(parse_stylesheet("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_simple_rule() {
        let tree = parse_stylesheet(
            r#"
            .x:
                color: red
            "#,
        )
        .unwrap();

        assert_eq!(tree.roots.len(), 1);
        assert_eq!(tree.roots[0].identifier, ".x");
        assert_eq!(
            tree.roots[0].declarations,
            vec![Declaration::new("color", "red")]
        );
    }

    #[test]
    fn test_parse_preserves_order() {
        let tree = parse_stylesheet(
            r#"
            .b:
                z-index: 1
                color: red
                align: left
            .a:
                color: blue
            "#,
        )
        .unwrap();

        let props: Vec<&str> = tree.roots[0]
            .declarations
            .iter()
            .map(|d| d.property.as_str())
            .collect();
        assert_eq!(props, vec!["z-index", "color", "align"]);
        assert_eq!(tree.roots[1].identifier, ".a");
    }

    #[test]
    fn test_parse_nesting() {
        let tree = parse_stylesheet(
            r#"
            .card:
                padding: 4px
                "&:hover":
                    color: blue
                .card__title:
                    font-weight: bold
            "#,
        )
        .unwrap();

        let card = &tree.roots[0];
        assert_eq!(card.declarations.len(), 1);
        assert_eq!(card.children.len(), 2);
        assert_eq!(card.children[0].identifier, "&:hover");
        assert_eq!(card.children[1].identifier, ".card__title");
    }

    #[test]
    fn test_parse_scalar_values() {
        let tree = parse_stylesheet(
            r#"
            .x:
                z-index: 10
                opacity: 0.5
                visible: true
                font-family: [Inter, sans-serif]
            "#,
        )
        .unwrap();

        let values: Vec<&str> = tree.roots[0]
            .declarations
            .iter()
            .map(|d| d.value.as_str())
            .collect();
        assert_eq!(values, vec!["10", "0.5", "true", "Inter, sans-serif"]);
    }

    #[test]
    fn test_parse_null_value_is_empty_declaration() {
        let tree = parse_stylesheet(
            r#"
            .x:
                color:
            "#,
        )
        .unwrap();
        assert_eq!(tree.roots[0].declarations[0].value, "");
    }

    #[test]
    fn test_parse_null_root_is_empty_node() {
        let tree = parse_stylesheet(".x:\n").unwrap();
        assert!(tree.roots[0].is_empty());
    }

    // =========================================================================
    // Error tests
    // =========================================================================

    #[test]
    fn test_parse_invalid_yaml() {
        let result = parse_stylesheet("not: [valid: yaml");
        assert!(matches!(result, Err(StylesheetError::Parse { .. })));
    }

    #[test]
    fn test_parse_non_mapping_root() {
        let result = parse_stylesheet("- item1\n- item2");
        assert!(matches!(result, Err(StylesheetError::Parse { .. })));
    }

    #[test]
    fn test_parse_scalar_root_entry() {
        let result = parse_stylesheet(".x: red");
        assert!(matches!(
            result,
            Err(StylesheetError::InvalidDefinition { ref selector, .. }) if selector == ".x"
        ));
    }

    #[test]
    fn test_parse_nested_list_value() {
        let result = parse_stylesheet(
            r#"
            .x:
                margin: [[1, 2]]
            "#,
        );
        assert!(matches!(
            result,
            Err(StylesheetError::InvalidDefinition { .. })
        ));
    }

    #[test]
    fn test_parse_keeps_repeated_keys() {
        let tree = parse_stylesheet(
            r#"
            .a:
                color: red
            .a:
                color: blue
                color: green
            "#,
        )
        .unwrap();

        assert_eq!(tree.roots.len(), 2);
        assert_eq!(tree.roots[0].identifier, ".a");
        assert_eq!(tree.roots[1].identifier, ".a");
        let values: Vec<&str> = tree.roots[1]
            .declarations
            .iter()
            .map(|d| d.value.as_str())
            .collect();
        assert_eq!(values, vec!["blue", "green"]);
    }

    #[test]
    fn test_yaml_parser_collaborator() {
        let tree = YamlStyleParser.parse(".x:\n  color: red\n").unwrap();
        assert_eq!(tree.node_count(), 1);
    }
}
