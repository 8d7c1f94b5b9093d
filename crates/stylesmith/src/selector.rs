//! Selector handling: qualification of nested identifiers and token-level
//! inspection of selectors.
//!
//! # Qualification
//!
//! A nested identifier is combined with its parent's qualified selector by one
//! rule:
//!
//! - an identifier starting with the parent reference `&` is *fused*: every
//!   `&` is replaced by the parent selector (`.btn` + `&:hover` → `.btn:hover`,
//!   `.btn` + `&--primary` → `.btn--primary`);
//! - any other identifier is a descendant: `parent child`.
//!
//! Both sides may be selector lists. Lists are split on top-level commas only
//! (commas inside `:is(a, b)` or `[data-x="a,b"]` do not split) and combined
//! as a cross product, parent-major.
//!
//! # Inspection
//!
//! Specificity, compound counts and class-name extraction use the `cssparser`
//! tokenizer, so escapes, comments and functional pseudo-classes are handled
//! the way a browser would tokenize them.

use cssparser::{ParseError, Parser, ParserInput, Token};
use serde::Serialize;

/// The parent reference marker.
pub const PARENT_REFERENCE: char = '&';

/// Largest selector list one qualified rule may expand to.
pub const MAX_SELECTOR_LIST: usize = 1024;

/// Why an identifier could not be qualified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualifyError {
    /// The identifier is empty or whitespace.
    EmptyIdentifier,
    /// A parent reference was used where there is no parent.
    ParentReferenceAtRoot,
    /// The cross product of nested lists exceeds [`MAX_SELECTOR_LIST`].
    TooManySelectors,
}

/// Returns true if the identifier attaches directly to its parent.
pub fn is_fused(identifier: &str) -> bool {
    identifier.trim_start().starts_with(PARENT_REFERENCE)
}

/// Splits a selector list on top-level commas, trimming each member and
/// dropping empty members.
pub fn split_list(selector: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in selector.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => quote = Some(c),
                '(' | '[' => depth += 1,
                ')' | ']' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    parts.push(&selector[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    parts.push(&selector[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Number of selectors the last identifier of a lineage expands to.
///
/// Saturates instead of overflowing, so it is safe on arbitrarily deep trees.
pub fn expanded_len(lineage: &[&str]) -> usize {
    lineage
        .iter()
        .map(|identifier| split_list(identifier).len().max(1))
        .fold(1, usize::saturating_mul)
}

/// Qualifies `identifier` against an optional parent selector.
pub fn qualify(parent: Option<&str>, identifier: &str) -> Result<String, QualifyError> {
    let members = split_list(identifier);
    if members.is_empty() {
        return Err(QualifyError::EmptyIdentifier);
    }

    let Some(parent) = parent else {
        if members.iter().any(|m| is_fused(m)) {
            return Err(QualifyError::ParentReferenceAtRoot);
        }
        if members.len() > MAX_SELECTOR_LIST {
            return Err(QualifyError::TooManySelectors);
        }
        return Ok(members.join(", "));
    };

    let outers = split_list(parent);
    let size = outers.len().saturating_mul(members.len());
    if size > MAX_SELECTOR_LIST {
        return Err(QualifyError::TooManySelectors);
    }

    let mut combined = Vec::with_capacity(size);
    for outer in outers {
        for member in &members {
            if is_fused(member) {
                combined.push(member.replace(PARENT_REFERENCE, outer));
            } else {
                combined.push(format!("{} {}", outer, member));
            }
        }
    }
    Ok(combined.join(", "))
}

/// Qualifies the last identifier of a lineage (root first).
pub fn qualify_lineage(lineage: &[&str]) -> Result<String, QualifyError> {
    let mut qualified: Option<String> = None;
    for identifier in lineage {
        qualified = Some(qualify(qualified.as_deref(), identifier)?);
    }
    qualified.ok_or(QualifyError::EmptyIdentifier)
}

/// CSS specificity as `(ids, classes, types)`; compares lexicographically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Specificity {
    /// Id selectors.
    pub ids: u32,
    /// Class, attribute and pseudo-class selectors.
    pub classes: u32,
    /// Type and pseudo-element selectors.
    pub types: u32,
}

impl Specificity {
    /// Single-number weighting: `100·ids + 10·classes + types`.
    pub fn weight(&self) -> u32 {
        self.ids * 100 + self.classes * 10 + self.types
    }

    fn add(&mut self, other: Specificity) {
        self.ids += other.ids;
        self.classes += other.classes;
        self.types += other.types;
    }
}

/// Token-level summary of one (possibly list) selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectorProfile {
    /// Most specific member of the list.
    pub specificity: Specificity,
    /// Compound selectors in the longest member (`.a .b > c` has 3).
    pub compounds: usize,
    /// Universal selectors (`*`) across all members.
    pub universal: usize,
}

impl SelectorProfile {
    /// Tokenizes and profiles a selector.
    pub fn of(selector: &str) -> Self {
        let mut input = ParserInput::new(selector);
        let mut parser = Parser::new(&mut input);
        scan_list(&mut parser).unwrap_or_default()
    }

    fn merge_member(&mut self, member: MemberScan) {
        self.specificity = self.specificity.max(member.specificity);
        self.compounds = self.compounds.max(member.compounds);
        self.universal += member.universal;
    }
}

#[derive(Default)]
struct MemberScan {
    specificity: Specificity,
    compounds: usize,
    universal: usize,
    in_compound: bool,
}

impl MemberScan {
    fn boundary(&mut self) {
        self.in_compound = false;
    }

    fn simple(&mut self) -> &mut Specificity {
        if !self.in_compound {
            self.compounds += 1;
            self.in_compound = true;
        }
        &mut self.specificity
    }
}

const LEGACY_PSEUDO_ELEMENTS: &[&str] = &["before", "after", "first-line", "first-letter"];

fn scan_list<'i, 't>(input: &mut Parser<'i, 't>) -> Result<SelectorProfile, ParseError<'i, ()>> {
    let mut profile = SelectorProfile::default();
    let mut member = MemberScan::default();

    loop {
        let token = match input.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        match token {
            Token::Comma => {
                profile.merge_member(std::mem::take(&mut member));
            }
            Token::WhiteSpace(_) | Token::Delim('>') | Token::Delim('+') | Token::Delim('~') => {
                member.boundary();
            }
            Token::IDHash(_) | Token::Hash(_) => member.simple().ids += 1,
            Token::Delim('.') => {
                member.simple().classes += 1;
                // The class name itself must not count as a type selector
                let _ = input.next_including_whitespace();
            }
            Token::SquareBracketBlock => member.simple().classes += 1,
            Token::Ident(_) => member.simple().types += 1,
            Token::Delim('*') => {
                member.simple();
                member.universal += 1;
            }
            Token::Delim('&') => {
                member.simple();
            }
            Token::Colon => {
                let next = match input.next_including_whitespace() {
                    Ok(next) => next.clone(),
                    Err(_) => break,
                };
                match next {
                    Token::Colon => {
                        // Pseudo-element; its name (or function block) is skipped
                        let _ = input.next_including_whitespace();
                        member.simple().types += 1;
                    }
                    Token::Ident(name) => {
                        let lower = name.to_ascii_lowercase();
                        if LEGACY_PSEUDO_ELEMENTS.contains(&lower.as_str()) {
                            member.simple().types += 1;
                        } else {
                            member.simple().classes += 1;
                        }
                    }
                    Token::Function(name) => match name.to_ascii_lowercase().as_str() {
                        "where" => {
                            member.simple();
                        }
                        "not" | "is" | "has" | "matches" | "any" => {
                            let nested = input.parse_nested_block(scan_list).unwrap_or_default();
                            member.simple().add(nested.specificity);
                        }
                        _ => member.simple().classes += 1,
                    },
                    _ => {}
                }
            }
            _ => {}
        }
    }

    profile.merge_member(member);
    Ok(profile)
}

/// A class name found in an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ClassRef {
    /// `.name`
    Class(String),
    /// `&suffix`: to be appended to the parent's last class name.
    FusedSuffix(String),
}

/// Extracts class references from a single identifier.
///
/// Classes inside functional pseudo-classes (`:not(.x)`) are not reported;
/// they describe other elements.
pub(crate) fn class_refs(identifier: &str) -> Vec<ClassRef> {
    let mut input = ParserInput::new(identifier.trim());
    let mut parser = Parser::new(&mut input);
    let mut refs = Vec::new();
    let mut first = true;
    let mut after_parent_reference = false;
    let mut after_dot = false;

    while let Ok(token) = parser.next_including_whitespace() {
        match token {
            Token::Ident(name) if after_dot => refs.push(ClassRef::Class(name.to_string())),
            Token::Ident(name) if after_parent_reference => {
                refs.push(ClassRef::FusedSuffix(name.to_string()))
            }
            _ => {}
        }
        after_dot = matches!(token, Token::Delim('.'));
        after_parent_reference = first && matches!(token, Token::Delim('&'));
        first = false;
    }

    refs
}
