//! Canonical declaration-set signatures.
//!
//! Two nodes declare "the same thing" when their declaration sets are equal
//! regardless of order. The signature sorts the pairs by property then value,
//! drops exact duplicates and hashes the result, so it is independent of
//! traversal and declaration order.

use std::fmt;

use serde::Serialize;

use crate::tree::fingerprint::ContentHasher;
use crate::tree::Declaration;

/// Lowercase hex SHA-256 of a canonical declaration set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    /// Computes the signature of a declaration list.
    pub fn of(declarations: &[Declaration]) -> Self {
        Self::of_canonical(&canonicalize(declarations))
    }

    pub(crate) fn of_canonical(canonical: &[Declaration]) -> Self {
        let mut hasher = ContentHasher::new("declarations");
        hasher.write_usize(canonical.len());
        for decl in canonical {
            hasher.write_str(&decl.property);
            hasher.write_str(&decl.value);
        }
        Self(hasher.finish().to_hex())
    }

    /// The hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 hex digits, for display.
    pub fn short(&self) -> &str {
        &self.0[..8.min(self.0.len())]
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sorts by `(property, value)` and removes exact duplicates.
pub fn canonicalize(declarations: &[Declaration]) -> Vec<Declaration> {
    let mut canonical = declarations.to_vec();
    canonical.sort();
    canonical.dedup();
    canonical
}
