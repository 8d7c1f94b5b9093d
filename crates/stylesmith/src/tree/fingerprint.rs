//! Structural content hashing.
//!
//! A [`Fingerprint`] is a SHA-256 digest over the *content* of a value, never
//! its address: two trees built independently with the same identifiers,
//! declarations and nesting produce the same fingerprint, in any process.
//!
//! Strings are written length-prefixed so that adjacent fields cannot run into
//! each other (`"ab" + "c"` and `"a" + "bc"` hash differently).

use std::fmt;

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

use super::StyleTree;

/// A 256-bit content digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Hashes the full structure of a tree: identifiers, declarations,
    /// nesting and order. The tree's source path is ignored.
    pub fn of_tree(tree: &StyleTree) -> Self {
        let mut hasher = ContentHasher::new("tree");
        hasher.write_usize(tree.roots.len());
        for visit in tree.walk() {
            let node = visit.node;
            hasher.write_usize(visit.depth);
            hasher.write_str(&node.identifier);
            hasher.write_usize(node.declarations.len());
            for declaration in &node.declarations {
                hasher.write_str(&declaration.property);
                hasher.write_str(&declaration.value);
            }
            hasher.write_usize(node.children.len());
        }
        hasher.finish()
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hexadecimal form of the digest.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..16])
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Incremental, domain-separated SHA-256 writer shared by the tree,
/// signature and options fingerprints.
pub(crate) struct ContentHasher(Sha256);

impl ContentHasher {
    pub(crate) fn new(domain: &str) -> Self {
        let mut hasher = Self(Sha256::new());
        hasher.write_str(domain);
        hasher
    }

    pub(crate) fn write_str(&mut self, value: &str) {
        self.write_usize(value.len());
        self.0.update(value.as_bytes());
    }

    pub(crate) fn write_usize(&mut self, value: usize) {
        self.0.update((value as u64).to_le_bytes());
    }

    pub(crate) fn write_f64(&mut self, value: f64) {
        self.0.update(value.to_bits().to_le_bytes());
    }

    pub(crate) fn finish(self) -> Fingerprint {
        Fingerprint(self.0.finalize().into())
    }
}
