//! BLAKE3 content digests for leaves and tree nodes

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte BLAKE3 digest.
///
/// Digests play two roles: they are the values reference resolution embeds
/// into leaf payloads, and they are the node values of the committed tree.
/// Both roles require the digest to be a pure function of its input bytes,
/// so construction only happens through hashing.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Digest([u8; 32]);

impl Digest {
    /// Placeholder for tree slots that have not been computed yet
    pub const ZERO: Digest = Digest([0u8; 32]);

    /// Digest one byte string
    pub fn digest(data: &[u8]) -> Self {
        Digest(*blake3::hash(data).as_bytes())
    }

    /// Digest the concatenation of `parts` without joining them first
    pub fn digest_many(parts: &[&[u8]]) -> Self {
        let mut hasher = blake3::Hasher::new();
        for part in parts {
            hasher.update(part);
        }
        Digest(*hasher.finalize().as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Abbreviated hex form for log lines and error messages
    pub fn short(&self) -> String {
        self.to_hex()[..7].to_string()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.short())
    }
}
