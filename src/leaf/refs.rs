//! Lazy references between leaves, resolved at encode time

use super::{Input, InputRow, ObjectType};
use crate::error::Result;
use crate::model::Digest;
use serde::{Deserialize, Serialize};

/// How a reference contributes to the referring leaf's encoding
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefKind {
    /// Resolves to the target leaf's content hash
    Proof = 1,

    /// Resolves to the target leaf's content hash followed by one of its
    /// input rows
    ProofInput = 2,
}

/// A symbolic reference from one leaf's content to another leaf.
///
/// References exist only while leaves are being derived; they are resolved
/// to concrete values before encoding, so committed bytes never contain one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalRef {
    pub kind: RefKind,

    /// Leaf kind of the referenced object
    pub target_type: ObjectType,

    /// Identifies the targeted leaf, typically its sequence index within
    /// its kind
    pub id: usize,

    /// Selects the target's input row, `ProofInput` only
    pub input: Option<usize>,
}

impl LogicalRef {
    /// Reference to the target leaf's content hash
    pub fn proof(target_type: ObjectType, id: usize) -> Self {
        LogicalRef {
            kind: RefKind::Proof,
            target_type,
            id,
            input: None,
        }
    }

    /// Reference to the target's content hash plus its input row at `input`
    pub fn proof_input(target_type: ObjectType, id: usize, input: usize) -> Self {
        LogicalRef {
            kind: RefKind::ProofInput,
            target_type,
            id,
            input: Some(input),
        }
    }
}

/// Resolves lazy references while a leaf is being encoded.
///
/// `Proof` references resolve to a single-digest row; `ProofInput`
/// references resolve to the target's content hash followed by the selected
/// input row. Resolving a reference to a leaf that does not exist is fatal,
/// never silently substituted.
pub trait ResolveRef {
    fn resolve_ref(&self, reference: &LogicalRef) -> Result<InputRow>;
}

/// Maps committed content hashes back to leaf identities.
///
/// This is the diagnostic inverse of reference resolution, used when
/// hydrating prepared leaves back into logical objects. It is not needed on
/// the commit path.
pub trait RecoverTarget {
    /// Identify the leaf a committed digest belongs to
    fn recover_target(&self, digest: &Digest) -> Result<(ObjectType, usize)>;

    /// Find the input row of the identified leaf matching `row`
    fn recover_input(&self, target_type: ObjectType, id: usize, row: &[Input]) -> Result<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proof_ref_has_no_input() {
        let r = LogicalRef::proof(ObjectType::Exit, 3);
        assert_eq!(r.kind, RefKind::Proof);
        assert_eq!(r.id, 3);
        assert_eq!(r.input, None);
    }

    #[test]
    fn test_proof_input_ref_selects_row() {
        let r = LogicalRef::proof_input(ObjectType::LocationChoices, 0, 2);
        assert_eq!(r.kind, RefKind::ProofInput);
        assert_eq!(r.input, Some(2));
    }
}
