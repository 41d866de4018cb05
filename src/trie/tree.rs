//! Fixed-shape Merkle tree construction and inclusion proofs

use crate::error::{Error, Result};
use crate::model::Digest;

/// A complete binary Merkle tree over an ordered leaf sequence.
///
/// Nodes are stored in one flat array: the root at index 0, the children of
/// node `i` at `2i + 1` and `2i + 2`, and the leaves filling the tail in
/// reverse feed order. Interior nodes hash their child pair sorted by byte
/// value, so proofs carry no left/right flags. Leaf values are expected to
/// already be double-hashed leaf records, which keeps them from ever
/// colliding with an interior node's 64-byte preimage.
///
/// Proofs are positional: leaf `i` here is the `i`th leaf fed to [`build`],
/// so the feed order must be stable for proofs to be comparable across
/// constructions.
///
/// [`build`]: MerkleTree::build
#[derive(Clone, Debug)]
pub struct MerkleTree {
    nodes: Vec<Digest>,
    leaf_count: usize,
}

impl MerkleTree {
    /// Build the tree over `leaves`, in order
    pub fn build(leaves: &[Digest]) -> Result<MerkleTree> {
        if leaves.is_empty() {
            return Err(Error::EmptyTree);
        }
        let total = 2 * leaves.len() - 1;
        let mut nodes = vec![Digest::ZERO; total];
        for (i, leaf) in leaves.iter().enumerate() {
            nodes[total - 1 - i] = *leaf;
        }
        for i in (0..total - leaves.len()).rev() {
            nodes[i] = hash_pair(&nodes[2 * i + 1], &nodes[2 * i + 2]);
        }
        Ok(MerkleTree {
            nodes,
            leaf_count: leaves.len(),
        })
    }

    /// The root digest committing every leaf
    pub fn root(&self) -> Digest {
        self.nodes[0]
    }

    /// Number of leaves the tree was built over
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// The leaf digest at feed position `index`
    pub fn leaf(&self, index: usize) -> Result<Digest> {
        if index >= self.leaf_count {
            return Err(Error::ProofIndex {
                index,
                leaves: self.leaf_count,
            });
        }
        Ok(self.nodes[self.nodes.len() - 1 - index])
    }

    /// The inclusion proof for the leaf at feed position `index`: the
    /// sibling digests on the path from the leaf to the root
    pub fn proof(&self, index: usize) -> Result<Vec<Digest>> {
        if index >= self.leaf_count {
            return Err(Error::ProofIndex {
                index,
                leaves: self.leaf_count,
            });
        }
        let mut siblings = Vec::new();
        let mut position = self.nodes.len() - 1 - index;
        while position > 0 {
            let sibling = if position % 2 == 1 {
                position + 1
            } else {
                position - 1
            };
            siblings.push(self.nodes[sibling]);
            position = (position - 1) / 2;
        }
        Ok(siblings)
    }

    /// Check that `leaf` is committed under `root` by `proof`.
    ///
    /// This is the local self-check variant of the external verifier; it
    /// recomputes the root from the leaf and the sibling path.
    pub fn verify(leaf: Digest, proof: &[Digest], root: Digest) -> bool {
        let computed = proof
            .iter()
            .fold(leaf, |node, sibling| hash_pair(&node, sibling));
        computed == root
    }
}

/// Hash an interior node from its child pair, sorted so the pair order does
/// not matter
fn hash_pair(a: &Digest, b: &Digest) -> Digest {
    let (lo, hi) = if a.as_bytes() <= b.as_bytes() {
        (a, b)
    } else {
        (b, a)
    };
    Digest::digest_many(&[lo.as_bytes(), hi.as_bytes()])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(n: usize) -> Vec<Digest> {
        (0..n)
            .map(|i| Digest::digest(&(i as u64).to_le_bytes()))
            .collect()
    }

    #[test]
    fn test_empty_tree_rejected() {
        assert!(matches!(MerkleTree::build(&[]), Err(Error::EmptyTree)));
    }

    #[test]
    fn test_single_leaf_is_root() {
        let leaves = leaves(1);
        let tree = MerkleTree::build(&leaves).unwrap();
        assert_eq!(tree.root(), leaves[0]);
        assert_eq!(tree.proof(0).unwrap(), vec![]);
        assert!(MerkleTree::verify(leaves[0], &[], tree.root()));
    }

    #[test]
    fn test_inclusion_all_sizes() {
        for n in 1..=9 {
            let leaves = leaves(n);
            let tree = MerkleTree::build(&leaves).unwrap();
            for (i, leaf) in leaves.iter().enumerate() {
                let proof = tree.proof(i).unwrap();
                assert!(
                    MerkleTree::verify(*leaf, &proof, tree.root()),
                    "leaf {i} of {n} failed verification"
                );
            }
        }
    }

    #[test]
    fn test_pair_order_does_not_matter() {
        let a = Digest::digest(b"a");
        let b = Digest::digest(b"b");
        assert_eq!(hash_pair(&a, &b), hash_pair(&b, &a));
    }

    #[test]
    fn test_tampered_leaf_fails() {
        let leaves = leaves(5);
        let tree = MerkleTree::build(&leaves).unwrap();
        let proof = tree.proof(2).unwrap();
        let wrong = Digest::digest(b"tampered");
        assert!(!MerkleTree::verify(wrong, &proof, tree.root()));
    }

    #[test]
    fn test_tampered_sibling_fails() {
        let leaves = leaves(6);
        let tree = MerkleTree::build(&leaves).unwrap();
        for i in 0..leaves.len() {
            let mut proof = tree.proof(i).unwrap();
            for j in 0..proof.len() {
                let saved = proof[j];
                proof[j] = Digest::digest(b"substituted");
                assert!(!MerkleTree::verify(leaves[i], &proof, tree.root()));
                proof[j] = saved;
            }
        }
    }

    #[test]
    fn test_proof_index_out_of_range() {
        let tree = MerkleTree::build(&leaves(3)).unwrap();
        assert!(matches!(
            tree.proof(3),
            Err(Error::ProofIndex { index: 3, leaves: 3 })
        ));
    }

    #[test]
    fn test_deterministic_root() {
        let leaves = leaves(7);
        let t1 = MerkleTree::build(&leaves).unwrap();
        let t2 = MerkleTree::build(&leaves).unwrap();
        assert_eq!(t1.root(), t2.root());
        for i in 0..leaves.len() {
            assert_eq!(t1.proof(i).unwrap(), t2.proof(i).unwrap());
        }
    }

    #[test]
    fn test_leaf_order_changes_root() {
        let mut leaves = leaves(4);
        let t1 = MerkleTree::build(&leaves).unwrap();
        leaves.swap(0, 3);
        let t2 = MerkleTree::build(&leaves).unwrap();
        assert_ne!(t1.root(), t2.root());
    }
}
