//! Merkle tree over the committed leaf sequence
//!
//! The tree is a pure function of the ordered leaf hashes fed to it:
//! - Each interior node hashes its sorted pair of children
//! - A proof is the ordered list of sibling digests up to the root
//! - The root uniquely identifies the whole committed map

mod tree;

pub use tree::MerkleTree;
