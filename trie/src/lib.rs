//! A Verkle tree: a 256-ary commitment trie over 31-byte stems with
//! Pedersen vector commitments on Bandersnatch and batched IPA
//! multiproofs.
//!
//! Keys are 32 bytes; the first 31 form the stem addressing one leaf, the
//! last selects one of the leaf's 256 value slots. Every node keeps its
//! commitment current through delta updates, so [`VerkleTree::root_hash`]
//! is always a pure read. [`proof::create_proof`] batches membership and
//! non-membership of any key set into one opening argument that
//! [`proof::verify_proof`] checks statelessly against the root.

pub mod committer;
mod error;
mod node;
pub mod proof;
pub mod store;
mod trie;

pub use error::VerkleError;
pub use proof::{create_proof, verify_proof, ExtPresent, VerificationHint, VerkleProof};
pub use store::{BatchOp, KeyValueStore, MemStore, StoreBatch};
pub use trie::VerkleTree;

pub use verkle_fields::Fr;
