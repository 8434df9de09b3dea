//! The Verkle tree: a 256-ary trie over 31-byte stems with vector
//! commitments kept current on every mutation.

use crate::committer::{self, KEY_LENGTH, STEM_LENGTH, VALUE_LENGTH};
use crate::error::VerkleError;
use crate::node::{InternalNode, LeafNode, Node, NodeId};
use verkle_fields::Fr;

pub(crate) const ROOT: NodeId = 0;

/// An in-memory Verkle tree.
///
/// `insert` takes `&mut self` and reads take `&self`; the borrow rules
/// provide the single-writer / multi-reader discipline, so no internal
/// lock is needed. Nodes live in an arena and are never removed.
#[derive(Debug, Clone)]
pub struct VerkleTree {
    pub(crate) nodes: Vec<Node>,
}

impl Default for VerkleTree {
    fn default() -> Self {
        Self::new()
    }
}

impl VerkleTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::Internal(InternalNode::new())],
        }
    }

    /// Inserts a 32-byte value under a 32-byte key.
    ///
    /// The first 31 key bytes are the stem, the last byte selects the
    /// leaf's value slot. Malformed lengths are rejected before any
    /// mutation. On return every commitment on the path up to the root
    /// reflects the new value.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), VerkleError> {
        if key.len() != KEY_LENGTH {
            return Err(VerkleError::MalformedKey("key must be 32 bytes"));
        }
        if value.len() != VALUE_LENGTH {
            return Err(VerkleError::MalformedKey("value must be 32 bytes"));
        }
        let mut stem = [0u8; STEM_LENGTH];
        stem.copy_from_slice(&key[..STEM_LENGTH]);
        let suffix = key[KEY_LENGTH - 1];
        let value: [u8; VALUE_LENGTH] = value.try_into().expect("length checked above");

        // (internal node, child index) pairs from the root downwards
        let mut path: Vec<(NodeId, usize)> = Vec::with_capacity(4);
        let mut current = ROOT;
        let mut depth = 0;

        loop {
            let child_index = stem[depth] as usize;
            path.push((current, child_index));

            let child = match &self.nodes[current] {
                Node::Internal(node) => node.children[child_index],
                Node::Leaf(_) => {
                    return Err(VerkleError::InternalInvariantViolation(
                        "leaf reached while walking internal levels",
                    ))
                }
            };

            match child {
                None => {
                    let mut leaf = LeafNode::new(stem);
                    leaf.set_value(suffix, value)?;
                    let new_scalar = leaf.commitment.map_to_scalar_field()?;
                    let leaf_id = self.push(Node::Leaf(leaf));
                    self.link_child(current, child_index, leaf_id);
                    return self.propagate(path, Fr::zero(), new_scalar);
                }
                Some(child_id) => match &self.nodes[child_id] {
                    Node::Internal(_) => {
                        current = child_id;
                        depth += 1;
                    }
                    Node::Leaf(leaf) => {
                        if leaf.stem == stem {
                            let old_scalar = leaf.commitment.map_to_scalar_field()?;
                            let leaf = match &mut self.nodes[child_id] {
                                Node::Leaf(leaf) => leaf,
                                Node::Internal(_) => unreachable!("checked above"),
                            };
                            leaf.set_value(suffix, value)?;
                            let new_scalar = leaf.commitment.map_to_scalar_field()?;
                            return self.propagate(path, old_scalar, new_scalar);
                        }
                        let old_scalar = leaf.commitment.map_to_scalar_field()?;
                        let head =
                            self.split_leaf(child_id, leaf.stem, depth, stem, suffix, value)?;
                        let new_scalar = self.nodes[head].commitment().map_to_scalar_field()?;
                        self.link_child(current, child_index, head);
                        return self.propagate(path, old_scalar, new_scalar);
                    }
                },
            }
        }
    }

    /// Reads the value stored under a key. `None` for malformed keys,
    /// empty slots and stems diverging before a leaf.
    pub fn get(&self, key: &[u8]) -> Option<[u8; VALUE_LENGTH]> {
        if key.len() != KEY_LENGTH {
            return None;
        }
        let stem = &key[..STEM_LENGTH];
        let suffix = key[KEY_LENGTH - 1];

        let mut current = ROOT;
        let mut depth = 0;
        loop {
            match &self.nodes[current] {
                Node::Internal(node) => {
                    current = node.children[stem[depth] as usize]?;
                    depth += 1;
                }
                Node::Leaf(leaf) => {
                    if leaf.stem == stem {
                        return leaf.get_value(suffix);
                    }
                    return None;
                }
            }
        }
    }

    /// The root commitment mapped into the scalar field. Always reflects
    /// the latest insert.
    pub fn root_hash(&self) -> Result<Fr, VerkleError> {
        Ok(self.root_commitment().map_to_scalar_field()?)
    }

    pub(crate) fn root_commitment(&self) -> bandersnatch::ExtendedPoint {
        self.nodes[ROOT].commitment()
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn link_child(&mut self, parent: NodeId, child_index: usize, child: NodeId) {
        match &mut self.nodes[parent] {
            Node::Internal(node) => node.children[child_index] = Some(child),
            Node::Leaf(_) => unreachable!("parents on an insert path are internal"),
        }
    }

    /// Replaces a leaf colliding with `stem` by a chain of internal nodes
    /// down to the first divergent byte, where both leaves become
    /// siblings. Returns the chain head; the caller links it into the
    /// vacated child slot.
    fn split_leaf(
        &mut self,
        old_leaf_id: NodeId,
        old_stem: [u8; STEM_LENGTH],
        depth: usize,
        stem: [u8; STEM_LENGTH],
        suffix: u8,
        value: [u8; VALUE_LENGTH],
    ) -> Result<NodeId, VerkleError> {
        let divergence = (depth + 1..STEM_LENGTH)
            .find(|&i| stem[i] != old_stem[i])
            .ok_or(VerkleError::InternalInvariantViolation(
                "split of two identical stems",
            ))?;

        let mut new_leaf = LeafNode::new(stem);
        new_leaf.set_value(suffix, value)?;
        let new_leaf_scalar = new_leaf.commitment.map_to_scalar_field()?;
        let old_leaf_scalar = self.nodes[old_leaf_id].commitment().map_to_scalar_field()?;
        let new_leaf_id = self.push(Node::Leaf(new_leaf));

        // the fork point holds both leaves
        let mut fork = InternalNode::new();
        fork.children[old_stem[divergence] as usize] = Some(old_leaf_id);
        fork.children[stem[divergence] as usize] = Some(new_leaf_id);
        fork.commitment = committer::DEFAULT_CRS.commit_sparse(&[
            (old_stem[divergence] as usize, old_leaf_scalar),
            (stem[divergence] as usize, new_leaf_scalar),
        ]);
        let mut head = self.push(Node::Internal(fork));

        // single-child links for the shared bytes between the vacated slot
        // and the fork point
        for level in (depth + 1..divergence).rev() {
            let child_scalar = self.nodes[head].commitment().map_to_scalar_field()?;
            let mut link = InternalNode::new();
            link.children[stem[level] as usize] = Some(head);
            link.commitment = committer::DEFAULT_CRS
                .commit_sparse(&[(stem[level] as usize, child_scalar)]);
            head = self.push(Node::Internal(link));
        }

        Ok(head)
    }

    /// Walks the recorded path bottom-up, folding the mutated child's
    /// mapped-commitment change into each ancestor.
    fn propagate(
        &mut self,
        path: Vec<(NodeId, usize)>,
        mut old_scalar: Fr,
        mut new_scalar: Fr,
    ) -> Result<(), VerkleError> {
        for (node_id, child_index) in path.into_iter().rev() {
            let node = match &mut self.nodes[node_id] {
                Node::Internal(node) => node,
                Node::Leaf(_) => unreachable!("recorded path entries are internal"),
            };
            let old_commitment_scalar = node.commitment.map_to_scalar_field()?;
            node.update_child_scalar(child_index, old_scalar, new_scalar);
            let new_commitment_scalar = node.commitment.map_to_scalar_field()?;
            old_scalar = old_commitment_scalar;
            new_scalar = new_commitment_scalar;
        }
        Ok(())
    }
}
