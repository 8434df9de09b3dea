//! Tree nodes, stored in an arena and addressed by handle.
//!
//! Parent-to-child edges are [`NodeId`] handles into the arena, which keeps
//! ownership acyclic. Every node carries its commitment and keeps it
//! current through delta updates; a node's stored commitment is never stale
//! when a mutating call returns.

use crate::committer::{self, DEFAULT_CRS, STEM_LENGTH, VALUE_LENGTH, VERKLE_NODE_WIDTH};
use bandersnatch::{CurveError, ExtendedPoint};
use verkle_fields::Fr;

/// Handle into the tree's node arena.
pub(crate) type NodeId = usize;

#[derive(Debug, Clone)]
pub(crate) enum Node {
    Internal(InternalNode),
    Leaf(LeafNode),
}

impl Node {
    pub(crate) fn commitment(&self) -> ExtendedPoint {
        match self {
            Node::Internal(node) => node.commitment,
            Node::Leaf(node) => node.commitment,
        }
    }
}

/// A branch with up to 256 children, committed as
/// `Commit(map(child₀), …, map(child₂₅₅))` with zero for empty slots.
#[derive(Debug, Clone)]
pub(crate) struct InternalNode {
    pub(crate) children: [Option<NodeId>; VERKLE_NODE_WIDTH],
    pub(crate) commitment: ExtendedPoint,
}

impl InternalNode {
    /// An empty branch; all child scalars are zero so the commitment is
    /// the identity.
    pub(crate) fn new() -> Self {
        Self {
            children: [None; VERKLE_NODE_WIDTH],
            commitment: ExtendedPoint::identity(),
        }
    }

    /// Adds `crs[child_index] · (new - old)` to the stored commitment.
    pub(crate) fn update_child_scalar(&mut self, child_index: usize, old: Fr, new: Fr) {
        let delta = DEFAULT_CRS[child_index].scalar_mul(&new.sub(&old));
        self.commitment = self.commitment.add(&delta);
    }
}

/// A leaf holding all values sharing one stem, one slot per suffix byte.
///
/// The leaf polynomial is `[1, stem, map(C1), map(C2), 0, …]` where `C1`
/// commits to the low 128 suffixes and `C2` to the high 128, each slot
/// contributing two scalars (low half with marker, high half).
#[derive(Debug, Clone)]
pub(crate) struct LeafNode {
    pub(crate) stem: [u8; STEM_LENGTH],
    pub(crate) values: Box<[Option<[u8; VALUE_LENGTH]>; VERKLE_NODE_WIDTH]>,
    pub(crate) commitment: ExtendedPoint,
    pub(crate) c1: ExtendedPoint,
    pub(crate) c2: ExtendedPoint,
}

impl LeafNode {
    /// An empty leaf for `stem`. Both suffix commitments start at the
    /// identity, which maps to zero, so only the marker and stem slots
    /// contribute.
    pub(crate) fn new(stem: [u8; STEM_LENGTH]) -> Self {
        let commitment =
            DEFAULT_CRS.commit_sparse(&[(0, Fr::one()), (1, committer::stem_scalar(&stem))]);
        Self {
            stem,
            values: Box::new([None; VERKLE_NODE_WIDTH]),
            commitment,
            c1: ExtendedPoint::identity(),
            c2: ExtendedPoint::identity(),
        }
    }

    /// Stores a value in a suffix slot and folds the change into `C1`/`C2`
    /// and the leaf commitment by delta updates.
    pub(crate) fn set_value(
        &mut self,
        suffix: u8,
        value: [u8; VALUE_LENGTH],
    ) -> Result<(), CurveError> {
        let suffix = suffix as usize;
        let (old_low, old_high) = committer::value_scalars(self.values[suffix].as_ref());
        let (new_low, new_high) = committer::value_scalars(Some(&value));

        let slot = 2 * (suffix % 128);
        let delta = DEFAULT_CRS[slot]
            .scalar_mul(&new_low.sub(&old_low))
            .add(&DEFAULT_CRS[slot + 1].scalar_mul(&new_high.sub(&old_high)));

        let half_commitment = if suffix < 128 {
            &mut self.c1
        } else {
            &mut self.c2
        };
        let old_mapped = half_commitment.map_to_scalar_field()?;
        *half_commitment = half_commitment.add(&delta);
        let new_mapped = half_commitment.map_to_scalar_field()?;

        // leaf slot 2 carries map(C1), slot 3 carries map(C2)
        let half_slot = 2 + suffix / 128;
        self.commitment = self
            .commitment
            .add(&DEFAULT_CRS[half_slot].scalar_mul(&new_mapped.sub(&old_mapped)));

        self.values[suffix] = Some(value);
        Ok(())
    }

    pub(crate) fn get_value(&self, suffix: u8) -> Option<[u8; VALUE_LENGTH]> {
        self.values[suffix as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::committer::stem_scalar;
    use verkle_multipoint::lagrange_basis::LagrangeBasis;

    fn full_leaf_commitment(leaf: &LeafNode) -> ExtendedPoint {
        // recompute everything from scratch in dense form
        let mut c1_values = vec![Fr::zero(); VERKLE_NODE_WIDTH];
        let mut c2_values = vec![Fr::zero(); VERKLE_NODE_WIDTH];
        for suffix in 0..VERKLE_NODE_WIDTH {
            let (low, high) = committer::value_scalars(leaf.values[suffix].as_ref());
            let half = if suffix < 128 {
                &mut c1_values
            } else {
                &mut c2_values
            };
            half[2 * (suffix % 128)] = low;
            half[2 * (suffix % 128) + 1] = high;
        }
        let c1 = DEFAULT_CRS.commit_lagrange_poly(&LagrangeBasis::new(c1_values));
        let c2 = DEFAULT_CRS.commit_lagrange_poly(&LagrangeBasis::new(c2_values));
        assert_eq!(c1, leaf.c1);
        assert_eq!(c2, leaf.c2);

        DEFAULT_CRS.commit_sparse(&[
            (0, Fr::one()),
            (1, stem_scalar(&leaf.stem)),
            (2, c1.map_to_scalar_field().unwrap()),
            (3, c2.map_to_scalar_field().unwrap()),
        ])
    }

    #[test]
    fn delta_updates_match_recomputation() {
        let mut leaf = LeafNode::new([7u8; 31]);
        leaf.set_value(0, [0x42; 32]).unwrap();
        leaf.set_value(200, [0x01; 32]).unwrap();
        // overwrite an occupied slot
        leaf.set_value(0, [0xff; 32]).unwrap();

        assert_eq!(leaf.commitment, full_leaf_commitment(&leaf));
    }

    #[test]
    fn empty_and_zero_valued_slots_commit_differently() {
        let mut with_zero = LeafNode::new([1u8; 31]);
        with_zero.set_value(5, [0u8; 32]).unwrap();
        let empty = LeafNode::new([1u8; 31]);
        assert_ne!(with_zero.commitment, empty.commitment);
    }

    #[test]
    fn internal_delta_update_matches_sparse_commit() {
        let g = ExtendedPoint::generator();
        let child_a = g.scalar_mul(&Fr::from_u64(17)).map_to_scalar_field().unwrap();
        let child_b = g.scalar_mul(&Fr::from_u64(23)).map_to_scalar_field().unwrap();

        let mut node = InternalNode::new();
        node.update_child_scalar(4, Fr::zero(), child_a);
        node.update_child_scalar(250, Fr::zero(), child_b);

        let expected = DEFAULT_CRS.commit_sparse(&[(4, child_a), (250, child_b)]);
        assert_eq!(node.commitment, expected);

        // replacing a child applies the difference
        node.update_child_scalar(4, child_a, child_b);
        let expected = DEFAULT_CRS.commit_sparse(&[(4, child_b), (250, child_b)]);
        assert_eq!(node.commitment, expected);
    }
}
