//! Proof construction: walks every queried key, collects the touched
//! commitments in first-use order and batches all openings into one
//! multipoint argument.

use crate::committer::{
    self, DEFAULT_CRS, KEY_LENGTH, PRECOMPUTED_WEIGHTS, STEM_LENGTH, VERKLE_NODE_WIDTH,
};
use crate::error::VerkleError;
use crate::node::{InternalNode, LeafNode, Node, NodeId};
use crate::proof::{CommKey, ExtPresent, Terminal, VerificationHint, VerkleProof, TRANSCRIPT_LABEL};
use crate::trie::{VerkleTree, ROOT};

use bandersnatch::{batch_map_to_scalar_field, ExtendedPoint};
use rustc_hash::{FxHashMap, FxHashSet};
use verkle_fields::Fr;
use verkle_multipoint::lagrange_basis::LagrangeBasis;
use verkle_multipoint::multiproof::{MultiPoint, ProverQuery};
use verkle_multipoint::transcript::Transcript;

/// Commitments in first-use order, their polynomials, and the
/// deduplicated openings against them.
#[derive(Default)]
struct OpeningSet {
    comms: Vec<ExtendedPoint>,
    polys: Vec<LagrangeBasis>,
    index_of: FxHashMap<CommKey, usize>,
    queries: Vec<(usize, usize, Fr)>,
    seen: FxHashSet<(usize, usize)>,
}

impl OpeningSet {
    fn ensure(
        &mut self,
        key: CommKey,
        build: impl FnOnce() -> Result<(ExtendedPoint, LagrangeBasis), VerkleError>,
    ) -> Result<usize, VerkleError> {
        if let Some(&index) = self.index_of.get(&key) {
            return Ok(index);
        }
        let (commitment, poly) = build()?;
        let index = self.comms.len();
        self.comms.push(commitment);
        self.polys.push(poly);
        self.index_of.insert(key, index);
        Ok(index)
    }

    fn open(&mut self, commitment: usize, point: usize, result: Fr) {
        if self.seen.insert((commitment, point)) {
            self.queries.push((commitment, point, result));
        }
    }
}

/// Proves (non-)membership of every key in one batch.
///
/// Keys are deduplicated and proven in ascending order; the verifier
/// replays the same order.
pub fn create_proof(
    tree: &VerkleTree,
    keys: &[[u8; KEY_LENGTH]],
) -> Result<VerkleProof, VerkleError> {
    let mut sorted: Vec<[u8; KEY_LENGTH]> = keys.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    if sorted.is_empty() {
        return Err(VerkleError::MalformedProof("empty key set"));
    }

    let mut set = OpeningSet::default();
    let mut depths = Vec::with_capacity(sorted.len());
    let mut extension_present = Vec::with_capacity(sorted.len());
    let mut different_stem_no_proof = Vec::new();

    for key in &sorted {
        let mut stem = [0u8; STEM_LENGTH];
        stem.copy_from_slice(&key[..STEM_LENGTH]);
        let suffix = key[KEY_LENGTH - 1] as usize;

        let (internals, terminal) = walk(tree, &stem);
        let depth = internals.len();

        // register the path commitments, root first
        let mut path_indices = Vec::with_capacity(depth);
        for (d, &node_id) in internals.iter().enumerate() {
            let index = set.ensure(CommKey::Path(stem[..d].to_vec()), || {
                let node = internal(tree, node_id);
                Ok((node.commitment, internal_poly(tree, node)?))
            })?;
            path_indices.push(index);
        }

        let leaf_index = match &terminal {
            Terminal::Empty => None,
            Terminal::Leaf(leaf_id) => {
                let leaf = leaf_node(tree, *leaf_id);
                Some((
                    set.ensure(CommKey::Path(stem[..depth].to_vec()), || {
                        Ok((leaf.commitment, leaf_poly(leaf)?))
                    })?,
                    leaf,
                ))
            }
        };

        let ext = match &leaf_index {
            None => ExtPresent::None,
            Some((_, leaf)) if leaf.stem == stem => ExtPresent::Present,
            Some((_, leaf)) => {
                different_stem_no_proof.push(leaf.stem);
                ExtPresent::DifferentStem
            }
        };

        let half = (suffix / 128) as u8;
        let suffix_index = match (&ext, &leaf_index) {
            (ExtPresent::Present, Some((_, leaf))) => Some(set.ensure(
                CommKey::SuffixHalf(stem, half),
                || {
                    let half_commitment = if half == 0 { leaf.c1 } else { leaf.c2 };
                    Ok((half_commitment, suffix_poly(leaf, half)))
                },
            )?),
            _ => None,
        };

        // openings along the internal path
        for d in 0..depth - 1 {
            let result = set.comms[path_indices[d + 1]].map_to_scalar_field()?;
            set.open(path_indices[d], stem[d] as usize, result);
        }
        let terminal_result = match &leaf_index {
            None => Fr::zero(),
            Some((index, _)) => set.comms[*index].map_to_scalar_field()?,
        };
        set.open(
            path_indices[depth - 1],
            stem[depth - 1] as usize,
            terminal_result,
        );

        // openings inside the leaf
        if let Some((index, leaf)) = &leaf_index {
            set.open(*index, 0, Fr::one());
            set.open(*index, 1, committer::stem_scalar(&leaf.stem));
            if let Some(suffix_index) = suffix_index {
                let half_mapped = set.comms[suffix_index].map_to_scalar_field()?;
                set.open(*index, 2 + half as usize, half_mapped);

                let slot = 2 * (suffix % 128);
                let (low, high) = committer::value_scalars(leaf.values[suffix].as_ref());
                set.open(suffix_index, slot, low);
                set.open(suffix_index, slot + 1, high);
            }
        }

        depths.push(depth as u8);
        extension_present.push(ext);
    }

    let comms_sorted = set
        .comms
        .iter()
        .map(|comm| comm.to_bytes().map_err(VerkleError::from))
        .collect::<Result<Vec<[u8; 32]>, _>>()?;

    let queries: Vec<ProverQuery> = set
        .queries
        .iter()
        .map(|&(commitment, point, result)| ProverQuery {
            commitment: set.comms[commitment],
            poly: set.polys[commitment].clone(),
            point,
            result,
        })
        .collect();

    tracing::debug!(
        keys = sorted.len(),
        commitments = comms_sorted.len(),
        openings = queries.len(),
        "building multiproof"
    );

    let mut transcript = Transcript::new(TRANSCRIPT_LABEL);
    let proof = MultiPoint::open(&DEFAULT_CRS, &PRECOMPUTED_WEIGHTS, &mut transcript, queries)?;

    Ok(VerkleProof {
        verify_hint: VerificationHint {
            depths,
            extension_present,
            different_stem_no_proof,
        },
        comms_sorted,
        proof,
    })
}

/// Follows a stem from the root; returns the internal nodes passed
/// through (index = depth) and how the walk ended.
fn walk(tree: &VerkleTree, stem: &[u8; STEM_LENGTH]) -> (Vec<NodeId>, Terminal) {
    let mut internals = Vec::with_capacity(4);
    let mut current = ROOT;
    let mut depth = 0;
    loop {
        internals.push(current);
        let child = internal(tree, current).children[stem[depth] as usize];
        match child {
            None => return (internals, Terminal::Empty),
            Some(child_id) => match &tree.nodes[child_id] {
                Node::Internal(_) => {
                    current = child_id;
                    depth += 1;
                }
                Node::Leaf(_) => return (internals, Terminal::Leaf(child_id)),
            },
        }
    }
}

fn internal(tree: &VerkleTree, id: NodeId) -> &InternalNode {
    match &tree.nodes[id] {
        Node::Internal(node) => node,
        Node::Leaf(_) => unreachable!("path positions hold internal nodes"),
    }
}

fn leaf_node(tree: &VerkleTree, id: NodeId) -> &LeafNode {
    match &tree.nodes[id] {
        Node::Leaf(node) => node,
        Node::Internal(_) => unreachable!("terminal handle points at a leaf"),
    }
}

/// `[map(child₀), …, map(child₂₅₅)]` with zero for empty slots.
fn internal_poly(tree: &VerkleTree, node: &InternalNode) -> Result<LagrangeBasis, VerkleError> {
    let points: Vec<ExtendedPoint> = node
        .children
        .iter()
        .map(|child| match child {
            Some(id) => tree.nodes[*id].commitment(),
            None => ExtendedPoint::identity(),
        })
        .collect();
    Ok(LagrangeBasis::new(batch_map_to_scalar_field(&points)?))
}

/// `[1, stem, map(C1), map(C2), 0, …]`.
fn leaf_poly(leaf: &LeafNode) -> Result<LagrangeBasis, VerkleError> {
    let mut values = vec![Fr::zero(); VERKLE_NODE_WIDTH];
    values[0] = Fr::one();
    values[1] = committer::stem_scalar(&leaf.stem);
    values[2] = leaf.c1.map_to_scalar_field()?;
    values[3] = leaf.c2.map_to_scalar_field()?;
    Ok(LagrangeBasis::new(values))
}

/// The 256 value scalars of one suffix half, two slots per value.
fn suffix_poly(leaf: &LeafNode, half: u8) -> LagrangeBasis {
    let mut values = vec![Fr::zero(); VERKLE_NODE_WIDTH];
    for i in 0..128 {
        let suffix = half as usize * 128 + i;
        let (low, high) = committer::value_scalars(leaf.values[suffix].as_ref());
        values[2 * i] = low;
        values[2 * i + 1] = high;
    }
    LagrangeBasis::new(values)
}
