//! Multiproofs over the tree: membership and non-membership of many keys
//! in one opening argument.
//!
//! A proof carries three parts: per-key hints (resolution depth and how
//! the stem resolved), the deduplicated commitments the openings touch,
//! and a single [`MultiPointProof`] over every opening. Prover and
//! verifier enumerate openings over the same deterministic order (keys
//! sorted ascending, each key's path walked root-down), so the verifier
//! can re-associate the flat commitment list with tree positions without
//! any access to the tree.

mod prover;
mod verifier;

pub use prover::create_proof;
pub use verifier::verify_proof;

use crate::committer::STEM_LENGTH;
use crate::error::VerkleError;
use crate::node::NodeId;
use verkle_multipoint::multiproof::MultiPointProof;

/// Transcript label binding proofs to this protocol.
pub(crate) const TRANSCRIPT_LABEL: &[u8] = b"verkle";

/// How a queried stem resolved during traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtPresent {
    /// Traversal hit an empty child slot; nothing with this stem prefix
    /// exists.
    None,
    /// Traversal reached a leaf holding a different stem; the colliding
    /// stem is recorded in the hint.
    DifferentStem,
    /// A leaf holds exactly this stem.
    Present,
}

impl ExtPresent {
    fn to_byte(self) -> u8 {
        match self {
            ExtPresent::None => 0,
            ExtPresent::DifferentStem => 1,
            ExtPresent::Present => 2,
        }
    }

    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(ExtPresent::None),
            1 => Some(ExtPresent::DifferentStem),
            2 => Some(ExtPresent::Present),
            _ => None,
        }
    }
}

/// Per-key traversal outcomes, aligned with the sorted deduplicated key
/// set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationHint {
    /// Internal levels traversed before resolution, per key; 1 means the
    /// key resolved among the root's children.
    pub depths: Vec<u8>,
    /// Resolution kind per key.
    pub extension_present: Vec<ExtPresent>,
    /// The colliding stem for each `DifferentStem` key, in key order.
    pub different_stem_no_proof: Vec<[u8; STEM_LENGTH]>,
}

/// A batch (non-)membership proof against one root commitment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerkleProof {
    pub verify_hint: VerificationHint,
    /// Compressed commitments in first-use order; the first entry is the
    /// root commitment.
    pub comms_sorted: Vec<[u8; 32]>,
    pub proof: MultiPointProof,
}

impl VerkleProof {
    pub fn to_bytes(&self) -> Result<Vec<u8>, VerkleError> {
        let hint = &self.verify_hint;
        let mut bytes = Vec::new();

        bytes.extend((hint.depths.len() as u32).to_le_bytes());
        bytes.extend(&hint.depths);
        bytes.extend(hint.extension_present.iter().map(|e| e.to_byte()));

        bytes.extend((hint.different_stem_no_proof.len() as u32).to_le_bytes());
        for stem in &hint.different_stem_no_proof {
            bytes.extend(stem);
        }

        bytes.extend((self.comms_sorted.len() as u32).to_le_bytes());
        for comm in &self.comms_sorted {
            bytes.extend(comm);
        }

        bytes.extend(self.proof.to_bytes()?);
        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<VerkleProof, VerkleError> {
        let mut cursor = Cursor { bytes, offset: 0 };

        let key_count = cursor.read_u32()? as usize;
        let depths = cursor.read_slice(key_count)?.to_vec();
        let extension_present = cursor
            .read_slice(key_count)?
            .iter()
            .map(|&b| ExtPresent::from_byte(b))
            .collect::<Option<Vec<_>>>()
            .ok_or(VerkleError::MalformedProof("unknown extension tag"))?;

        let stem_count = cursor.read_u32()? as usize;
        let mut different_stem_no_proof = Vec::with_capacity(stem_count);
        for _ in 0..stem_count {
            let stem: [u8; STEM_LENGTH] = cursor
                .read_slice(STEM_LENGTH)?
                .try_into()
                .map_err(|_| VerkleError::MalformedProof("truncated stem"))?;
            different_stem_no_proof.push(stem);
        }

        let comm_count = cursor.read_u32()? as usize;
        let mut comms_sorted = Vec::with_capacity(comm_count);
        for _ in 0..comm_count {
            let comm: [u8; 32] = cursor
                .read_slice(32)?
                .try_into()
                .map_err(|_| VerkleError::MalformedProof("truncated commitment"))?;
            comms_sorted.push(comm);
        }

        let proof =
            MultiPointProof::from_bytes(cursor.rest(), crate::committer::VERKLE_NODE_WIDTH)?;

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
}

struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn read_slice(&mut self, len: usize) -> Result<&'a [u8], VerkleError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(VerkleError::MalformedProof("truncated proof"))?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn read_u32(&mut self) -> Result<u32, VerkleError> {
        let bytes: [u8; 4] = self
            .read_slice(4)?
            .try_into()
            .map_err(|_| VerkleError::MalformedProof("truncated proof"))?;
        Ok(u32::from_le_bytes(bytes))
    }

    fn rest(&self) -> &'a [u8] {
        &self.bytes[self.offset..]
    }
}

/// A position whose commitment the proof must carry: either the node at a
/// stem prefix, or one suffix-half commitment of the leaf at a stem.
///
/// Both sides key their commitment dedup maps by this, which pins the
/// first-use order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum CommKey {
    Path(Vec<u8>),
    SuffixHalf([u8; STEM_LENGTH], u8),
}

/// Internal walk outcome shared by the prover's hint derivation.
pub(crate) enum Terminal {
    Empty,
    Leaf(NodeId),
}
