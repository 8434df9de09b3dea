//! Stateless proof verification: rebuilds the expected openings from the
//! hints and the claimed key/value pairs alone, then checks the batched
//! opening argument against the root.

use crate::committer::{self, DEFAULT_CRS, KEY_LENGTH, PRECOMPUTED_WEIGHTS, STEM_LENGTH, VALUE_LENGTH};
use crate::error::VerkleError;
use crate::proof::{CommKey, ExtPresent, VerkleProof, TRANSCRIPT_LABEL};

use bandersnatch::ExtendedPoint;
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use verkle_fields::Fr;
use verkle_multipoint::multiproof::VerifierQuery;
use verkle_multipoint::transcript::Transcript;

/// Hands out commitments from the proof's flat list in the same first-use
/// order the prover recorded them.
struct CommAssigner<'a> {
    comms: &'a [ExtendedPoint],
    index_of: FxHashMap<CommKey, usize>,
    next: usize,
}

impl CommAssigner<'_> {
    fn assign(&mut self, key: CommKey) -> Result<usize, VerkleError> {
        if let Some(&index) = self.index_of.get(&key) {
            return Ok(index);
        }
        if self.next >= self.comms.len() {
            return Err(VerkleError::MalformedProof(
                "fewer commitments than the hints imply",
            ));
        }
        let index = self.next;
        self.next += 1;
        self.index_of.insert(key, index);
        Ok(index)
    }
}

/// Verifies a batch (non-)membership proof against a root hash.
///
/// `values[i]` is the claimed value for `keys[i]`; `None` claims absence.
/// Purely stateless: only the claimed pairs, the hints and the proof's
/// commitments enter the check. Structural inconsistencies yield
/// [`VerkleError::MalformedProof`], cryptographic failures
/// [`VerkleError::ProofInvalid`].
pub fn verify_proof(
    root: Fr,
    keys: &[[u8; KEY_LENGTH]],
    values: &[Option<[u8; VALUE_LENGTH]>],
    proof: &VerkleProof,
) -> Result<(), VerkleError> {
    if keys.len() != values.len() {
        return Err(VerkleError::MalformedProof(
            "key and value counts differ",
        ));
    }
    let mut pairs: Vec<([u8; KEY_LENGTH], Option<[u8; VALUE_LENGTH]>)> =
        keys.iter().copied().zip(values.iter().copied()).collect();
    pairs.sort_unstable_by(|a, b| a.0.cmp(&b.0));
    pairs.dedup();
    if pairs.windows(2).any(|w| w[0].0 == w[1].0) {
        return Err(VerkleError::MalformedProof(
            "conflicting values claimed for one key",
        ));
    }
    if pairs.is_empty() {
        return Err(VerkleError::MalformedProof("empty key set"));
    }

    let hint = &proof.verify_hint;
    if hint.depths.len() != pairs.len() || hint.extension_present.len() != pairs.len() {
        return Err(VerkleError::MalformedProof(
            "hint count does not match the key count",
        ));
    }
    let different_stem_count = hint
        .extension_present
        .iter()
        .filter(|e| **e == ExtPresent::DifferentStem)
        .count();
    if hint.different_stem_no_proof.len() != different_stem_count {
        return Err(VerkleError::MalformedProof(
            "colliding stem count does not match the hints",
        ));
    }

    let comms = proof
        .comms_sorted
        .iter()
        .map(|bytes| {
            ExtendedPoint::from_bytes(bytes)
                .ok_or(VerkleError::MalformedProof("commitment not on the curve"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut assigner = CommAssigner {
        comms: &comms,
        index_of: FxHashMap::default(),
        next: 0,
    };
    let mut queries: Vec<VerifierQuery> = Vec::new();
    // duplicate openings are collapsed, but only when they agree; a hint
    // set that derives two different results for one slot cannot come
    // from any tree
    let mut seen: FxHashMap<(usize, usize), Fr> = FxHashMap::default();
    let mut open = |queries: &mut Vec<VerifierQuery>,
                    seen: &mut FxHashMap<(usize, usize), Fr>,
                    commitment: &ExtendedPoint,
                    index: usize,
                    point: usize,
                    result: Fr|
     -> Result<(), VerkleError> {
        match seen.entry((index, point)) {
            Entry::Occupied(entry) => {
                if !entry.get().equals(&result) {
                    return Err(VerkleError::MalformedProof(
                        "conflicting openings for one commitment slot",
                    ));
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(result);
                queries.push(VerifierQuery {
                    commitment: *commitment,
                    point: Fr::from_u64(point as u64),
                    result,
                });
            }
        }
        Ok(())
    };

    let mut colliding_stems = hint.different_stem_no_proof.iter();
    for (i, (key, value)) in pairs.iter().enumerate() {
        let depth = hint.depths[i] as usize;
        if depth == 0 || depth > STEM_LENGTH {
            return Err(VerkleError::MalformedProof("depth out of range"));
        }
        let ext = hint.extension_present[i];
        let mut stem = [0u8; STEM_LENGTH];
        stem.copy_from_slice(&key[..STEM_LENGTH]);
        let suffix = key[KEY_LENGTH - 1] as usize;

        // an absent key cannot carry a claimed value
        if ext != ExtPresent::Present && value.is_some() {
            return Err(VerkleError::ProofInvalid);
        }

        // assignment, mirroring the prover's registration order
        let mut path_indices = Vec::with_capacity(depth);
        for d in 0..depth {
            path_indices.push(assigner.assign(CommKey::Path(stem[..d].to_vec()))?);
        }
        let leaf_index = match ext {
            ExtPresent::None => None,
            ExtPresent::DifferentStem | ExtPresent::Present => {
                Some(assigner.assign(CommKey::Path(stem[..depth].to_vec()))?)
            }
        };
        let half = (suffix / 128) as u8;
        let suffix_index = match ext {
            ExtPresent::Present => Some(assigner.assign(CommKey::SuffixHalf(stem, half))?),
            _ => None,
        };

        // openings along the internal path
        for d in 0..depth - 1 {
            let result = comms[path_indices[d + 1]].map_to_scalar_field()?;
            open(
                &mut queries,
                &mut seen,
                &comms[path_indices[d]],
                path_indices[d],
                stem[d] as usize,
                result,
            )?;
        }
        let terminal_result = match leaf_index {
            None => Fr::zero(),
            Some(index) => comms[index].map_to_scalar_field()?,
        };
        open(
            &mut queries,
            &mut seen,
            &comms[path_indices[depth - 1]],
            path_indices[depth - 1],
            stem[depth - 1] as usize,
            terminal_result,
        )?;

        // openings inside the leaf
        if let Some(leaf_index) = leaf_index {
            let opened_stem = match ext {
                ExtPresent::Present => stem,
                ExtPresent::DifferentStem => {
                    let other = *colliding_stems
                        .next()
                        .ok_or(VerkleError::MalformedProof("missing colliding stem"))?;
                    if other == stem || other[..depth] != stem[..depth] {
                        return Err(VerkleError::MalformedProof(
                            "colliding stem inconsistent with the queried key",
                        ));
                    }
                    other
                }
                ExtPresent::None => unreachable!("no leaf without an extension"),
            };
            open(
                &mut queries,
                &mut seen,
                &comms[leaf_index],
                leaf_index,
                0,
                Fr::one(),
            )?;
            open(
                &mut queries,
                &mut seen,
                &comms[leaf_index],
                leaf_index,
                1,
                committer::stem_scalar(&opened_stem),
            )?;

            if let Some(suffix_index) = suffix_index {
                let half_mapped = comms[suffix_index].map_to_scalar_field()?;
                open(
                    &mut queries,
                    &mut seen,
                    &comms[leaf_index],
                    leaf_index,
                    2 + half as usize,
                    half_mapped,
                )?;

                let slot = 2 * (suffix % 128);
                let (low, high) = committer::value_scalars(value.as_ref());
                open(
                    &mut queries,
                    &mut seen,
                    &comms[suffix_index],
                    suffix_index,
                    slot,
                    low,
                )?;
                open(
                    &mut queries,
                    &mut seen,
                    &comms[suffix_index],
                    suffix_index,
                    slot + 1,
                    high,
                )?;
            }
        }
    }

    if assigner.next != comms.len() {
        return Err(VerkleError::MalformedProof(
            "more commitments than the hints imply",
        ));
    }

    // bind the first commitment to the claimed root
    if !comms[0].map_to_scalar_field()?.equals(&root) {
        return Err(VerkleError::ProofInvalid);
    }

    let mut transcript = Transcript::new(TRANSCRIPT_LABEL);
    let valid = proof
        .proof
        .check(&DEFAULT_CRS, &PRECOMPUTED_WEIGHTS, &queries, &mut transcript)?;
    if !valid {
        return Err(VerkleError::ProofInvalid);
    }
    Ok(())
}
