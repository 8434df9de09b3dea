//! The common reference string for the Pedersen commitment scheme.
//!
//! `n` value-binding generators plus one blinding generator `q`, all derived
//! deterministically from a seed: SHA-256 of `seed || counter` proposes an
//! x-coordinate, decompression proposes a curve point, and clearing the
//! cofactor lands it in the prime-order subgroup. Nothing about the
//! derivation leaks discrete-log relationships between the generators.

use crate::lagrange_basis::LagrangeBasis;
use bandersnatch::{multi_scalar_mul, AffinePoint, ExtendedPoint, Fp};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone)]
pub struct CRS {
    /// Capacity: the longest vector this key can commit to.
    pub n: usize,
    /// Value-binding generators.
    pub g: Vec<ExtendedPoint>,
    /// Blinding generator.
    pub q: ExtendedPoint,
}

/// Seed of the protocol's canonical 256-slot commitment key.
pub const DEFAULT_SEED: &[u8] = b"eth_verkle_oct_2021";

impl CRS {
    pub fn new(n: usize, seed: &[u8]) -> CRS {
        let all_points = generate_random_points(n + 1, seed);
        assert_dedup(&all_points);

        let (g, q_slice) = all_points.split_at(n);
        CRS {
            n,
            g: g.to_vec(),
            q: q_slice[0],
        }
    }

    /// Commits to a polynomial in Lagrange form: `Σ f(xᵢ) · gᵢ`.
    pub fn commit_lagrange_poly(&self, polynomial: &LagrangeBasis) -> ExtendedPoint {
        debug_assert!(polynomial.values().len() <= self.n);
        multi_scalar_mul(&self.g[..polynomial.values().len()], polynomial.values())
    }

    /// Commits to a sparse set of `(slot, scalar)` pairs.
    pub fn commit_sparse(&self, entries: &[(usize, verkle_fields::Fr)]) -> ExtendedPoint {
        entries
            .iter()
            .fold(ExtendedPoint::identity(), |acc, (slot, scalar)| {
                acc.add(&self.g[*slot].scalar_mul(scalar))
            })
    }
}

impl std::ops::Index<usize> for CRS {
    type Output = ExtendedPoint;

    fn index(&self, index: usize) -> &Self::Output {
        &self.g[index]
    }
}

/// Hash-to-curve: maps `seed || counter` digests to subgroup points until
/// enough valid ones are found.
fn generate_random_points(num_required_points: usize, seed: &[u8]) -> Vec<ExtendedPoint> {
    let hash_to_x = |counter: u64| -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(seed);
        hasher.update(counter.to_be_bytes());
        hasher.finalize().into()
    };

    (0u64..)
        .map(hash_to_x)
        .filter_map(|candidate| try_point_from_hash(&candidate))
        .take(num_required_points)
        .collect()
}

/// Interprets a digest as a big-endian x-coordinate, decompresses with the
/// positive y and clears the cofactor (4) by doubling twice. Candidates
/// that miss the curve, exceed the field, or collapse to the identity are
/// skipped.
fn try_point_from_hash(bytes: &[u8; 32]) -> Option<ExtendedPoint> {
    let x = Fp::from_bytes_be(bytes)?;
    let point = AffinePoint::from_x(x, true)?;
    let cleared = ExtendedPoint::from_affine(&point).double().double();
    if cleared.is_identity() {
        return None;
    }
    Some(cleared)
}

/// The commitment key loses its binding property if two generators
/// coincide; the derivation makes that astronomically unlikely, so a
/// collision means the seed handling is broken.
fn assert_dedup(points: &[ExtendedPoint]) {
    use std::collections::HashSet;
    let mut seen = HashSet::new();
    for point in points {
        let bytes = point
            .to_bytes()
            .expect("generated points are well-formed");
        assert!(seen.insert(bytes), "commitment key has duplicated points");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verkle_fields::Fr;

    #[test]
    fn generation_is_deterministic() {
        let a = CRS::new(8, b"seed");
        let b = CRS::new(8, b"seed");
        for (p, q) in a.g.iter().zip(&b.g) {
            assert_eq!(p, q);
        }
        assert_eq!(a.q, b.q);

        let c = CRS::new(8, b"other seed");
        assert_ne!(a.g[0], c.g[0]);
    }

    #[test]
    fn generated_points_are_in_the_prime_subgroup() {
        let crs = CRS::new(4, DEFAULT_SEED);
        // multiplying by the group order annihilates subgroup points
        let mut order_minus_one = [0u8; 32];
        for i in 0..4 {
            order_minus_one[8 * i..8 * (i + 1)]
                .copy_from_slice(&Fr::MODULUS[3 - i].to_be_bytes());
        }
        order_minus_one[31] -= 1;
        let scalar = Fr::from_bytes_be(&order_minus_one).unwrap();
        for point in crs.g.iter().chain(std::iter::once(&crs.q)) {
            assert!(point.scalar_mul(&scalar).add(point).is_identity());
        }
    }

    #[test]
    fn sparse_commit_agrees_with_dense_commit() {
        let crs = CRS::new(8, b"seed");
        let mut dense = vec![Fr::zero(); 8];
        dense[1] = Fr::from_u64(10);
        dense[6] = Fr::from_u64(20);
        let dense_commitment = crs.commit_lagrange_poly(&LagrangeBasis::new(dense));
        let sparse_commitment =
            crs.commit_sparse(&[(1, Fr::from_u64(10)), (6, Fr::from_u64(20))]);
        assert_eq!(dense_commitment, sparse_commitment);
    }
}
