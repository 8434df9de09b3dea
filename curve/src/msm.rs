use crate::{CurveError, ExtendedPoint};
use rayon::prelude::*;
use verkle_fields::{Fp, Fr};

/// Multi-scalar multiplication: `Σ scalarᵢ · baseᵢ`.
///
/// Zero scalars are skipped entirely; sparse vectors (the common case when
/// committing to a handful of touched slots) cost only their populated
/// entries. Work is spread across the rayon pool per term.
pub fn multi_scalar_mul(bases: &[ExtendedPoint], scalars: &[Fr]) -> ExtendedPoint {
    debug_assert_eq!(
        bases.len(),
        scalars.len(),
        "number of bases must equal number of scalars"
    );
    bases
        .par_iter()
        .zip(scalars.par_iter())
        .filter(|(_, scalar)| !scalar.is_zero())
        .map(|(base, scalar)| base.scalar_mul(scalar))
        .reduce(ExtendedPoint::identity, |acc, p| acc.add(&p))
}

/// Maps many commitment points to their scalar-field representations with
/// a single batched inversion of the `Z` coordinates.
///
/// Equivalent to calling
/// [`map_to_scalar_field`](ExtendedPoint::map_to_scalar_field) per point,
/// but performs one field inversion instead of `n`.
pub fn batch_map_to_scalar_field(points: &[ExtendedPoint]) -> Result<Vec<Fr>, CurveError> {
    let mut z_coords = Vec::with_capacity(points.len());
    for point in points {
        if point.z.is_zero() && !point.is_identity() {
            tracing::error!(point = ?point, "projective point with zero Z coordinate");
            return Err(CurveError::InternalInvariantViolation(
                "projective Z coordinate is zero",
            ));
        }
        z_coords.push(point.z);
    }
    Fp::batch_inverse(&mut z_coords);

    Ok(points
        .iter()
        .zip(z_coords)
        .map(|(point, z_inv)| {
            let affine_x = point.x.mul(&z_inv);
            Fr::from_bytes_le_mod_order(&affine_x.to_bytes_le())
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msm_matches_naive_sum() {
        let g = ExtendedPoint::generator();
        let bases: Vec<ExtendedPoint> = (1..=8u64).map(|i| g.scalar_mul(&Fr::from_u64(i))).collect();
        let scalars: Vec<Fr> = (11..=18u64).map(Fr::from_u64).collect();

        let naive = bases
            .iter()
            .zip(&scalars)
            .map(|(b, s)| b.scalar_mul(s))
            .fold(ExtendedPoint::identity(), |acc, p| acc.add(&p));

        assert_eq!(multi_scalar_mul(&bases, &scalars), naive);
    }

    #[test]
    fn msm_with_all_zero_scalars_is_identity() {
        let bases = vec![ExtendedPoint::generator(); 4];
        let scalars = vec![Fr::zero(); 4];
        assert!(multi_scalar_mul(&bases, &scalars).is_identity());
    }

    #[test]
    fn batch_map_agrees_with_single_map() {
        let g = ExtendedPoint::generator();
        let points: Vec<ExtendedPoint> = (1..=6u64)
            .map(|i| g.scalar_mul(&Fr::from_u64(i * 31)))
            .collect();
        let batched = batch_map_to_scalar_field(&points).unwrap();
        for (point, mapped) in points.iter().zip(batched) {
            assert_eq!(point.map_to_scalar_field().unwrap(), mapped);
        }
    }
}
