//! The BCMS20 inner-product argument.
//!
//! Proves knowledge of a vector `a` such that `C = ⟨a, G⟩` and
//! `⟨a, b⟩ = y` for a public vector `b`, in `log₂ n` halving rounds. The
//! blinding generator is weighted by a transcript challenge `w` so the
//! inner-product claim is bound into the same commitment.

use crate::{math_utils::inner_product, transcript::Transcript, IpaError};
use bandersnatch::{multi_scalar_mul, ExtendedPoint};
use rayon::prelude::*;
use verkle_fields::Fr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IPAProof {
    pub(crate) l_vec: Vec<ExtendedPoint>,
    pub(crate) r_vec: Vec<ExtendedPoint>,
    pub(crate) a: Fr,
}

/// Creates an opening for `commitment = ⟨a, G⟩` showing `⟨a, b⟩` at the
/// evaluation point absorbed as `input_point`.
///
/// `a` is the secret evaluation vector, `b` the public Lagrange
/// coefficients of the evaluation point. Both must have the CRS capacity,
/// which must be a power of two.
pub fn create(
    transcript: &mut Transcript,
    crs: &crate::crs::CRS,
    mut a: Vec<Fr>,
    commitment: ExtendedPoint,
    mut b: Vec<Fr>,
    input_point: Fr,
) -> Result<IPAProof, IpaError> {
    debug_assert_eq!(a.len(), crs.n);
    debug_assert_eq!(b.len(), crs.n);
    debug_assert!(crs.n.is_power_of_two());

    transcript.domain_sep(b"ipa");

    let output_point = inner_product(&a, &b);
    transcript.append_point(b"C", &commitment)?;
    transcript.append_scalar(b"input point", &input_point);
    transcript.append_scalar(b"output point", &output_point);
    let w = transcript.challenge_scalar(b"w");
    let q = crs.q.scalar_mul(&w);

    let mut g: Vec<ExtendedPoint> = crs.g.clone();

    let rounds = crs.n.trailing_zeros() as usize;
    let mut l_vec = Vec::with_capacity(rounds);
    let mut r_vec = Vec::with_capacity(rounds);

    while a.len() > 1 {
        let half = a.len() / 2;
        let (a_left, a_right) = a.split_at(half);
        let (b_left, b_right) = b.split_at(half);
        let (g_left, g_right) = g.split_at(half);

        let z_left = inner_product(a_right, b_left);
        let z_right = inner_product(a_left, b_right);

        let c_left = multi_scalar_mul(g_left, a_right).add(&q.scalar_mul(&z_left));
        let c_right = multi_scalar_mul(g_right, a_left).add(&q.scalar_mul(&z_right));

        transcript.append_point(b"L", &c_left)?;
        transcript.append_point(b"R", &c_right)?;
        l_vec.push(c_left);
        r_vec.push(c_right);

        let x = transcript.challenge_scalar(b"x");
        let x_inv = x.inverse()?;

        a = a_left
            .iter()
            .zip(a_right)
            .map(|(l, r)| l.add(&x.mul(r)))
            .collect();
        b = b_left
            .iter()
            .zip(b_right)
            .map(|(l, r)| l.add(&x_inv.mul(r)))
            .collect();
        g = g_left
            .par_iter()
            .zip(g_right)
            .map(|(l, r)| l.add(&r.scalar_mul(&x_inv)))
            .collect();
    }

    Ok(IPAProof {
        l_vec,
        r_vec,
        a: a[0],
    })
}

impl IPAProof {
    /// Verifies the argument with a single multi-scalar multiplication
    /// over the original generators instead of folding them round by
    /// round.
    ///
    /// The folded generator is `⟨s, G⟩` where `sᵢ` multiplies the inverse
    /// challenge of every round in which slot `i` sat in the right half;
    /// `b` folds with the same coefficients.
    pub fn verify_multiexp(
        &self,
        transcript: &mut Transcript,
        crs: &crate::crs::CRS,
        b: Vec<Fr>,
        commitment: ExtendedPoint,
        input_point: Fr,
        output_point: Fr,
    ) -> Result<bool, IpaError> {
        let rounds = crs.n.trailing_zeros() as usize;
        if self.l_vec.len() != rounds || self.r_vec.len() != rounds || b.len() != crs.n {
            return Ok(false);
        }

        transcript.domain_sep(b"ipa");
        transcript.append_point(b"C", &commitment)?;
        transcript.append_scalar(b"input point", &input_point);
        transcript.append_scalar(b"output point", &output_point);
        let w = transcript.challenge_scalar(b"w");
        let q = crs.q.scalar_mul(&w);

        let mut challenges = Vec::with_capacity(rounds);
        for (l, r) in self.l_vec.iter().zip(&self.r_vec) {
            transcript.append_point(b"L", l)?;
            transcript.append_point(b"R", r)?;
            challenges.push(transcript.challenge_scalar(b"x"));
        }
        let mut challenge_inverses = challenges.clone();
        Fr::batch_inverse(&mut challenge_inverses);

        // s_i = Π x_j⁻¹ over rounds j where the j-th most significant bit
        // of i is set
        let s: Vec<Fr> = (0..crs.n)
            .into_par_iter()
            .map(|i| {
                let mut coefficient = Fr::one();
                for (j, x_inv) in challenge_inverses.iter().enumerate() {
                    if (i >> (rounds - 1 - j)) & 1 == 1 {
                        coefficient = coefficient.mul(x_inv);
                    }
                }
                coefficient
            })
            .collect();

        let b_folded = inner_product(&b, &s);

        // P₀ = C + y·Q folds to a·⟨s, G⟩ + a·b_folded·Q after absorbing
        // every round's x·L + x⁻¹·R
        let mut expected = commitment.add(&q.scalar_mul(&output_point));
        for ((l, r), (x, x_inv)) in self
            .l_vec
            .iter()
            .zip(&self.r_vec)
            .zip(challenges.iter().zip(&challenge_inverses))
        {
            expected = expected
                .add(&l.scalar_mul(x))
                .add(&r.scalar_mul(x_inv));
        }

        let folded_scalars: Vec<Fr> = s.iter().map(|s_i| s_i.mul(&self.a)).collect();
        let actual = multi_scalar_mul(&crs.g, &folded_scalars)
            .add(&q.scalar_mul(&self.a.mul(&b_folded)));

        Ok(expected.equals(&actual))
    }

    pub fn serialized_size(&self) -> usize {
        (self.l_vec.len() + self.r_vec.len() + 1) * 32
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, IpaError> {
        let mut bytes = Vec::with_capacity(self.serialized_size());
        for l in &self.l_vec {
            bytes.extend(l.to_bytes().map_err(IpaError::Curve)?);
        }
        for r in &self.r_vec {
            bytes.extend(r.to_bytes().map_err(IpaError::Curve)?);
        }
        bytes.extend(self.a.to_bytes_be());
        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8], poly_degree: usize) -> Result<IPAProof, IpaError> {
        let rounds = poly_degree.trailing_zeros() as usize;
        if bytes.len() != (2 * rounds + 1) * 32 {
            return Err(IpaError::InvalidEncoding);
        }

        let read_point = |offset: usize| -> Result<ExtendedPoint, IpaError> {
            let chunk: [u8; 32] = bytes[offset..offset + 32]
                .try_into()
                .map_err(|_| IpaError::InvalidEncoding)?;
            ExtendedPoint::from_bytes(&chunk).ok_or(IpaError::InvalidEncoding)
        };

        let mut l_vec = Vec::with_capacity(rounds);
        for i in 0..rounds {
            l_vec.push(read_point(32 * i)?);
        }
        let mut r_vec = Vec::with_capacity(rounds);
        for i in 0..rounds {
            r_vec.push(read_point(32 * (rounds + i))?);
        }

        let a_bytes: [u8; 32] = bytes[32 * 2 * rounds..]
            .try_into()
            .map_err(|_| IpaError::InvalidEncoding)?;
        let a = Fr::from_bytes_be(&a_bytes).ok_or(IpaError::InvalidEncoding)?;

        Ok(IPAProof { l_vec, r_vec, a })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::CRS;
    use crate::lagrange_basis::{LagrangeBasis, PrecomputedWeights};

    fn setup(n: usize) -> (CRS, PrecomputedWeights, Vec<Fr>) {
        let crs = CRS::new(n, b"ipa test seed");
        let precomp = PrecomputedWeights::new(n);
        let poly: Vec<Fr> = (0..n).map(|i| Fr::from_u64(((i % 16) + 3) as u64)).collect();
        (crs, precomp, poly)
    }

    #[test]
    fn opening_verifies() {
        let n = 32;
        let (crs, precomp, poly) = setup(n);
        let commitment = crs.commit_lagrange_poly(&LagrangeBasis::new(poly.clone()));

        let input_point = Fr::from_u64(99_999);
        let b = LagrangeBasis::evaluate_lagrange_coefficients(&precomp, n, input_point);
        let output_point = inner_product(&poly, &b);

        let mut prover_transcript = Transcript::new(b"test");
        let proof = create(
            &mut prover_transcript,
            &crs,
            poly,
            commitment,
            b.clone(),
            input_point,
        )
        .unwrap();

        let mut verifier_transcript = Transcript::new(b"test");
        assert!(proof
            .verify_multiexp(
                &mut verifier_transcript,
                &crs,
                b,
                commitment,
                input_point,
                output_point,
            )
            .unwrap());

        // prover and verifier finish with the same transcript state
        let p = prover_transcript.challenge_scalar(b"state");
        let v = verifier_transcript.challenge_scalar(b"state");
        assert_eq!(p, v);
    }

    #[test]
    fn wrong_claimed_output_is_rejected() {
        let n = 32;
        let (crs, precomp, poly) = setup(n);
        let commitment = crs.commit_lagrange_poly(&LagrangeBasis::new(poly.clone()));

        let input_point = Fr::from_u64(7);
        let b = LagrangeBasis::evaluate_lagrange_coefficients(&precomp, n, input_point);
        let output_point = inner_product(&poly, &b);

        let mut prover_transcript = Transcript::new(b"test");
        let proof = create(
            &mut prover_transcript,
            &crs,
            poly,
            commitment,
            b.clone(),
            input_point,
        )
        .unwrap();

        let mut verifier_transcript = Transcript::new(b"test");
        assert!(!proof
            .verify_multiexp(
                &mut verifier_transcript,
                &crs,
                b,
                commitment,
                input_point,
                output_point.add(&Fr::one()),
            )
            .unwrap());
    }

    #[test]
    fn serialization_round_trips() {
        let n = 16;
        let (crs, precomp, poly) = setup(n);
        let commitment = crs.commit_lagrange_poly(&LagrangeBasis::new(poly.clone()));
        let input_point = Fr::from_u64(1234);
        let b = LagrangeBasis::evaluate_lagrange_coefficients(&precomp, n, input_point);

        let mut transcript = Transcript::new(b"test");
        let proof = create(&mut transcript, &crs, poly, commitment, b, input_point).unwrap();

        let bytes = proof.to_bytes().unwrap();
        assert_eq!(bytes.len(), proof.serialized_size());
        let decoded = IPAProof::from_bytes(&bytes, n).unwrap();
        assert_eq!(decoded, proof);

        assert!(matches!(
            IPAProof::from_bytes(&bytes[..bytes.len() - 1], n),
            Err(IpaError::InvalidEncoding)
        ));
    }
}
