//! Multipoint opening: reduces many `(commitment, point, result)` claims
//! to a single inner-product argument.
//!
//! The prover aggregates all claimed openings with powers of a challenge
//! `r`, commits to the combined quotient polynomial `g(X)`, and opens
//! `g₁(X) - g(X)` at a fresh challenge `t` with one IPA. The verifier
//! reconstructs the commitment to `g₁` and the value `g₂(t)` from the
//! claims alone, so proof size is independent of the number of claims.

use crate::crs::CRS;
use crate::ipa::IPAProof;
use crate::lagrange_basis::{LagrangeBasis, PrecomputedWeights};
use crate::math_utils::powers_of;
use crate::transcript::Transcript;
use crate::IpaError;

use bandersnatch::{multi_scalar_mul, ExtendedPoint};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use verkle_fields::{FieldError, Fr};

pub struct MultiPoint;

/// One opening claim on the prover side: `poly(point) = result`, where
/// `point` is a domain index and `commitment` commits to `poly`.
#[derive(Clone, Debug)]
pub struct ProverQuery {
    pub commitment: ExtendedPoint,
    pub poly: LagrangeBasis,
    pub point: usize,
    pub result: Fr,
}

/// The verifier's view of a claim: the polynomial is gone, only its
/// commitment and the claimed evaluation remain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifierQuery {
    pub commitment: ExtendedPoint,
    pub point: Fr,
    pub result: Fr,
}

impl From<ProverQuery> for VerifierQuery {
    fn from(pq: ProverQuery) -> Self {
        VerifierQuery {
            commitment: pq.commitment,
            point: Fr::from_u64(pq.point as u64),
            result: pq.result,
        }
    }
}

/// Groups queries sharing an evaluation point, pairing each with its
/// power of `r`.
fn group_prover_queries<'a>(
    prover_queries: &'a [ProverQuery],
    challenges: &'a [Fr],
) -> FxHashMap<usize, Vec<(&'a ProverQuery, &'a Fr)>> {
    let mut grouped: FxHashMap<usize, Vec<_>> = FxHashMap::default();
    for (query, challenge) in prover_queries.iter().zip(challenges) {
        grouped
            .entry(query.point)
            .or_default()
            .push((query, challenge));
    }
    grouped
}

/// Absorbs the claims in the order given; the prover and verifier views
/// serialize identically.
trait QueryData {
    fn commitment(&self) -> &ExtendedPoint;
    fn point_as_fr(&self) -> Fr;
    fn result(&self) -> &Fr;
}

impl QueryData for ProverQuery {
    fn commitment(&self) -> &ExtendedPoint {
        &self.commitment
    }
    fn point_as_fr(&self) -> Fr {
        Fr::from_u64(self.point as u64)
    }
    fn result(&self) -> &Fr {
        &self.result
    }
}

impl QueryData for VerifierQuery {
    fn commitment(&self) -> &ExtendedPoint {
        &self.commitment
    }
    fn point_as_fr(&self) -> Fr {
        self.point
    }
    fn result(&self) -> &Fr {
        &self.result
    }
}

fn record_query_transcript<T: QueryData>(
    transcript: &mut Transcript,
    queries: &[T],
) -> Result<(), IpaError> {
    for query in queries {
        transcript.append_point(b"C", query.commitment())?;
        transcript.append_scalar(b"z", &query.point_as_fr());
        transcript.append_scalar(b"y", query.result());
    }
    Ok(())
}

impl MultiPoint {
    /// Proves every query in one batch. All query polynomials must live
    /// on the CRS domain and every `point` must be a domain index.
    pub fn open(
        crs: &CRS,
        precomp: &PrecomputedWeights,
        transcript: &mut Transcript,
        queries: Vec<ProverQuery>,
    ) -> Result<MultiPointProof, IpaError> {
        transcript.domain_sep(b"multiproof");

        record_query_transcript(transcript, &queries)?;

        let r = transcript.challenge_scalar(b"r");
        let powers_of_r = powers_of(r, queries.len());

        // aggregate the polynomials sharing an opening point
        let grouped_queries: Vec<_> = group_prover_queries(&queries, &powers_of_r)
            .into_iter()
            .collect();
        let aggregated_queries: Vec<(usize, LagrangeBasis)> = grouped_queries
            .into_par_iter()
            .map(|(point, queries_challenges)| {
                let aggregated = queries_challenges
                    .iter()
                    .map(|(query, challenge)| query.poly.scale(challenge))
                    .reduce(|acc, poly| acc.add(&poly))
                    .unwrap_or_else(LagrangeBasis::zero);
                (point, aggregated)
            })
            .collect();

        // g(X) = Σ r^i · (f_i(X) - y_i) / (X - z_i)
        let g_x: LagrangeBasis = aggregated_queries
            .par_iter()
            .map(|(point, aggregated)| aggregated.divide_by_linear_vanishing(precomp, *point))
            .reduce(LagrangeBasis::zero, |a, b| a.add(&b));

        let g_x_comm = crs.commit_lagrange_poly(&g_x);
        transcript.append_point(b"D", &g_x_comm)?;

        let t = transcript.challenge_scalar(b"t");

        // g₁(X) = Σ r^i · f_i(X) / (t - z_i), evaluated on the domain
        let mut g1_denominators: Vec<Fr> = aggregated_queries
            .iter()
            .map(|(z_i, _)| t.sub(&Fr::from_u64(*z_i as u64)))
            .collect();
        if g1_denominators.iter().any(Fr::is_zero) {
            // t landed on the domain; the reduction is undefined there
            return Err(IpaError::Field(FieldError::DivisionByZero));
        }
        Fr::batch_inverse(&mut g1_denominators);

        let g1_x = aggregated_queries
            .into_par_iter()
            .zip(g1_denominators)
            .map(|((_, aggregated), denominator_inverse)| aggregated.scale(&denominator_inverse))
            .reduce(LagrangeBasis::zero, |a, b| a.add(&b));

        let g1_comm = crs.commit_lagrange_poly(&g1_x);
        transcript.append_point(b"E", &g1_comm)?;

        // the IPA opens g₁(X) - g(X) at t
        let g3_x = g1_x.sub(&g_x);
        let g3_comm = g1_comm.sub(&g_x_comm);

        let open_proof = open_point_outside_of_domain(crs, precomp, transcript, g3_x, g3_comm, t)?;

        Ok(MultiPointProof {
            open_proof,
            g_x_comm,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiPointProof {
    open_proof: IPAProof,
    g_x_comm: ExtendedPoint,
}

impl MultiPointProof {
    pub fn new(open_proof: IPAProof, g_x_comm: ExtendedPoint) -> Self {
        Self {
            open_proof,
            g_x_comm,
        }
    }

    /// Commitment `D` to the quotient polynomial `g(X)`.
    pub fn quotient_commitment(&self) -> &ExtendedPoint {
        &self.g_x_comm
    }

    pub fn serialized_size(&self) -> usize {
        32 + self.open_proof.serialized_size()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, IpaError> {
        let mut bytes = Vec::with_capacity(self.serialized_size());
        bytes.extend(self.g_x_comm.to_bytes().map_err(IpaError::Curve)?);
        bytes.extend(self.open_proof.to_bytes()?);
        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8], poly_degree: usize) -> Result<MultiPointProof, IpaError> {
        if bytes.len() < 32 {
            return Err(IpaError::InvalidEncoding);
        }
        let g_x_comm_bytes: [u8; 32] = bytes[0..32]
            .try_into()
            .map_err(|_| IpaError::InvalidEncoding)?;
        let g_x_comm =
            ExtendedPoint::from_bytes(&g_x_comm_bytes).ok_or(IpaError::InvalidEncoding)?;
        let open_proof = IPAProof::from_bytes(&bytes[32..], poly_degree)?;
        Ok(MultiPointProof {
            open_proof,
            g_x_comm,
        })
    }

    /// Verifies the batch. Returns `Ok(false)` on a well-formed but
    /// unsound proof and `Err` only when the transcript cannot absorb a
    /// malformed input.
    pub fn check(
        &self,
        crs: &CRS,
        precomp: &PrecomputedWeights,
        queries: &[VerifierQuery],
        transcript: &mut Transcript,
    ) -> Result<bool, IpaError> {
        transcript.domain_sep(b"multiproof");

        record_query_transcript(transcript, queries)?;

        let r = transcript.challenge_scalar(b"r");
        let powers_of_r = powers_of(r, queries.len());

        transcript.append_point(b"D", &self.g_x_comm)?;
        let t = transcript.challenge_scalar(b"t");

        // helperᵢ = rⁱ / (t - zᵢ)
        let mut g2_denominators: Vec<Fr> =
            queries.iter().map(|query| t.sub(&query.point)).collect();
        if g2_denominators.iter().any(Fr::is_zero) {
            return Ok(false);
        }
        Fr::batch_inverse(&mut g2_denominators);

        let helper_scalars: Vec<Fr> = powers_of_r
            .into_iter()
            .zip(g2_denominators)
            .map(|(r_i, denominator_inverse)| r_i.mul(&denominator_inverse))
            .collect();

        // g₂(t) = Σ helperᵢ · yᵢ
        let g2_t: Fr = helper_scalars
            .iter()
            .zip(queries)
            .map(|(helper, query)| helper.mul(&query.result))
            .sum();

        // E = [g₁(X)] = Σ helperᵢ · Cᵢ
        let comms: Vec<ExtendedPoint> = queries.iter().map(|query| query.commitment).collect();
        let g1_comm = multi_scalar_mul(&comms, &helper_scalars);
        transcript.append_point(b"E", &g1_comm)?;

        let g3_comm = g1_comm.sub(&self.g_x_comm);

        let b = LagrangeBasis::evaluate_lagrange_coefficients(precomp, crs.n, t);
        self.open_proof
            .verify_multiexp(transcript, crs, b, g3_comm, t, g2_t)
    }
}

pub(crate) fn open_point_outside_of_domain(
    crs: &CRS,
    precomp: &PrecomputedWeights,
    transcript: &mut Transcript,
    polynomial: LagrangeBasis,
    commitment: ExtendedPoint,
    z_i: Fr,
) -> Result<IPAProof, IpaError> {
    let a = polynomial.values().to_vec();
    let b = LagrangeBasis::evaluate_lagrange_coefficients(precomp, crs.n, z_i);
    crate::ipa::create(transcript, crs, a, commitment, b, z_i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_poly() -> LagrangeBasis {
        LagrangeBasis::new(
            [1u64, 10, 200, 78]
                .into_iter()
                .map(Fr::from_u64)
                .collect(),
        )
    }

    #[test]
    fn open_multiproof_lagrange() {
        let poly = test_poly();
        let n = poly.values().len();

        let point = 1;
        let y_i = poly.evaluate_in_domain(point);

        let crs = CRS::new(n, b"random seed");
        let poly_comm = crs.commit_lagrange_poly(&poly);

        let prover_query = ProverQuery {
            commitment: poly_comm,
            poly,
            point,
            result: y_i,
        };

        let precomp = PrecomputedWeights::new(n);

        let mut transcript = Transcript::new(b"foo");
        let multiproof = MultiPoint::open(
            &crs,
            &precomp,
            &mut transcript,
            vec![prover_query.clone()],
        )
        .unwrap();

        let mut transcript = Transcript::new(b"foo");
        let verifier_query: VerifierQuery = prover_query.into();
        assert!(multiproof
            .check(&crs, &precomp, &[verifier_query], &mut transcript)
            .unwrap());
    }

    #[test]
    fn open_multiproof_lagrange_2_polys() {
        let poly = test_poly();
        let n = poly.values().len();

        let z_i = 1;
        let y_i = poly.evaluate_in_domain(z_i);
        let x_j = 2;
        let y_j = poly.evaluate_in_domain(x_j);

        let crs = CRS::new(n, b"random seed");
        let poly_comm = crs.commit_lagrange_poly(&poly);

        let prover_query_i = ProverQuery {
            commitment: poly_comm,
            poly: poly.clone(),
            point: z_i,
            result: y_i,
        };
        let prover_query_j = ProverQuery {
            commitment: poly_comm,
            poly,
            point: x_j,
            result: y_j,
        };

        let precomp = PrecomputedWeights::new(n);

        let mut transcript = Transcript::new(b"foo");
        let multiproof = MultiPoint::open(
            &crs,
            &precomp,
            &mut transcript,
            vec![prover_query_i.clone(), prover_query_j.clone()],
        )
        .unwrap();

        let mut transcript = Transcript::new(b"foo");
        let verifier_query_i: VerifierQuery = prover_query_i.into();
        let verifier_query_j: VerifierQuery = prover_query_j.into();
        assert!(multiproof
            .check(
                &crs,
                &precomp,
                &[verifier_query_i, verifier_query_j],
                &mut transcript,
            )
            .unwrap());
    }

    #[test]
    fn tampered_result_is_rejected() {
        let poly = test_poly();
        let n = poly.values().len();
        let point = 3;
        let y_i = poly.evaluate_in_domain(point);

        let crs = CRS::new(n, b"random seed");
        let poly_comm = crs.commit_lagrange_poly(&poly);

        let prover_query = ProverQuery {
            commitment: poly_comm,
            poly,
            point,
            result: y_i,
        };

        let precomp = PrecomputedWeights::new(n);
        let mut transcript = Transcript::new(b"foo");
        let multiproof = MultiPoint::open(
            &crs,
            &precomp,
            &mut transcript,
            vec![prover_query.clone()],
        )
        .unwrap();

        let mut verifier_query: VerifierQuery = prover_query.into();
        verifier_query.result = verifier_query.result.add(&Fr::one());

        let mut transcript = Transcript::new(b"foo");
        assert!(!multiproof
            .check(&crs, &precomp, &[verifier_query], &mut transcript)
            .unwrap());
    }

    #[test]
    fn tampered_commitment_is_rejected() {
        let poly = test_poly();
        let n = poly.values().len();
        let point = 0;
        let y_i = poly.evaluate_in_domain(point);

        let crs = CRS::new(n, b"random seed");
        let poly_comm = crs.commit_lagrange_poly(&poly);

        let prover_query = ProverQuery {
            commitment: poly_comm,
            poly,
            point,
            result: y_i,
        };

        let precomp = PrecomputedWeights::new(n);
        let mut transcript = Transcript::new(b"foo");
        let multiproof =
            MultiPoint::open(&crs, &precomp, &mut transcript, vec![prover_query.clone()])
                .unwrap();

        let mut verifier_query: VerifierQuery = prover_query.into();
        verifier_query.commitment = verifier_query
            .commitment
            .add(&bandersnatch::ExtendedPoint::generator());

        let mut transcript = Transcript::new(b"foo");
        assert!(!multiproof
            .check(&crs, &precomp, &[verifier_query], &mut transcript)
            .unwrap());
    }

    #[test]
    fn multiproof_serialization_round_trips() {
        let poly = test_poly();
        let n = poly.values().len();
        let point = 2;
        let y_i = poly.evaluate_in_domain(point);

        let crs = CRS::new(n, b"random seed");
        let poly_comm = crs.commit_lagrange_poly(&poly);

        let prover_query = ProverQuery {
            commitment: poly_comm,
            poly,
            point,
            result: y_i,
        };

        let precomp = PrecomputedWeights::new(n);
        let mut transcript = Transcript::new(b"foo");
        let multiproof =
            MultiPoint::open(&crs, &precomp, &mut transcript, vec![prover_query]).unwrap();

        let bytes = multiproof.to_bytes().unwrap();
        assert_eq!(bytes.len(), multiproof.serialized_size());
        let decoded = MultiPointProof::from_bytes(&bytes, n).unwrap();
        assert_eq!(decoded, multiproof);
    }
}
