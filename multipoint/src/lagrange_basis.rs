//! Polynomials in evaluation (Lagrange) form over the domain
//! `{0, 1, ..., n-1}`.
//!
//! Everything the multiproof needs happens in evaluation form; coefficients
//! are never materialized. The barycentric weights `A'(xⱼ) = Π_{i≠j}(xⱼ-xᵢ)`
//! and the small-integer inverses are computed once per domain size and
//! shared between prover and verifier.

use verkle_fields::Fr;

/// Barycentric weights and domain inverses for a fixed domain size.
#[derive(Debug, Clone)]
pub struct PrecomputedWeights {
    /// `A'(xⱼ)` for every domain point.
    weights: Vec<Fr>,
    /// `1 / A'(xⱼ)` for every domain point.
    inverse_weights: Vec<Fr>,
    /// `1 / k` for `k` in `1..n`; index 0 is unused.
    domain_inverses: Vec<Fr>,
    domain_size: usize,
}

impl PrecomputedWeights {
    pub fn new(domain_size: usize) -> Self {
        let mut weights = Vec::with_capacity(domain_size);
        for j in 0..domain_size {
            let mut weight = Fr::one();
            for i in 0..domain_size {
                if i == j {
                    continue;
                }
                let diff = if j > i {
                    Fr::from_u64((j - i) as u64)
                } else {
                    Fr::from_u64((i - j) as u64).neg()
                };
                weight = weight.mul(&diff);
            }
            weights.push(weight);
        }

        let mut inverse_weights = weights.clone();
        Fr::batch_inverse(&mut inverse_weights);

        let mut domain_inverses: Vec<Fr> =
            (0..domain_size).map(|k| Fr::from_u64(k as u64)).collect();
        Fr::batch_inverse(&mut domain_inverses);

        Self {
            weights,
            inverse_weights,
            domain_inverses,
            domain_size,
        }
    }

    pub fn domain_size(&self) -> usize {
        self.domain_size
    }

    /// `1 / (xᵢ - xⱼ)` for two distinct domain points.
    fn inverse_of_difference(&self, i: usize, j: usize) -> Fr {
        if i > j {
            self.domain_inverses[i - j]
        } else {
            self.domain_inverses[j - i].neg()
        }
    }

    /// `A'(xᵢ) / A'(xⱼ)`.
    fn weight_ratio(&self, i: usize, j: usize) -> Fr {
        self.weights[i].mul(&self.inverse_weights[j])
    }
}

/// A polynomial of degree `< n` stored as its evaluations over the domain.
///
/// The empty polynomial stands for zero regardless of domain size, so sums
/// can start from [`LagrangeBasis::zero`] without knowing `n` up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LagrangeBasis {
    values: Vec<Fr>,
}

impl LagrangeBasis {
    pub fn new(values: Vec<Fr>) -> Self {
        Self { values }
    }

    pub fn zero() -> Self {
        Self { values: Vec::new() }
    }

    pub fn values(&self) -> &[Fr] {
        &self.values
    }

    /// Evaluation at a domain point is an index lookup.
    pub fn evaluate_in_domain(&self, index: usize) -> Fr {
        self.values[index]
    }

    pub fn add(&self, other: &Self) -> Self {
        if self.values.is_empty() {
            return other.clone();
        }
        if other.values.is_empty() {
            return self.clone();
        }
        debug_assert_eq!(self.values.len(), other.values.len());
        Self {
            values: self
                .values
                .iter()
                .zip(&other.values)
                .map(|(a, b)| a.add(b))
                .collect(),
        }
    }

    pub fn sub(&self, other: &Self) -> Self {
        debug_assert_eq!(self.values.len(), other.values.len());
        Self {
            values: self
                .values
                .iter()
                .zip(&other.values)
                .map(|(a, b)| a.sub(b))
                .collect(),
        }
    }

    pub fn scale(&self, scalar: &Fr) -> Self {
        Self {
            values: self.values.iter().map(|v| v.mul(scalar)).collect(),
        }
    }

    /// Divides `f(X) - f(x_index)` by the vanishing linear `(X - x_index)`,
    /// entirely in evaluation form.
    ///
    /// Off the pole the quotient is a pointwise division; the evaluation at
    /// the pole itself follows from the barycentric weights:
    /// `q(x_z) = -Σ_{i≠z} (A'(x_z)/A'(x_i)) · q(x_i)`.
    pub fn divide_by_linear_vanishing(
        &self,
        precomp: &PrecomputedWeights,
        index: usize,
    ) -> LagrangeBasis {
        let n = self.values.len();
        debug_assert_eq!(n, precomp.domain_size());
        let y = self.values[index];

        let mut quotient = vec![Fr::zero(); n];
        for i in 0..n {
            if i == index {
                continue;
            }
            let term = self.values[i]
                .sub(&y)
                .mul(&precomp.inverse_of_difference(i, index));
            quotient[i] = term;
            quotient[index] = quotient[index].sub(&precomp.weight_ratio(index, i).mul(&term));
        }
        LagrangeBasis::new(quotient)
    }

    /// Evaluates every Lagrange basis polynomial at `t`:
    /// `bᵢ = Lᵢ(t) = A(t) / (A'(xᵢ) · (t - xᵢ))`.
    ///
    /// Degenerates to an indicator vector when `t` lies on the domain, so
    /// the result is correct for every `t`.
    pub fn evaluate_lagrange_coefficients(
        precomp: &PrecomputedWeights,
        domain_size: usize,
        t: Fr,
    ) -> Vec<Fr> {
        let mut denominators: Vec<Fr> = (0..domain_size)
            .map(|i| t.sub(&Fr::from_u64(i as u64)))
            .collect();

        if let Some(index) = denominators.iter().position(|d| d.is_zero()) {
            let mut coefficients = vec![Fr::zero(); domain_size];
            coefficients[index] = Fr::one();
            return coefficients;
        }

        let a_of_t = denominators
            .iter()
            .fold(Fr::one(), |acc, d| acc.mul(d));
        Fr::batch_inverse(&mut denominators);

        denominators
            .iter()
            .enumerate()
            .map(|(i, inv)| a_of_t.mul(&precomp.inverse_weights[i]).mul(inv))
            .collect()
    }

    /// Full evaluation of the polynomial at an arbitrary point.
    pub fn evaluate_outside_domain(&self, precomp: &PrecomputedWeights, t: Fr) -> Fr {
        let coefficients =
            Self::evaluate_lagrange_coefficients(precomp, self.values.len(), t);
        crate::math_utils::inner_product(&self.values, &coefficients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // f(x) = x² + 1 over the domain {0..7}
    fn square_plus_one() -> LagrangeBasis {
        LagrangeBasis::new((0..8u64).map(|i| Fr::from_u64(i * i + 1)).collect())
    }

    #[test]
    fn coefficients_sum_to_one() {
        // Lagrange coefficients of any point interpolate the constant 1
        let precomp = PrecomputedWeights::new(8);
        let coefficients = LagrangeBasis::evaluate_lagrange_coefficients(
            &precomp,
            8,
            Fr::from_u64(123_456),
        );
        let sum: Fr = coefficients.into_iter().sum();
        assert!(sum.is_one());
    }

    #[test]
    fn outside_domain_evaluation_matches_closed_form() {
        let precomp = PrecomputedWeights::new(8);
        let poly = square_plus_one();
        let t = Fr::from_u64(1000);
        assert_eq!(
            poly.evaluate_outside_domain(&precomp, t),
            Fr::from_u64(1000 * 1000 + 1)
        );
    }

    #[test]
    fn in_domain_coefficients_are_an_indicator() {
        let precomp = PrecomputedWeights::new(8);
        let coefficients =
            LagrangeBasis::evaluate_lagrange_coefficients(&precomp, 8, Fr::from_u64(3));
        for (i, c) in coefficients.iter().enumerate() {
            if i == 3 {
                assert!(c.is_one());
            } else {
                assert!(c.is_zero());
            }
        }
    }

    #[test]
    fn quotient_reconstructs_the_dividend() {
        // (X - z) * q(X) must equal f(X) - f(z) at every other domain point
        let precomp = PrecomputedWeights::new(8);
        let poly = square_plus_one();
        let z = 2usize;
        let quotient = poly.divide_by_linear_vanishing(&precomp, z);
        let y = poly.evaluate_in_domain(z);
        for i in 0..8 {
            if i == z {
                continue;
            }
            let x_minus_z = Fr::from_u64(i as u64).sub(&Fr::from_u64(z as u64));
            assert_eq!(
                quotient.evaluate_in_domain(i).mul(&x_minus_z),
                poly.evaluate_in_domain(i).sub(&y)
            );
        }
    }

    #[test]
    fn quotient_is_consistent_outside_the_domain() {
        // for f(x) = x² + 1 and z = 2: q(X) = X + 2 exactly
        let precomp = PrecomputedWeights::new(8);
        let poly = square_plus_one();
        let quotient = poly.divide_by_linear_vanishing(&precomp, 2);
        let t = Fr::from_u64(50);
        assert_eq!(
            quotient.evaluate_outside_domain(&precomp, t),
            Fr::from_u64(52)
        );
        // including at the pole itself
        assert_eq!(quotient.evaluate_in_domain(2), Fr::from_u64(4));
    }

    #[test]
    fn empty_polynomial_is_an_additive_identity() {
        let poly = square_plus_one();
        assert_eq!(LagrangeBasis::zero().add(&poly), poly);
        assert_eq!(poly.add(&LagrangeBasis::zero()), poly);
    }
}
