use verkle_fields::Fr;

/// Computes the inner product between two scalar vectors.
pub fn inner_product(a: &[Fr], b: &[Fr]) -> Fr {
    a.iter().zip(b.iter()).map(|(a, b)| a.mul(b)).sum()
}

/// `[1, x, x², ..., x^(n-1)]`.
pub fn powers_of(x: Fr, n: usize) -> Vec<Fr> {
    let mut powers = Vec::with_capacity(n);
    if n == 0 {
        return powers;
    }
    powers.push(Fr::one());
    for i in 1..n {
        powers.push(powers[i - 1].mul(&x));
    }
    powers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn powers_form_a_geometric_sequence() {
        let x = Fr::from_u64(3);
        let powers = powers_of(x, 6);
        assert_eq!(powers[0], Fr::one());
        for i in 1..6 {
            assert_eq!(powers[i], powers[i - 1].mul(&x));
        }
        assert_eq!(powers[5], Fr::from_u64(243));
    }

    #[test]
    fn inner_product_matches_hand_computation() {
        let a: Vec<Fr> = [1u64, 2, 3].into_iter().map(Fr::from_u64).collect();
        let b: Vec<Fr> = [4u64, 5, 6].into_iter().map(Fr::from_u64).collect();
        assert_eq!(inner_product(&a, &b), Fr::from_u64(32));
    }
}
