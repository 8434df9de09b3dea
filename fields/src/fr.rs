use crate::montgomery::montgomery_field;

montgomery_field! {
    /// The Bandersnatch scalar field: integers modulo
    /// `0x1cfb69d4ca675f520cce760202687600ff8f87007419047174fd06b52876e7e1`
    /// (the order of the Bandersnatch prime-order subgroup, 253 bits).
    ///
    /// Scalars multiplying curve points, polynomial evaluations and
    /// transcript challenges are `Fr` values.
    Fr {
        modulus: [
            0x74FD_06B5_2876_E7E1,
            0xFF8F_8700_7419_0471,
            0x0CCE_7602_0268_7600,
            0x1CFB_69D4_CA67_5F52,
        ],
        modulus_inv_neg: 0xF19F_2229_5CC0_63DF,
        one: [
            0x5817_CA56_BC48_C0F8,
            0x0383_C7FC_5F37_DC74,
            0x998C_4FEF_ECBC_4FF8,
            0x1824_B159_ACC5_056F,
        ],
        r_squared: [
            0xDBB4_F5D6_58DB_47CB,
            0x40FA_7CA2_7FEC_B938,
            0xAA9E_6DAE_C005_5CEA,
            0x0AE7_93DD_B14A_EC7D,
        ],
        num_bits: 253,
        two_adicity: 5,
        sqrt_generator: [
            0x4B26_3B9A_8D79_C573,
            0xEADB_3D0A_007A_F1FD,
            0xA54C_8A46_6883_2589,
            0x0610_860C_4254_FB9D,
        ],
        exp_legendre: [
            0xBA7E_835A_943B_73F0,
            0x7FC7_C380_3A0C_8238,
            0x0667_3B01_0134_3B00,
            0x0E7D_B4EA_6533_AFA9,
        ],
        exp_sqrt: [
            0xC5D3_F41A_D4A1_DB9F,
            0x03FE_3E1C_01D0_6411,
            0x4833_39D8_0809_A1D8,
            0x0073_EDA7_5329_9D7D,
        ],
        exp_inverse: [
            0x74FD_06B5_2876_E7DF,
            0xFF8F_8700_7419_0471,
            0x0CCE_7602_0268_7600,
            0x1CFB_69D4_CA67_5F52,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::Fr;
    use crate::FieldError;
    use rand::{rngs::StdRng, RngCore, SeedableRng};

    fn random_fr(rng: &mut StdRng) -> Fr {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        Fr::from_bytes_le_mod_order(&bytes)
    }

    #[test]
    fn field_axioms_hold_on_random_samples() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let a = random_fr(&mut rng);
            let b = random_fr(&mut rng);
            let c = random_fr(&mut rng);
            assert_eq!(a.add(&b), b.add(&a));
            assert_eq!(a.mul(&b), b.mul(&a));
            assert_eq!(a.mul(&b.add(&c)), a.mul(&b).add(&a.mul(&c)));
            assert!(a.add(&a.neg()).is_zero());
        }
    }

    #[test]
    fn inverse_round_trips() {
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..50 {
            let a = random_fr(&mut rng);
            if a.is_zero() {
                continue;
            }
            assert!(a.mul(&a.inverse().unwrap()).is_one());
        }
        assert_eq!(Fr::zero().inverse(), Err(FieldError::DivisionByZero));
    }

    #[test]
    fn bytes_round_trip_both_endiannesses() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            let a = random_fr(&mut rng);
            assert_eq!(Fr::from_bytes_be(&a.to_bytes_be()), Some(a));
            assert_eq!(Fr::from_bytes_le_mod_order(&a.to_bytes_le()), a);
        }
    }

    #[test]
    fn from_u64_matches_repeated_addition() {
        let mut acc = Fr::zero();
        for _ in 0..100 {
            acc = acc.add(&Fr::one());
        }
        assert_eq!(acc, Fr::from_u64(100));
    }

    #[test]
    fn batch_inverse_skips_zeros() {
        let mut rng = StdRng::seed_from_u64(10);
        let originals: Vec<Fr> = (0..16)
            .map(|i| {
                if i % 5 == 0 {
                    Fr::zero()
                } else {
                    random_fr(&mut rng)
                }
            })
            .collect();
        let mut inverted = originals.clone();
        Fr::batch_inverse(&mut inverted);
        for (orig, inv) in originals.iter().zip(&inverted) {
            if orig.is_zero() {
                assert!(inv.is_zero());
            } else {
                assert!(orig.mul(inv).is_one());
            }
        }
    }

    #[test]
    fn sqrt_in_low_two_adicity_field() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let a = random_fr(&mut rng);
            let square = a.square();
            let root = square.sqrt().unwrap();
            assert_eq!(root.square(), square);
        }
    }

    #[test]
    fn value_ordering_is_on_regular_form() {
        use core::cmp::Ordering;
        let one = Fr::one();
        let two = Fr::from_u64(2);
        assert_eq!(one.cmp_value(&two), Ordering::Less);
        assert_eq!(two.cmp_value(&one), Ordering::Greater);
        assert_eq!(two.cmp_value(&two), Ordering::Equal);
    }
}
