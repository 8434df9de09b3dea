use crate::montgomery::montgomery_field;

montgomery_field! {
    /// The Bandersnatch base field: integers modulo
    /// `0x73eda753299d7d483339d80809a1d80553bda402fffe5bfeffffffff00000001`
    /// (the BLS12-381 scalar field prime, 255 bits).
    ///
    /// Curve point coordinates are `Fp` values. Do not confuse this with
    /// [`Fr`](crate::Fr), the group order of the Bandersnatch prime
    /// subgroup.
    Fp {
        modulus: [
            0xFFFF_FFFF_0000_0001,
            0x53BD_A402_FFFE_5BFE,
            0x3339_D808_09A1_D805,
            0x73ED_A753_299D_7D48,
        ],
        modulus_inv_neg: 0xFFFF_FFFE_FFFF_FFFF,
        one: [
            0x0000_0001_FFFF_FFFE,
            0x5884_B7FA_0003_4802,
            0x998C_4FEF_ECBC_4FF5,
            0x1824_B159_ACC5_056F,
        ],
        r_squared: [
            0xC999_E990_F3F2_9C6D,
            0x2B6C_EDCB_8792_5C23,
            0x05D3_1496_7254_398F,
            0x0748_D9D9_9F59_FF11,
        ],
        num_bits: 255,
        two_adicity: 32,
        sqrt_generator: [
            0x9CAB_6D5C_0C17_F47C,
            0x1CE1_E93D_FD4B_71E5,
            0x0D6D_B230_471D_D505,
            0x3F0E_E990_743A_3B6A,
        ],
        exp_legendre: [
            0x7FFF_FFFF_8000_0000,
            0xA9DE_D201_7FFF_2DFF,
            0x199C_EC04_04D0_EC02,
            0x39F6_D3A9_94CE_BEA4,
        ],
        exp_sqrt: [
            0x7FFF_2DFF_7FFF_FFFF,
            0x04D0_EC02_A9DE_D201,
            0x94CE_BEA4_199C_EC04,
            0x0000_0000_39F6_D3A9,
        ],
        exp_inverse: [
            0xFFFF_FFFE_FFFF_FFFF,
            0x53BD_A402_FFFE_5BFE,
            0x3339_D808_09A1_D805,
            0x73ED_A753_299D_7D48,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::Fp;
    use crate::{FieldError, Legendre};
    use rand::{rngs::StdRng, RngCore, SeedableRng};

    fn random_fp(rng: &mut StdRng) -> Fp {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        Fp::from_bytes_le_mod_order(&bytes)
    }

    #[test]
    fn add_commutes() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let a = random_fp(&mut rng);
            let b = random_fp(&mut rng);
            assert_eq!(a.add(&b), b.add(&a));
        }
    }

    #[test]
    fn sub_is_add_of_negation() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..50 {
            let a = random_fp(&mut rng);
            let b = random_fp(&mut rng);
            assert_eq!(a.sub(&b), a.add(&b.neg()));
        }
    }

    #[test]
    fn mul_by_inverse_is_one() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let a = random_fp(&mut rng);
            if a.is_zero() {
                continue;
            }
            let inv = a.inverse().unwrap();
            assert!(a.mul(&inv).is_one());
        }
    }

    #[test]
    fn inverse_of_zero_fails() {
        assert_eq!(Fp::zero().inverse(), Err(FieldError::DivisionByZero));
    }

    #[test]
    fn known_inverse_of_two() {
        let two = Fp::from_u64(2);
        let expected = "39f6d3a994cebea4199cec0404d0ec02a9ded2017fff2dff7fffffff80000001";
        assert_eq!(hex::encode(two.inverse().unwrap().to_bytes_be()), expected);
    }

    #[test]
    fn montgomery_round_trip() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..50 {
            let a = random_fp(&mut rng);
            let bytes = a.to_bytes_be();
            assert_eq!(Fp::from_bytes_be(&bytes), Some(a));
        }
    }

    #[test]
    fn rejects_unreduced_bytes() {
        let mut modulus_bytes = [0u8; 32];
        for i in 0..4 {
            modulus_bytes[8 * i..8 * (i + 1)]
                .copy_from_slice(&Fp::MODULUS[3 - i].to_be_bytes());
        }
        assert_eq!(Fp::from_bytes_be(&modulus_bytes), None);
        assert_eq!(Fp::from_bytes_be(&[0xFF; 32]), None);
    }

    #[test]
    fn sqrt_of_square_round_trips() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let a = random_fp(&mut rng);
            let square = a.square();
            let root = square.sqrt().unwrap();
            assert!(root == a || root == a.neg());
        }
    }

    #[test]
    fn sqrt_of_non_residue_fails() {
        // 7 is a quadratic non-residue in this field
        let seven = Fp::from_u64(7);
        assert_eq!(seven.legendre(), Legendre::NonResidue);
        assert_eq!(seven.sqrt(), Err(FieldError::NotASquare));
    }

    #[test]
    fn negation_of_zero_is_zero() {
        assert!(Fp::zero().neg().is_zero());
    }

    #[test]
    fn bit_len_matches_small_values() {
        assert_eq!(Fp::zero().bit_len(), 0);
        assert_eq!(Fp::one().bit_len(), 1);
        assert_eq!(Fp::from_u64(0xFF).bit_len(), 8);
        assert_eq!(Fp::MODULUS[3].leading_zeros(), 1); // 255-bit prime
    }
}
