//! Process-wide commitment parameters and the scalar encodings of stems
//! and stored values.

use once_cell::sync::Lazy;
use verkle_fields::Fr;
use verkle_multipoint::crs::{CRS, DEFAULT_SEED};
use verkle_multipoint::lagrange_basis::PrecomputedWeights;

/// Fan-out of internal nodes and slot count of leaves.
pub const VERKLE_NODE_WIDTH: usize = 256;

/// Length of a stem, the leading bytes of a key shared by one leaf.
pub const STEM_LENGTH: usize = 31;

/// Length of a full key: a stem plus the suffix byte selecting a value
/// slot.
pub const KEY_LENGTH: usize = 32;

/// Length of a stored value.
pub const VALUE_LENGTH: usize = 32;

/// The canonical 256-slot commitment key shared by every tree.
pub static DEFAULT_CRS: Lazy<CRS> = Lazy::new(|| CRS::new(VERKLE_NODE_WIDTH, DEFAULT_SEED));

/// Barycentric weights over the domain `{0..255}`, shared by prover and
/// verifier.
pub static PRECOMPUTED_WEIGHTS: Lazy<PrecomputedWeights> =
    Lazy::new(|| PrecomputedWeights::new(VERKLE_NODE_WIDTH));

/// A stem as a scalar: 31 little-endian bytes, always below the modulus.
pub(crate) fn stem_scalar(stem: &[u8; STEM_LENGTH]) -> Fr {
    Fr::from_bytes_le_mod_order(stem)
}

/// The two scalars a value slot contributes to its suffix-half polynomial.
///
/// The low half carries a 2¹²⁸ marker so that a stored all-zero value is
/// distinguishable from an empty slot; the high half is the upper 16 bytes
/// as-is. An empty slot contributes `(0, 0)`.
pub(crate) fn value_scalars(value: Option<&[u8; VALUE_LENGTH]>) -> (Fr, Fr) {
    match value {
        None => (Fr::zero(), Fr::zero()),
        Some(value) => {
            let mut low = [0u8; 17];
            low[..16].copy_from_slice(&value[..16]);
            low[16] = 1;
            (
                Fr::from_bytes_le_mod_order(&low),
                Fr::from_bytes_le_mod_order(&value[16..]),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_value_differs_from_empty_slot() {
        let (low, high) = value_scalars(Some(&[0u8; 32]));
        assert!(!low.is_zero());
        assert!(high.is_zero());
        let (low, high) = value_scalars(None);
        assert!(low.is_zero());
        assert!(high.is_zero());
    }

    #[test]
    fn low_half_carries_the_marker() {
        let mut value = [0u8; 32];
        value[0] = 0x42;
        let (low, _) = value_scalars(Some(&value));

        let mut expected = [0u8; 17];
        expected[0] = 0x42;
        expected[16] = 1;
        assert_eq!(low, Fr::from_bytes_le_mod_order(&expected));
    }

    #[test]
    fn stem_scalar_is_injective_on_test_stems() {
        let a = stem_scalar(&[1u8; 31]);
        let b = stem_scalar(&[2u8; 31]);
        assert_ne!(a, b);
    }
}
