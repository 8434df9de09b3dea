//! Bandersnatch curve parameters.
//!
//! The constants are decoded once at first use; the byte strings are the
//! canonical big-endian encodings of the standard Bandersnatch parameters.

use once_cell::sync::Lazy;
use verkle_fields::Fp;

fn fp_from_hex(hex: &str) -> Fp {
    debug_assert_eq!(hex.len(), 64);
    let mut bytes = [0u8; 32];
    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        let high = (chunk[0] as char).to_digit(16).expect("valid hex digit");
        let low = (chunk[1] as char).to_digit(16).expect("valid hex digit");
        bytes[i] = ((high << 4) | low) as u8;
    }
    Fp::from_bytes_be(&bytes).expect("curve parameter is a reduced field element")
}

/// Twisted Edwards `a` coefficient: `-5`.
pub static COEFF_A: Lazy<Fp> = Lazy::new(|| Fp::from_u64(5).neg());

/// Twisted Edwards `d` coefficient.
pub static COEFF_D: Lazy<Fp> = Lazy::new(|| {
    fp_from_hex("6389c12633c267cbc66e3bf86be3b6d8cb66677177e54f92b369f2f5188d58e7")
});

/// x-coordinate of the prime-subgroup generator.
pub static GENERATOR_X: Lazy<Fp> = Lazy::new(|| {
    fp_from_hex("29c132cc2c0b34c5743711777bbe42f32b79c022ad998465e1e71866a252ae18")
});

/// y-coordinate of the prime-subgroup generator.
pub static GENERATOR_Y: Lazy<Fp> = Lazy::new(|| {
    fp_from_hex("2a6c669eda123e0f157d8b50badcd586358cad81eee464605e3167b6cc974166")
});
