//! Shared limb arithmetic and the field-type generator macro.
//!
//! The multiplication routine is the standard 4-limb CIOS (coarsely
//! integrated operand scanning) Montgomery multiply: a school-book limb
//! product interleaved with per-limb reduction steps driven by
//! `MODULUS_INV_NEG`, the inverse of `-M` modulo `2^64`. Both moduli are
//! below `2^255`, so a single trailing conditional subtraction is enough to
//! bring every result back into `[0, M)`.

/// Addition with carry: returns `(a + b + carry) mod 2^64` and the carry out.
#[inline(always)]
pub(crate) const fn adc(a: u64, b: u64, carry: u64) -> (u64, u64) {
    let t = (a as u128) + (b as u128) + (carry as u128);
    (t as u64, (t >> 64) as u64)
}

/// Subtraction with borrow: returns `(a - b - borrow) mod 2^64` and the
/// borrow out (0 or 1).
#[inline(always)]
pub(crate) const fn sbb(a: u64, b: u64, borrow: u64) -> (u64, u64) {
    let t = (a as u128).wrapping_sub((b as u128) + (borrow as u128));
    (t as u64, ((t >> 127) & 1) as u64)
}

/// Multiply-accumulate: returns `(a + b * c + carry) mod 2^64` and the high
/// limb. The sum never overflows 128 bits.
#[inline(always)]
pub(crate) const fn mac(a: u64, b: u64, c: u64, carry: u64) -> (u64, u64) {
    let t = (a as u128) + (b as u128) * (c as u128) + (carry as u128);
    (t as u64, (t >> 64) as u64)
}

/// Generates a fixed-width Montgomery field type.
///
/// All constant tables are little-endian `u64` limbs. `one`, `r_squared`
/// and `sqrt_generator` are given in Montgomery form; the exponent tables
/// are plain integers.
macro_rules! montgomery_field {
    (
        $(#[$attr:meta])*
        $name:ident {
            modulus: $modulus:expr,
            modulus_inv_neg: $inv_neg:expr,
            one: $one:expr,
            r_squared: $r_squared:expr,
            num_bits: $num_bits:expr,
            two_adicity: $two_adicity:expr,
            sqrt_generator: $sqrt_generator:expr,
            exp_legendre: $exp_legendre:expr,
            exp_sqrt: $exp_sqrt:expr,
            exp_inverse: $exp_inverse:expr,
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Eq, Hash)]
        pub struct $name([u64; 4]);

        impl $name {
            /// The field modulus `M`, as plain limbs.
            pub const MODULUS: [u64; 4] = $modulus;
            /// `-M^-1 mod 2^64`, the per-limb Montgomery reduction factor.
            const MODULUS_INV_NEG: u64 = $inv_neg;
            /// `R mod M`: the multiplicative identity in Montgomery form.
            const ONE: [u64; 4] = $one;
            /// `R^2 mod M`, used to enter the Montgomery domain.
            const R_SQUARED: [u64; 4] = $r_squared;
            /// Bit width of the modulus.
            pub const NUM_BITS: u32 = $num_bits;
            /// `e` such that `M - 1 = 2^e * s` with `s` odd.
            const TWO_ADICITY: u32 = $two_adicity;
            /// A generator of the order-`2^e` subgroup (a fixed non-residue
            /// raised to `s`), in Montgomery form.
            const SQRT_GENERATOR: [u64; 4] = $sqrt_generator;
            /// `(M - 1) / 2`, the Legendre symbol exponent.
            const EXP_LEGENDRE: [u64; 4] = $exp_legendre;
            /// `(s - 1) / 2`, the Tonelli-Shanks seed exponent.
            const EXP_SQRT: [u64; 4] = $exp_sqrt;
            /// `M - 2`, the Fermat inversion exponent.
            const EXP_INVERSE: [u64; 4] = $exp_inverse;

            /// The zero element.
            #[inline]
            pub const fn zero() -> Self {
                Self([0; 4])
            }

            /// The one element.
            #[inline]
            pub const fn one() -> Self {
                Self(Self::ONE)
            }

            /// Builds a field element from a small integer.
            pub fn from_u64(value: u64) -> Self {
                Self([value, 0, 0, 0]).mul(&Self(Self::R_SQUARED))
            }

            /// Constructs an element directly from Montgomery-form limbs.
            ///
            /// Callers must guarantee the limbs are already reduced; this is
            /// only exposed for compile-time constants in dependent crates.
            #[inline]
            pub const fn from_montgomery_limbs_unchecked(limbs: [u64; 4]) -> Self {
                Self(limbs)
            }

            #[inline]
            pub fn is_zero(&self) -> bool {
                self.equals(&Self::zero())
            }

            #[inline]
            pub fn is_one(&self) -> bool {
                self.equals(&Self::one())
            }

            /// Constant-shape equality: compares every limb without an
            /// early exit, so the comparison time does not depend on where
            /// the operands first differ.
            #[inline]
            pub fn equals(&self, other: &Self) -> bool {
                let mut acc = 0u64;
                let mut i = 0;
                while i < 4 {
                    acc |= self.0[i] ^ other.0[i];
                    i += 1;
                }
                acc == 0
            }

            /// Modular addition with a single conditional correction.
            pub fn add(&self, rhs: &Self) -> Self {
                let mut limbs = [0u64; 4];
                let mut carry = 0u64;
                for i in 0..4 {
                    let (l, c) = $crate::montgomery::adc(self.0[i], rhs.0[i], carry);
                    limbs[i] = l;
                    carry = c;
                }
                Self::reduce_once(limbs, carry)
            }

            /// Modular subtraction with a single conditional correction.
            pub fn sub(&self, rhs: &Self) -> Self {
                let mut limbs = [0u64; 4];
                let mut borrow = 0u64;
                for i in 0..4 {
                    let (l, b) = $crate::montgomery::sbb(self.0[i], rhs.0[i], borrow);
                    limbs[i] = l;
                    borrow = b;
                }
                if borrow != 0 {
                    let mut carry = 0u64;
                    for i in 0..4 {
                        let (l, c) =
                            $crate::montgomery::adc(limbs[i], Self::MODULUS[i], carry);
                        limbs[i] = l;
                        carry = c;
                    }
                }
                Self(limbs)
            }

            /// Negation as `M - a`, with zero staying zero. No negative
            /// representation ever exists.
            pub fn neg(&self) -> Self {
                Self::zero().sub(self)
            }

            /// CIOS Montgomery multiplication. Both operands and the result
            /// stay in the Montgomery domain.
            pub fn mul(&self, rhs: &Self) -> Self {
                let a = &self.0;
                let b = &rhs.0;
                let mut t = [0u64; 4];
                let (mut t4, mut t5) = (0u64, 0u64);

                for i in 0..4 {
                    // t += a[i] * b
                    let mut carry = 0u64;
                    for j in 0..4 {
                        let (l, c) = $crate::montgomery::mac(t[j], a[i], b[j], carry);
                        t[j] = l;
                        carry = c;
                    }
                    let (l, c) = $crate::montgomery::adc(t4, carry, 0);
                    t4 = l;
                    t5 = c;

                    // reduce: add m * M so the low limb vanishes, then shift
                    let m = t[0].wrapping_mul(Self::MODULUS_INV_NEG);
                    let (_, mut carry) = $crate::montgomery::mac(t[0], m, Self::MODULUS[0], 0);
                    for j in 1..4 {
                        let (l, c) = $crate::montgomery::mac(t[j], m, Self::MODULUS[j], carry);
                        t[j - 1] = l;
                        carry = c;
                    }
                    let (l, c) = $crate::montgomery::adc(t4, carry, 0);
                    t[3] = l;
                    t4 = t5 + c;
                }

                Self::reduce_once(t, t4)
            }

            /// Squaring. Delegates to [`mul`](Self::mul); the dedicated
            /// squaring formula saves little at this limb count.
            #[inline]
            pub fn square(&self) -> Self {
                self.mul(self)
            }

            /// Exponentiation by a fixed 256-bit exponent (plain integer,
            /// not Montgomery), square-and-multiply from the top bit down.
            pub fn exp(&self, exponent: &[u64; 4]) -> Self {
                let mut acc = Self::one();
                for i in (0..256).rev() {
                    acc = acc.square();
                    if (exponent[i / 64] >> (i % 64)) & 1 == 1 {
                        acc = acc.mul(self);
                    }
                }
                acc
            }

            /// Modular inverse via Fermat's little theorem: `a^(M-2)`.
            ///
            /// Fails with [`FieldError::DivisionByZero`] on the zero
            /// element; the caller decides how to surface that.
            pub fn inverse(&self) -> Result<Self, $crate::FieldError> {
                if self.is_zero() {
                    return Err($crate::FieldError::DivisionByZero);
                }
                Ok(self.exp(&Self::EXP_INVERSE))
            }

            /// Legendre symbol of the element, via the precomputed
            /// `(M-1)/2` exponent.
            pub fn legendre(&self) -> $crate::Legendre {
                let symbol = self.exp(&Self::EXP_LEGENDRE);
                if symbol.is_zero() {
                    $crate::Legendre::Zero
                } else if symbol.is_one() {
                    $crate::Legendre::Residue
                } else {
                    $crate::Legendre::NonResidue
                }
            }

            /// Tonelli-Shanks square root.
            ///
            /// Returns one of the two roots of a quadratic residue (the
            /// other is its negation) and fails with
            /// [`FieldError::NotASquare`] on a non-residue.
            pub fn sqrt(&self) -> Result<Self, $crate::FieldError> {
                if self.is_zero() {
                    return Ok(*self);
                }
                if self.legendre() != $crate::Legendre::Residue {
                    return Err($crate::FieldError::NotASquare);
                }

                let w = self.exp(&Self::EXP_SQRT); // a^((s-1)/2)
                let mut root = self.mul(&w); // a^((s+1)/2)
                let mut t = root.mul(&w); // a^s, has order dividing 2^e
                let mut g = Self(Self::SQRT_GENERATOR);
                let mut e = Self::TWO_ADICITY;

                while !t.is_one() {
                    // order of t is 2^m; the residue check above guarantees
                    // m < e, so the loop always terminates
                    let mut m = 0u32;
                    let mut probe = t;
                    while !probe.is_one() {
                        probe = probe.square();
                        m += 1;
                    }
                    let mut adjust = g;
                    for _ in 0..(e - m - 1) {
                        adjust = adjust.square();
                    }
                    g = adjust.square();
                    root = root.mul(&adjust);
                    t = t.mul(&g);
                    e = m;
                }
                Ok(root)
            }

            /// Leaves the Montgomery domain, returning the plain-integer
            /// limbs of the canonical residue. Only for domain boundaries:
            /// serialization, bit inspection, external comparison.
            pub fn to_regular_limbs(&self) -> [u64; 4] {
                // Multiplying by raw 1 applies a bare Montgomery reduction.
                self.mul(&Self([1, 0, 0, 0])).0
            }

            /// Index of the highest set bit of the canonical residue, plus
            /// one. Zero for the zero element.
            pub fn bit_len(&self) -> u32 {
                let limbs = self.to_regular_limbs();
                for i in (0..4).rev() {
                    if limbs[i] != 0 {
                        return 64 * (i as u32 + 1) - limbs[i].leading_zeros();
                    }
                }
                0
            }

            /// Canonical big-endian 32-byte encoding of the residue.
            pub fn to_bytes_be(&self) -> [u8; 32] {
                let limbs = self.to_regular_limbs();
                let mut bytes = [0u8; 32];
                for i in 0..4 {
                    bytes[8 * i..8 * (i + 1)].copy_from_slice(&limbs[3 - i].to_be_bytes());
                }
                bytes
            }

            /// Little-endian 32-byte encoding of the residue.
            pub fn to_bytes_le(&self) -> [u8; 32] {
                let limbs = self.to_regular_limbs();
                let mut bytes = [0u8; 32];
                for i in 0..4 {
                    bytes[8 * i..8 * (i + 1)].copy_from_slice(&limbs[i].to_le_bytes());
                }
                bytes
            }

            /// Parses a canonical big-endian encoding. Returns `None` when
            /// the value is not a reduced residue (`>= M`), so externally
            /// supplied bytes can never smuggle in a non-canonical element.
            pub fn from_bytes_be(bytes: &[u8; 32]) -> Option<Self> {
                let mut limbs = [0u64; 4];
                for i in 0..4 {
                    let mut chunk = [0u8; 8];
                    chunk.copy_from_slice(&bytes[8 * i..8 * (i + 1)]);
                    limbs[3 - i] = u64::from_be_bytes(chunk);
                }
                if !$crate::montgomery::lt_limbs(&limbs, &Self::MODULUS) {
                    return None;
                }
                Some(Self(limbs).mul(&Self(Self::R_SQUARED)))
            }

            /// Interprets up to 32 little-endian bytes as an integer and
            /// reduces it modulo `M`. Used to map hash outputs and foreign
            /// field encodings into the field.
            pub fn from_bytes_le_mod_order(bytes: &[u8]) -> Self {
                debug_assert!(bytes.len() <= 32);
                let mut padded = [0u8; 32];
                padded[..bytes.len()].copy_from_slice(bytes);
                let mut limbs = [0u64; 4];
                for i in 0..4 {
                    let mut chunk = [0u8; 8];
                    chunk.copy_from_slice(&padded[8 * i..8 * (i + 1)]);
                    limbs[i] = u64::from_le_bytes(chunk);
                }
                // The CIOS multiply tolerates an unreduced left operand up
                // to 2^256, so one multiplication by R^2 both reduces and
                // enters the Montgomery domain.
                Self(limbs).mul(&Self(Self::R_SQUARED))
            }

            /// Compares the canonical residues as integers.
            pub fn cmp_value(&self, other: &Self) -> core::cmp::Ordering {
                let a = self.to_regular_limbs();
                let b = other.to_regular_limbs();
                for i in (0..4).rev() {
                    match a[i].cmp(&b[i]) {
                        core::cmp::Ordering::Equal => continue,
                        ord => return ord,
                    }
                }
                core::cmp::Ordering::Equal
            }

            /// Montgomery's batched inversion trick. Zero entries are left
            /// untouched instead of failing the whole batch.
            pub fn batch_inverse(elements: &mut [Self]) {
                let mut prefix_products = Vec::with_capacity(elements.len());
                let mut acc = Self::one();
                for e in elements.iter() {
                    prefix_products.push(acc);
                    if !e.is_zero() {
                        acc = acc.mul(e);
                    }
                }
                let mut inv = acc
                    .inverse()
                    .expect("product of non-zero field elements is non-zero");
                for (e, prefix) in elements.iter_mut().zip(prefix_products).rev() {
                    if e.is_zero() {
                        continue;
                    }
                    let next = inv.mul(e);
                    *e = inv.mul(&prefix);
                    inv = next;
                }
            }

            /// One conditional subtraction of the modulus, covering both
            /// the "carried past 2^256" and the "result in [M, 2^256)"
            /// cases left by addition and CIOS multiplication.
            #[inline]
            fn reduce_once(limbs: [u64; 4], carry: u64) -> Self {
                if carry == 0 && $crate::montgomery::lt_limbs(&limbs, &Self::MODULUS) {
                    return Self(limbs);
                }
                let mut out = [0u64; 4];
                let mut borrow = 0u64;
                for i in 0..4 {
                    let (l, b) = $crate::montgomery::sbb(limbs[i], Self::MODULUS[i], borrow);
                    out[i] = l;
                    borrow = b;
                }
                // a set carry cancels the final borrow
                Self(out)
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.equals(other)
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, concat!(stringify!($name), "(0x"))?;
                for byte in self.to_bytes_be() {
                    write!(f, "{byte:02x}")?;
                }
                write!(f, ")")
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::zero()
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self::from_u64(value)
            }
        }

        // Operator sugar over the named pure operations; operands are Copy
        // value types and are never mutated.
        impl core::ops::Add for $name {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                $name::add(&self, &rhs)
            }
        }

        impl core::ops::Sub for $name {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                $name::sub(&self, &rhs)
            }
        }

        impl core::ops::Mul for $name {
            type Output = Self;
            fn mul(self, rhs: Self) -> Self {
                $name::mul(&self, &rhs)
            }
        }

        impl core::ops::Neg for $name {
            type Output = Self;
            fn neg(self) -> Self {
                $name::neg(&self)
            }
        }

        impl core::ops::AddAssign for $name {
            fn add_assign(&mut self, rhs: Self) {
                *self = $name::add(self, &rhs);
            }
        }

        impl core::ops::SubAssign for $name {
            fn sub_assign(&mut self, rhs: Self) {
                *self = $name::sub(self, &rhs);
            }
        }

        impl core::ops::MulAssign for $name {
            fn mul_assign(&mut self, rhs: Self) {
                *self = $name::mul(self, &rhs);
            }
        }

        impl core::iter::Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold(Self::zero(), |acc, x| $name::add(&acc, &x))
            }
        }
    };
}

pub(crate) use montgomery_field;

/// `a < b` over little-endian limbs.
#[inline]
pub(crate) fn lt_limbs(a: &[u64; 4], b: &[u64; 4]) -> bool {
    for i in (0..4).rev() {
        if a[i] != b[i] {
            return a[i] < b[i];
        }
    }
    false
}
