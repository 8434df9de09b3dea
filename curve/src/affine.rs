use crate::params;
use verkle_fields::Fp;

/// A Bandersnatch point in affine coordinates.
///
/// Used only at the boundary: final output, serialization and test fixtures.
/// All group arithmetic happens on [`ExtendedPoint`](crate::ExtendedPoint).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffinePoint {
    pub x: Fp,
    pub y: Fp,
}

impl AffinePoint {
    /// The affine identity `(0, 1)`.
    pub fn identity() -> Self {
        Self {
            x: Fp::zero(),
            y: Fp::one(),
        }
    }

    /// The prime-subgroup generator.
    pub fn generator() -> Self {
        Self {
            x: *params::GENERATOR_X,
            y: *params::GENERATOR_Y,
        }
    }

    /// Checks the curve equation `a·x² + y² = 1 + d·x²·y²`.
    pub fn is_on_curve(&self) -> bool {
        let x_sq = self.x.square();
        let y_sq = self.y.square();
        let lhs = params::COEFF_A.mul(&x_sq).add(&y_sq);
        let rhs = Fp::one().add(&params::COEFF_D.mul(&x_sq).mul(&y_sq));
        lhs.equals(&rhs)
    }

    /// Reconstructs the point with the given x-coordinate from the curve
    /// equation: `y² = (1 - a·x²) / (1 - d·x²)`.
    ///
    /// Returns `None` when no such point exists. `choose_largest` selects
    /// which of the two candidate y-coordinates is returned
    /// (lexicographically larger residue = "positive").
    pub fn from_x(x: Fp, choose_largest: bool) -> Option<Self> {
        let x_sq = x.square();
        let numerator = Fp::one().sub(&params::COEFF_A.mul(&x_sq));
        let denominator = Fp::one().sub(&params::COEFF_D.mul(&x_sq));
        // d is a non-residue, so the denominator is never zero for a
        // reduced x; a failed inversion still maps cleanly to None
        let y_sq = numerator.mul(&denominator.inverse().ok()?);
        let y = y_sq.sqrt().ok()?;
        let y = if is_positive(&y) == choose_largest {
            y
        } else {
            y.neg()
        };
        Some(Self { x, y })
    }

    /// Compressed 32-byte encoding: the big-endian x-coordinate with the
    /// sign of `y` stored in the most significant bit (free because the
    /// base field is 255 bits wide).
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut bytes = self.x.to_bytes_be();
        if is_positive(&self.y) {
            bytes[0] |= 0x80;
        }
        bytes
    }

    /// Decodes a compressed encoding; `None` if the x-coordinate is not a
    /// reduced field element or not on the curve.
    pub fn from_bytes(bytes: &[u8; 32]) -> Option<Self> {
        let mut x_bytes = *bytes;
        let y_is_positive = x_bytes[0] & 0x80 != 0;
        x_bytes[0] &= 0x7F;
        let x = Fp::from_bytes_be(&x_bytes)?;
        Self::from_x(x, y_is_positive)
    }
}

/// The lexicographically larger of `{e, -e}` is defined to be positive.
pub(crate) fn is_positive(e: &Fp) -> bool {
    e.cmp_value(&e.neg()) == core::cmp::Ordering::Greater
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_and_generator_are_on_curve() {
        assert!(AffinePoint::identity().is_on_curve());
        assert!(AffinePoint::generator().is_on_curve());
    }

    #[test]
    fn generator_round_trips_through_compression() {
        let g = AffinePoint::generator();
        let decoded = AffinePoint::from_bytes(&g.to_bytes()).unwrap();
        assert_eq!(decoded, g);
    }

    #[test]
    fn from_x_honours_sign_selection() {
        let g = AffinePoint::generator();
        let same_sign = AffinePoint::from_x(g.x, is_positive(&g.y)).unwrap();
        assert_eq!(same_sign.y, g.y);
        let other_sign = AffinePoint::from_x(g.x, !is_positive(&g.y)).unwrap();
        assert_eq!(other_sign.y, g.y.neg());
    }

    #[test]
    fn off_curve_x_is_rejected() {
        // x = 2 does not lie on Bandersnatch
        assert!(AffinePoint::from_x(Fp::from_u64(2), true).is_none());
    }
}
