use crate::{affine::AffinePoint, params, CurveError};
use verkle_fields::{Fp, Fr};

/// A Bandersnatch point in projective `(X : Y : Z)` coordinates; the affine
/// point is `(X/Z, Y/Z)`.
///
/// The same affine point has many projective representations, so equality
/// is defined by cross-multiplication, never by raw coordinate comparison.
/// The group identity is the embedding of affine `(0, 1)`.
#[derive(Debug, Clone, Copy)]
pub struct ExtendedPoint {
    pub x: Fp,
    pub y: Fp,
    pub z: Fp,
}

impl ExtendedPoint {
    /// Embeds an affine point with `Z = 1`.
    pub fn from_affine(p: &AffinePoint) -> Self {
        Self {
            x: p.x,
            y: p.y,
            z: Fp::one(),
        }
    }

    /// The group identity.
    pub fn identity() -> Self {
        Self::from_affine(&AffinePoint::identity())
    }

    /// The prime-subgroup generator.
    pub fn generator() -> Self {
        Self::from_affine(&AffinePoint::generator())
    }

    /// Whether this is the identity, across all of its projective
    /// representations (`X = 0`, `Y = Z != 0`).
    pub fn is_identity(&self) -> bool {
        self.x.is_zero() && self.y.equals(&self.z) && !self.y.is_zero()
    }

    /// Projective equality: `(X₁/Z₁, Y₁/Z₁) == (X₂/Z₂, Y₂/Z₂)` checked by
    /// cross-multiplication to avoid inversions.
    pub fn equals(&self, other: &Self) -> bool {
        if self.is_identity() {
            return other.is_identity();
        }
        if other.is_identity() {
            return false;
        }
        self.x.mul(&other.z).equals(&self.z.mul(&other.x))
            && self.y.mul(&other.z).equals(&other.y.mul(&self.z))
    }

    /// Unified projective twisted-Edwards addition (EFD `add-2008-bbjlp`).
    ///
    /// Valid for every pair of subgroup points including `p == q` and
    /// `p == -q`; costs two field multiplications more than
    /// [`double`](Self::double) but takes no branch on operand equality.
    pub fn add(&self, other: &Self) -> Self {
        let (x1, y1, z1) = (self.x, self.y, self.z);
        let (x2, y2, z2) = (other.x, other.y, other.z);

        let a = z1.mul(&z2);
        let b = a.square();
        let c = x1.mul(&x2);
        let d = y1.mul(&y2);
        let e = params::COEFF_D.mul(&c).mul(&d);
        let f = b.sub(&e);
        let g = b.add(&e);

        let mixed = x1.add(&y1).mul(&x2.add(&y2)).sub(&c).sub(&d);
        let x3 = a.mul(&f).mul(&mixed);
        let y3 = a.mul(&g).mul(&d.sub(&params::COEFF_A.mul(&c)));
        let z3 = f.mul(&g);

        Self {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    /// `self + (-other)`.
    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    /// Dedicated doubling formula (EFD `dbl-2008-bbjlp`), cheaper than the
    /// generic addition applied to `(p, p)`.
    pub fn double(&self) -> Self {
        let (x1, y1, z1) = (self.x, self.y, self.z);

        let b = x1.add(&y1).square();
        let c = x1.square();
        let d = y1.square();
        let e = params::COEFF_A.mul(&c);
        let f = e.add(&d);
        let h = z1.square();
        let j = f.sub(&h.add(&h));

        Self {
            x: b.sub(&c).sub(&d).mul(&j),
            y: f.mul(&e.sub(&d)),
            z: f.mul(&j),
        }
    }

    /// Negation flips the x-coordinate only, by the curve's symmetry.
    pub fn neg(&self) -> Self {
        Self {
            x: self.x.neg(),
            y: self.y,
            z: self.z,
        }
    }

    /// Scalar multiplication by binary double-and-add, scanning the scalar
    /// from its most significant set bit down to bit zero with an
    /// identity-seeded accumulator.
    ///
    /// The scalar leaves the Montgomery domain once so individual bits can
    /// be inspected.
    pub fn scalar_mul(&self, scalar: &Fr) -> Self {
        let limbs = scalar.to_regular_limbs();
        let bits = scalar.bit_len();

        let mut acc = Self::identity();
        for i in (0..bits).rev() {
            acc = acc.double();
            if (limbs[(i / 64) as usize] >> (i % 64)) & 1 == 1 {
                acc = acc.add(self);
            }
        }
        acc
    }

    /// Converts to affine coordinates with one field inversion.
    ///
    /// A zero `Z` on a non-identity representation cannot be produced by
    /// the group operations above; hitting one means the arithmetic layer
    /// is broken, so it is reported as an invariant violation rather than a
    /// recoverable error.
    pub fn to_affine(&self) -> Result<AffinePoint, CurveError> {
        if self.is_identity() {
            return Ok(AffinePoint::identity());
        }
        if self.z.is_zero() {
            tracing::error!(point = ?self, "projective point with zero Z coordinate");
            return Err(CurveError::InternalInvariantViolation(
                "projective Z coordinate is zero",
            ));
        }
        if self.z.is_one() {
            return Ok(AffinePoint {
                x: self.x,
                y: self.y,
            });
        }
        let z_inv = self.z.inverse().map_err(|_| {
            CurveError::InternalInvariantViolation("projective Z coordinate is zero")
        })?;
        Ok(AffinePoint {
            x: self.x.mul(&z_inv),
            y: self.y.mul(&z_inv),
        })
    }

    /// Maps a commitment point to its scalar-field representation: the
    /// affine x-coordinate reduced into `Fr`.
    ///
    /// This is the "field encoding" of a child commitment inside its
    /// parent's polynomial, and of the root commitment in the root hash.
    pub fn map_to_scalar_field(&self) -> Result<Fr, CurveError> {
        let affine = self.to_affine()?;
        Ok(Fr::from_bytes_le_mod_order(&affine.x.to_bytes_le()))
    }

    /// Compressed 32-byte encoding via the affine form.
    pub fn to_bytes(&self) -> Result<[u8; 32], CurveError> {
        Ok(self.to_affine()?.to_bytes())
    }

    /// Decompresses a point encoding. Returns `None` for bytes that do not
    /// name an x-coordinate on the curve.
    pub fn from_bytes(bytes: &[u8; 32]) -> Option<Self> {
        AffinePoint::from_bytes(bytes).map(|p| Self::from_affine(&p))
    }
}

impl PartialEq for ExtendedPoint {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for ExtendedPoint {}
