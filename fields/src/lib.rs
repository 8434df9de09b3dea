//! Montgomery-form modular arithmetic for the two prime fields used by the
//! Verkle commitment scheme.
//!
//! Two independent field types are generated from the same macro:
//!
//! - [`Fp`]: the Bandersnatch base field (identical to the BLS12-381 scalar
//!   field, 255 bits). Curve point coordinates live here.
//! - [`Fr`]: the Bandersnatch scalar field (253 bits). Commitment scalars,
//!   polynomial evaluations and exponents live here.
//!
//! The types are deliberately not interchangeable; mixing them in a single
//! operation is a type error.
//!
//! # Representation
//!
//! Values are stored as four little-endian `u64` limbs holding `value * R
//! mod M` with `R = 2^256` (Montgomery form). Every arithmetic operation
//! keeps its result fully reduced, so the limb representation of a value is
//! canonical and derived `Hash`/`Eq` agree with field equality. Conversion
//! out of Montgomery form happens only at the boundaries: serialization,
//! bit inspection and ordering comparisons.

mod fp;
mod fr;
mod montgomery;

pub use fp::Fp;
pub use fr::Fr;

use thiserror::Error;

/// Errors surfaced by field arithmetic.
///
/// These are never substituted with a default value: a swallowed arithmetic
/// error would silently corrupt a commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    /// Attempted to invert the zero element.
    #[error("division by zero: the zero field element has no inverse")]
    DivisionByZero,
    /// Attempted to take the square root of a quadratic non-residue.
    #[error("not a square: the element is a quadratic non-residue")]
    NotASquare,
}

/// Outcome of a Legendre symbol computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Legendre {
    /// The element is zero.
    Zero,
    /// The element is a non-zero quadratic residue.
    Residue,
    /// The element is a quadratic non-residue.
    NonResidue,
}
