//! Group arithmetic on the Bandersnatch curve, the twisted Edwards curve
//! `-5x² + y² = 1 + dx²y²` defined over the BLS12-381 scalar field.
//!
//! Points are kept in projective `(X : Y : Z)` coordinates so that no group
//! operation needs a field inversion; [`ExtendedPoint::to_affine`] performs
//! the single inversion at output time. The group law uses the unified
//! projective addition formula, which handles `p + p` and `p + (-p)` without
//! branching on operand equality; the doubling formula exists purely as a
//! cheaper special case, never as a correctness requirement.
//!
//! Scalars come from [`Fr`], the order of the prime subgroup; coordinates
//! from [`Fp`]. The two field types are deliberately distinct.

mod affine;
mod extended;
mod msm;
pub mod params;

pub use affine::AffinePoint;
pub use extended::ExtendedPoint;
pub use msm::{batch_map_to_scalar_field, multi_scalar_mul};

pub use verkle_fields::{FieldError, Fp, Fr};

use thiserror::Error;

/// Errors surfaced by point arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CurveError {
    /// A point reached a state that valid group operations can never
    /// produce (e.g. a zero projective `Z`). This indicates a defect in the
    /// arithmetic layer, not a recoverable input error.
    #[error("internal invariant violation: {0}")]
    InternalInvariantViolation(&'static str),
}
