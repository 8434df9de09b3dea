//! The opening argument backing Verkle multiproofs.
//!
//! Layered bottom-up:
//!
//! - [`transcript`]: a SHA-256 Fiat-Shamir transcript shared by prover and
//!   verifier.
//! - [`lagrange_basis`]: polynomials in evaluation form over the domain
//!   `{0, 1, ..., n-1}` with precomputed barycentric weights.
//! - [`crs`]: the Pedersen commitment key, derived deterministically from a
//!   seed by hash-to-curve.
//! - [`ipa`]: the BCMS20 inner-product argument proving `⟨a, b⟩ = y` under
//!   a commitment to `a`.
//! - [`multiproof`]: the reduction from many `(commitment, point, value)`
//!   openings to a single IPA opening at a random evaluation point.

pub mod crs;
pub mod ipa;
pub mod lagrange_basis;
pub mod math_utils;
pub mod multiproof;
pub mod transcript;

use thiserror::Error;
use verkle_fields::FieldError;

/// Errors surfaced while building or checking opening arguments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IpaError {
    /// A field operation failed (e.g. a transcript challenge happened to be
    /// non-invertible).
    #[error(transparent)]
    Field(#[from] FieldError),
    /// A curve operation hit an internal invariant violation.
    #[error(transparent)]
    Curve(#[from] bandersnatch::CurveError),
    /// A serialized proof could not be decoded.
    #[error("invalid proof encoding")]
    InvalidEncoding,
}
